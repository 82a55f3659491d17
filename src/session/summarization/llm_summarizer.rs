//! LLM-based summarization for session logs.
//!
//! Sends the full transcript to an Ollama completion model and uses the
//! returned text as the new summary.

use reqwest::Client as ReqwestClient;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::ollama;
use tracing::debug;

use crate::session::core::config::LlmConfig;
use crate::session::core::errors::{SessionError, SessionResult};
use crate::session::core::message::Message;
use crate::session::summarization::transcript::{Summarizer, SummaryFuture};

/// System prompt for session summarization.
const SUMMARY_SYSTEM_PROMPT: &str = "You are summarizing a collaborative session.
Several participants post short contributions into a shared log.

Produce a concise, factual summary of the whole session:
- main topics and open questions
- decisions or conclusions reached
- who contributed what, when names are given

Do not invent anything that is not in the transcript.";

/// LLM-backed summarizer.
pub struct LlmSummarizer {
    model: ollama::CompletionModel,
    temperature: f64,
    max_input_chars: usize,
}

impl LlmSummarizer {
    /// Create a new LLM summarizer.
    ///
    /// # Errors
    /// Returns an error if the Ollama client cannot be built.
    pub fn new(config: &LlmConfig, max_input_chars: usize) -> SessionResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(rig::client::Nothing);
        let builder = if let Some(base_url) = &config.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(SessionError::from)?;
        let model = client.completion_model(config.model.clone());

        Ok(Self {
            model,
            temperature: config.temperature,
            max_input_chars,
        })
    }

    async fn complete(&self, history: &[Message]) -> SessionResult<String> {
        let prompt = build_prompt(history, self.max_input_chars);

        debug!("Summarizing {} messages with LLM", history.len());

        let request = self
            .model
            .completion_request(prompt)
            .preamble(SUMMARY_SYSTEM_PROMPT.to_string())
            .temperature(self.temperature)
            .build();

        let response = self.model.completion(request).await?;
        let text = extract_text(&response.choice);
        if text.trim().is_empty() {
            return Err(SessionError::Generation(
                "model returned an empty summary".to_string(),
            ));
        }
        Ok(text.trim().to_string())
    }
}

impl Summarizer for LlmSummarizer {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn summarize<'a>(&'a self, history: &'a [Message]) -> SummaryFuture<'a> {
        Box::pin(self.complete(history))
    }
}

/// Extract text from assistant response.
fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}

/// Build the user prompt for a summarization call.
fn build_prompt(history: &[Message], max_chars: usize) -> String {
    let transcript = format_transcript(history, max_chars);
    format!("Session transcript:\n\n{transcript}\n\nWrite the summary of this session.")
}

/// Format messages into a readable transcript, keeping the newest lines
/// when the budget is exceeded.
///
/// The newest line is always kept, truncated to the budget if needed.
fn format_transcript(history: &[Message], max_chars: usize) -> String {
    let mut lines = Vec::new();
    let mut char_count = 0;

    for (offset, message) in history.iter().rev().enumerate() {
        let author = match &message.name {
            Some(name) => format!("{name} ({})", message.role),
            None => message.role.to_string(),
        };
        let line = format!("{author}: {}", message.content);
        let line_len = line.chars().count() + 1;

        if char_count + line_len > max_chars {
            if lines.is_empty() {
                let remaining = max_chars.saturating_sub(3);
                let truncated: String = line.chars().take(remaining).collect();
                lines.push(format!("{truncated}..."));
                if offset + 1 == history.len() {
                    break;
                }
            }
            lines.push("...".to_string());
            break;
        }

        lines.push(line);
        char_count += line_len;
    }

    lines.reverse();
    lines.join("\n")
}
