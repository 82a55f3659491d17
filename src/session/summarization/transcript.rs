//! Transcript summarizer: the always-available, non-LLM strategy.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::session::core::config::{SummaryMode, WhiteboardConfig};
use crate::session::core::errors::SessionResult;
use crate::session::core::message::Message;
use crate::session::summarization::llm_summarizer::LlmSummarizer;

/// Literal header opening every transcript summary.
pub const SUMMARY_HEADER: &str = "Summary:";

/// Boxed future type for summarizer calls.
pub type SummaryFuture<'a> = Pin<Box<dyn Future<Output = SessionResult<String>> + Send + 'a>>;

/// Turns a full session history into a summary string.
///
/// Every implementation recomputes from the whole history it is given;
/// none of them read back a previously stored summary.
pub trait Summarizer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Summarize `history`.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn summarize<'a>(&'a self, history: &'a [Message]) -> SummaryFuture<'a>;
}

/// Joins `role: content` lines under [`SUMMARY_HEADER`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TranscriptSummarizer;

impl Summarizer for TranscriptSummarizer {
    fn name(&self) -> &'static str {
        "transcript"
    }

    fn summarize<'a>(&'a self, history: &'a [Message]) -> SummaryFuture<'a> {
        Box::pin(async move { Ok(transcript_summary(history)) })
    }
}

/// Render the transcript summary for `history`.
#[must_use]
pub fn transcript_summary(history: &[Message]) -> String {
    let transcript = history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{SUMMARY_HEADER}\n{transcript}")
}

/// Build the summarizer selected by `config`.
///
/// # Errors
/// Returns an error if the LLM client cannot be built.
pub fn build_summarizer(config: &WhiteboardConfig) -> SessionResult<Arc<dyn Summarizer>> {
    let summarizer: Arc<dyn Summarizer> = match config.summary.mode {
        SummaryMode::Transcript => Arc::new(TranscriptSummarizer),
        SummaryMode::Llm => Arc::new(LlmSummarizer::new(
            &config.llm,
            config.summary.max_input_chars,
        )?),
    };
    Ok(summarizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::core::message::MessageEntry;

    #[tokio::test]
    async fn test_transcript_summary_format() {
        let history = vec![
            MessageEntry::user("Hello").stamp(),
            MessageEntry::assistant("Hi there!").stamp(),
        ];

        let summary = TranscriptSummarizer.summarize(&history).await.unwrap();
        assert_eq!(summary, "Summary:\nuser: Hello\nassistant: Hi there!");
    }

    #[test]
    fn test_transcript_summary_empty_history() {
        assert_eq!(transcript_summary(&[]), "Summary:\n");
    }

    #[test]
    fn test_build_summarizer_defaults_to_transcript() {
        let summarizer = build_summarizer(&WhiteboardConfig::default()).unwrap();
        assert_eq!(summarizer.name(), "transcript");
    }
}
