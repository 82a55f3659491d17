//! Summarization strategies for session logs.

pub mod llm_summarizer;
pub mod transcript;

pub use llm_summarizer::LlmSummarizer;
pub use transcript::{
    SUMMARY_HEADER, Summarizer, SummaryFuture, TranscriptSummarizer, build_summarizer,
    transcript_summary,
};
