//! Session subsystem for the whiteboard service.
//!
//! Organized into:
//! - `core`: configuration, errors, message model, and storage keys
//! - `storage`: the log store trait with `SQLite` and in-memory backends
//! - `summarization`: transcript and LLM summary strategies
//! - `actor`: per-session serial actors and the actor table
//! - `service`: the operations used by the HTTP layer

pub mod actor;
pub mod core;
pub mod service;
pub mod storage;
pub mod summarization;

pub use actor::{PLACEHOLDER_SUMMARY, SessionRegistry, SubmitOutcome, SummaryPolicy};
pub use self::core::{
    ErrorClass, LlmConfig, Message, MessageEntry, Role, ServerConfig, SessionError,
    SessionResult, StorageBackend, StorageConfig, Submission, SummaryConfig, SummaryMode,
    WhiteboardConfig,
};
pub use service::{NO_SUMMARY_YET, WhiteboardService};
pub use storage::{LogStore, MemoryLogStore, SqliteLogStore, StoreFuture};
pub use summarization::{LlmSummarizer, Summarizer, SummaryFuture, TranscriptSummarizer};
