//! Core session types, configuration, and errors.

pub mod config;
pub mod errors;
pub mod keys;
pub mod message;

pub use config::{
    LlmConfig, ServerConfig, StorageBackend, StorageConfig, SummaryConfig, SummaryMode,
    WhiteboardConfig,
};
pub use errors::{ErrorClass, SessionError, SessionResult};
pub use message::{Message, MessageEntry, Role, Submission};
