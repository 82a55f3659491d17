//! Log store abstraction shared by every backend.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::session::core::config::{StorageBackend, StorageConfig};
use crate::session::core::errors::SessionResult;
use crate::session::core::message::Message;
use crate::session::storage::memory_store::MemoryLogStore;
use crate::session::storage::sqlite_store::SqliteLogStore;

/// Boxed future type for log store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Durable storage of one ordered log and one summary per session.
///
/// Implementations give no cross-operation transaction guarantee; callers
/// that need a consistent read-modify-write must serialize per session.
pub trait LogStore: Send + Sync {
    /// Load the full log for a session (empty when absent).
    ///
    /// # Errors
    /// Returns an error if storage access fails or the log cannot be decoded.
    fn load_log<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<Vec<Message>>>;

    /// Append one message and return the updated log.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn append<'a>(
        &'a self,
        session_id: &'a str,
        message: Message,
    ) -> StoreFuture<'a, SessionResult<Vec<Message>>>;

    /// Delete the log for a session. Deleting an absent log is not an error.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn delete_log<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<()>>;

    /// List session ids that start with `prefix` and currently have a log.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn list_ids<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, SessionResult<Vec<String>>>;

    /// Load the last persisted summary for a session.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn load_summary<'a>(
        &'a self,
        session_id: &'a str,
    ) -> StoreFuture<'a, SessionResult<Option<String>>>;

    /// Persist the summary for a session, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn store_summary<'a>(
        &'a self,
        session_id: &'a str,
        summary: String,
    ) -> StoreFuture<'a, SessionResult<()>>;

    /// Delete the summary for a session.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn delete_summary<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<()>>;

    /// Remove both the log and the summary of a session.
    ///
    /// # Errors
    /// Returns an error if either deletion fails.
    fn reset<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move {
            self.delete_log(session_id).await?;
            self.delete_summary(session_id).await
        })
    }
}

/// Build the store selected by `config`.
///
/// # Errors
/// Returns an error if the `SQLite` database cannot be opened.
pub async fn open_store(config: &StorageConfig) -> SessionResult<Arc<dyn LogStore>> {
    let store: Arc<dyn LogStore> = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteLogStore::new(config).await?),
        StorageBackend::Memory => Arc::new(MemoryLogStore::new()),
    };
    Ok(store)
}

/// Decode a persisted log value.
pub(crate) fn decode_log(raw: &str) -> Result<Vec<Message>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Encode a log for persistence.
pub(crate) fn encode_log(log: &[Message]) -> Result<String, serde_json::Error> {
    serde_json::to_string(log)
}
