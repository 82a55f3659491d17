//! Persistent storage for session logs and summaries.

pub mod log_store;
pub mod memory_store;
pub mod sqlite_store;

pub use log_store::{LogStore, StoreFuture, open_store};
pub use memory_store::MemoryLogStore;
pub use sqlite_store::SqliteLogStore;
