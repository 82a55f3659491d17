//! Process-local log store.

use std::sync::Arc;

use dashmap::DashMap;

use crate::session::core::errors::SessionResult;
use crate::session::core::keys::{self, LOG_PREFIX};
use crate::session::core::message::Message;
use crate::session::storage::log_store::{LogStore, StoreFuture, decode_log, encode_log};

/// In-memory log store keyed like the persistent layout.
#[derive(Clone, Default)]
pub struct MemoryLogStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryLogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of raw keys currently held.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

impl LogStore for MemoryLogStore {
    fn load_log<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<Vec<Message>>> {
        Box::pin(async move {
            let raw = self
                .entries
                .get(&keys::log_key(session_id))
                .map(|entry| entry.value().clone());
            match raw {
                Some(raw) => Ok(decode_log(&raw)?),
                None => Ok(Vec::new()),
            }
        })
    }

    fn append<'a>(
        &'a self,
        session_id: &'a str,
        message: Message,
    ) -> StoreFuture<'a, SessionResult<Vec<Message>>> {
        Box::pin(async move {
            let mut log = self.load_log(session_id).await?;
            log.push(message);
            let encoded = encode_log(&log)?;
            self.entries.insert(keys::log_key(session_id), encoded);
            Ok(log)
        })
    }

    fn delete_log<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move {
            self.entries.remove(&keys::log_key(session_id));
            Ok(())
        })
    }

    fn list_ids<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, SessionResult<Vec<String>>> {
        Box::pin(async move {
            let key_prefix = format!("{LOG_PREFIX}{prefix}");
            let mut ids: Vec<String> = self
                .entries
                .iter()
                .filter(|entry| entry.key().starts_with(&key_prefix))
                .filter_map(|entry| keys::session_id_from_log_key(entry.key()).map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn load_summary<'a>(
        &'a self,
        session_id: &'a str,
    ) -> StoreFuture<'a, SessionResult<Option<String>>> {
        Box::pin(async move {
            Ok(self
                .entries
                .get(&keys::summary_key(session_id))
                .map(|entry| entry.value().clone()))
        })
    }

    fn store_summary<'a>(
        &'a self,
        session_id: &'a str,
        summary: String,
    ) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move {
            self.entries.insert(keys::summary_key(session_id), summary);
            Ok(())
        })
    }

    fn delete_summary<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move {
            self.entries.remove(&keys::summary_key(session_id));
            Ok(())
        })
    }
}
