//! `SQLite` key-value store for session logs and summaries.

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::session::core::config::StorageConfig;
use crate::session::core::errors::SessionResult;
use crate::session::core::keys::{self, LOG_PREFIX};
use crate::session::core::message::Message;
use crate::session::storage::log_store::{LogStore, StoreFuture, decode_log, encode_log};

/// `SQLite` implementation of the log store.
///
/// Data lives in a single `(key, value)` table using the layout from
/// [`crate::session::core::keys`].
pub struct SqliteLogStore {
    conn: Connection,
    table: String,
}

impl SqliteLogStore {
    /// Initialize the store on the configured database file.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> SessionResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        Self::with_connection(conn, config.kv_table.clone()).await
    }

    /// Initialize the store on an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be created.
    pub async fn in_memory(table: impl Into<String>) -> SessionResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn, table.into()).await
    }

    async fn with_connection(conn: Connection, table: String) -> SessionResult<Self> {
        let table_name = table.clone();

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                )"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self { conn, table })
    }

    async fn get_value(&self, key: String) -> SessionResult<Option<String>> {
        let table = self.table.clone();
        let value = self
            .conn
            .call(move |conn| {
                let value = conn
                    .query_row(
                        &format!("SELECT value FROM {table} WHERE key = ?1"),
                        rusqlite::params![key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await?;
        Ok(value)
    }

    async fn put_value(&self, key: String, value: String) -> SessionResult<()> {
        let table = self.table.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    &format!("INSERT OR REPLACE INTO {table} (key, value) VALUES (?1, ?2)"),
                    rusqlite::params![key, value],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn delete_keys(&self, keys: Vec<String>) -> SessionResult<()> {
        let table = self.table.clone();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(&format!("DELETE FROM {table} WHERE key = ?1"))?;
                    for key in keys {
                        stmt.execute(rusqlite::params![key])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

impl LogStore for SqliteLogStore {
    fn load_log<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<Vec<Message>>> {
        Box::pin(async move {
            let raw = self.get_value(keys::log_key(session_id)).await?;
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
            self.put_value(keys::log_key(session_id), encoded).await?;
            debug!("Appended message {} to session {session_id}", log.len());
            Ok(log)
        })
    }

    fn delete_log<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move { self.delete_keys(vec![keys::log_key(session_id)]).await })
    }

    fn list_ids<'a>(&'a self, prefix: &'a str) -> StoreFuture<'a, SessionResult<Vec<String>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let key_prefix = format!("{LOG_PREFIX}{prefix}");
            let rows = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT key FROM {table}
                         WHERE substr(key, 1, length(?1)) = ?1
                         ORDER BY key"
                    ))?;
                    let rows = stmt
                        .query_map(rusqlite::params![key_prefix], |row| row.get::<_, String>(0))?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await?;

            Ok(rows
                .iter()
                .filter_map(|key| keys::session_id_from_log_key(key))
                .map(str::to_string)
                .collect())
        })
    }

    fn load_summary<'a>(
        &'a self,
        session_id: &'a str,
    ) -> StoreFuture<'a, SessionResult<Option<String>>> {
        Box::pin(async move { self.get_value(keys::summary_key(session_id)).await })
    }

    fn store_summary<'a>(
        &'a self,
        session_id: &'a str,
        summary: String,
    ) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move { self.put_value(keys::summary_key(session_id), summary).await })
    }

    fn delete_summary<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move { self.delete_keys(vec![keys::summary_key(session_id)]).await })
    }

    fn reset<'a>(&'a self, session_id: &'a str) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move {
            self.delete_keys(vec![
                keys::log_key(session_id),
                keys::summary_key(session_id),
            ])
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::core::errors::SessionError;
    use crate::session::core::message::MessageEntry;

    async fn store() -> SqliteLogStore {
        SqliteLogStore::in_memory("test_kv").await.unwrap()
    }

    #[tokio::test]
    async fn test_absent_log_is_empty() {
        let store = store().await;
        assert!(store.load_log("unknown-id").await.unwrap().is_empty());
        assert!(store.load_summary("unknown-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = store().await;
        store
            .append("team-sync", MessageEntry::user("one").stamp())
            .await
            .unwrap();
        let log = store
            .append("team-sync", MessageEntry::assistant("two").stamp())
            .await
            .unwrap();

        assert_eq!(log.len(), 2);
        let reloaded = store.load_log("team-sync").await.unwrap();
        assert_eq!(reloaded, log);
        assert_eq!(reloaded[0].content, "one");
        assert_eq!(reloaded[1].content, "two");
    }

    #[tokio::test]
    async fn test_list_ids_by_prefix() {
        let store = store().await;
        for id in ["team-sync", "team-retro", "solo"] {
            store.append(id, MessageEntry::user("x").stamp()).await.unwrap();
        }
        store
            .store_summary("orphan", "summary only".to_string())
            .await
            .unwrap();

        let all = store.list_ids("").await.unwrap();
        assert_eq!(all, vec!["solo", "team-retro", "team-sync"]);
        let team = store.list_ids("team-").await.unwrap();
        assert_eq!(team, vec!["team-retro", "team-sync"]);
    }

    #[tokio::test]
    async fn test_list_ids_treats_wildcards_literally() {
        let store = store().await;
        store.append("a%b", MessageEntry::user("x").stamp()).await.unwrap();
        store.append("axb", MessageEntry::user("x").stamp()).await.unwrap();

        assert_eq!(store.list_ids("a%").await.unwrap(), vec!["a%b"]);
    }

    #[tokio::test]
    async fn test_reset_removes_log_and_summary() {
        let store = store().await;
        store
            .append("team-sync", MessageEntry::user("x").stamp())
            .await
            .unwrap();
        store
            .store_summary("team-sync", "Summary:\nuser: x".to_string())
            .await
            .unwrap();

        store.reset("team-sync").await.unwrap();

        assert!(store.load_log("team-sync").await.unwrap().is_empty());
        assert!(store.load_summary("team-sync").await.unwrap().is_none());
        assert!(store.list_ids("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_log_is_store_error() {
        let store = store().await;
        store
            .put_value(keys::log_key("broken"), "not json".to_string())
            .await
            .unwrap();

        let err = store.load_log("broken").await.unwrap_err();
        assert!(matches!(err, SessionError::Serialization(_)));
    }
}
