//! Whiteboard service: the operations exposed to the HTTP layer.

use std::sync::Arc;

use tracing::info;

use crate::session::actor::{SessionRegistry, SubmitOutcome, SummaryPolicy};
use crate::session::core::config::WhiteboardConfig;
use crate::session::core::errors::{SessionError, SessionResult};
use crate::session::core::message::{Message, Submission};
use crate::session::storage::{LogStore, open_store};
use crate::session::summarization::{Summarizer, build_summarizer};

/// Text returned by [`WhiteboardService::summary`] before any regeneration.
pub const NO_SUMMARY_YET: &str = "No summary yet.";

/// Session operations backed by a shared store and the actor table.
///
/// Mutations go through the session's actor. Reads (`history`, `summary`,
/// `list_sessions`) hit the store directly and are not ordered against
/// in-flight submissions.
pub struct WhiteboardService {
    store: Arc<dyn LogStore>,
    registry: SessionRegistry,
}

impl WhiteboardService {
    /// Assemble a service from explicit parts.
    #[must_use]
    pub fn new(
        store: Arc<dyn LogStore>,
        summarizer: Arc<dyn Summarizer>,
        policy: SummaryPolicy,
    ) -> Self {
        let registry = SessionRegistry::new(Arc::clone(&store), summarizer, policy);
        Self { store, registry }
    }

    /// Build the store and summarizer selected by `config`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or a backend cannot
    /// be initialized.
    pub async fn from_config(config: &WhiteboardConfig) -> SessionResult<Self> {
        config.validate()?;
        let store = open_store(&config.storage).await?;
        let summarizer = build_summarizer(config)?;
        let policy = SummaryPolicy {
            interval: config.summary.interval,
            timeout: config.llm.timeout(),
        };
        info!(
            "Whiteboard service ready ({:?} storage, {} summarizer, interval {})",
            config.storage.backend,
            summarizer.name(),
            policy.interval
        );
        Ok(Self::new(store, summarizer, policy))
    }

    /// Validate and append a submission to `session_id`.
    ///
    /// # Errors
    /// Returns [`SessionError::Validation`] before any mutation for a bad
    /// session id or submission; otherwise store or generation errors.
    pub async fn submit(
        &self,
        session_id: &str,
        submission: Submission,
    ) -> SessionResult<SubmitOutcome> {
        check_session_id(session_id)?;
        let entry = submission.validate()?;
        self.registry.submit(session_id, entry).await
    }

    /// Full log of `session_id`, empty when the session is absent.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn history(&self, session_id: &str) -> SessionResult<Vec<Message>> {
        self.store.load_log(session_id).await
    }

    /// Last persisted summary, or [`NO_SUMMARY_YET`].
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn summary(&self, session_id: &str) -> SessionResult<String> {
        Ok(self
            .store
            .load_summary(session_id)
            .await?
            .unwrap_or_else(|| NO_SUMMARY_YET.to_string()))
    }

    /// Every session that currently has a log. Best-effort snapshot.
    ///
    /// # Errors
    /// Returns an error if the store cannot be scanned.
    pub async fn list_sessions(&self) -> SessionResult<Vec<String>> {
        self.store.list_ids("").await
    }

    /// Clear log and summary of `session_id`.
    ///
    /// # Errors
    /// Returns [`SessionError::Validation`] for an empty id, otherwise store errors.
    pub async fn reset(&self, session_id: &str) -> SessionResult<()> {
        check_session_id(session_id)?;
        self.registry.reset(session_id).await
    }

    /// The actor table, for inspection.
    #[must_use]
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

fn check_session_id(session_id: &str) -> SessionResult<()> {
    if session_id.is_empty() {
        return Err(SessionError::Validation(
            "session id must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::actor::PLACEHOLDER_SUMMARY;
    use crate::session::core::config::StorageBackend;
    use crate::session::storage::MemoryLogStore;
    use crate::session::summarization::TranscriptSummarizer;

    fn service() -> WhiteboardService {
        WhiteboardService::new(
            Arc::new(MemoryLogStore::new()),
            Arc::new(TranscriptSummarizer),
            SummaryPolicy {
                interval: 3,
                timeout: Duration::from_secs(5),
            },
        )
    }

    fn user(content: &str) -> Submission {
        Submission {
            role: "user".to_string(),
            content: content.to_string(),
            name: None,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_team_sync_scenario() {
        let service = service();

        let first = service.submit("team-sync", user("agenda?")).await.unwrap();
        let second = service.submit("team-sync", user("ship it")).await.unwrap();
        assert_eq!(first.summary, PLACEHOLDER_SUMMARY);
        assert_eq!(second.summary, PLACEHOLDER_SUMMARY);

        let third = service.submit("team-sync", user("agreed")).await.unwrap();
        assert_ne!(third.summary, PLACEHOLDER_SUMMARY);
        for text in ["agenda?", "ship it", "agreed"] {
            assert!(third.summary.contains(text));
        }
        assert_eq!(service.summary("team-sync").await.unwrap(), third.summary);
    }

    #[tokio::test]
    async fn test_invalid_submission_does_not_mutate() {
        let service = service();
        service.submit("s", user("kept")).await.unwrap();

        let empty = service.submit("s", user("")).await.unwrap_err();
        let mut bad_role = user("x");
        bad_role.role = "system".to_string();
        let role = service.submit("s", bad_role).await.unwrap_err();

        assert!(matches!(empty, SessionError::Validation(_)));
        assert!(matches!(role, SessionError::Validation(_)));
        assert_eq!(service.history("s").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_submission_on_new_session_spawns_nothing() {
        let service = service();
        service.submit("fresh", user("")).await.unwrap_err();

        assert_eq!(service.registry().active_sessions(), 0);
        assert!(service.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_history_is_empty() {
        let service = service();
        assert!(service.history("unknown-id").await.unwrap().is_empty());
        assert_eq!(service.summary("unknown-id").await.unwrap(), NO_SUMMARY_YET);
    }

    #[tokio::test]
    async fn test_reset_removes_from_listing() {
        let service = service();
        service.submit("team-sync", user("a")).await.unwrap();
        service.submit("retro", user("b")).await.unwrap();

        service.reset("team-sync").await.unwrap();

        assert_eq!(service.list_sessions().await.unwrap(), vec!["retro"]);
        assert!(service.history("team-sync").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_session_id_rejected() {
        let service = service();
        let err = service.submit("", user("x")).await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[tokio::test]
    async fn test_from_config_with_memory_backend() {
        let mut config = WhiteboardConfig::default();
        config.storage.backend = StorageBackend::Memory;

        let service = WhiteboardService::from_config(&config).await.unwrap();
        let outcome = service.submit("s", user("x")).await.unwrap();
        assert_eq!(outcome.history.len(), 1);
    }
}
