//! Serial actor owning all mutations of one session.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::session::core::errors::{SessionError, SessionResult};
use crate::session::core::message::{Message, MessageEntry};
use crate::session::storage::LogStore;
use crate::session::summarization::Summarizer;

/// Summary returned while the log length is not on an interval boundary.
pub const PLACEHOLDER_SUMMARY: &str = "(waiting for more input...)";

// ── Channel protocol ─────────────────────────────────────────────────────────

/// Commands accepted by a session actor.
pub(super) enum SessionCommand {
    Submit {
        entry: MessageEntry,
        reply_tx: oneshot::Sender<SessionResult<SubmitOutcome>>,
    },
    Reset {
        reply_tx: oneshot::Sender<SessionResult<()>>,
    },
}

/// Result of a successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Fresh summary, or [`PLACEHOLDER_SUMMARY`].
    pub summary: String,
    /// Full log after the append.
    pub history: Vec<Message>,
    /// Whether the summary was regenerated by this submission.
    pub regenerated: bool,
}

/// When summaries are regenerated and how long generation may take.
#[derive(Clone, Copy, Debug)]
pub struct SummaryPolicy {
    /// Regenerate when the log length is a positive multiple of this.
    pub interval: usize,
    /// Upper bound on one summarizer call.
    pub timeout: Duration,
}

impl SummaryPolicy {
    /// Whether a log of `len` messages triggers regeneration.
    #[must_use]
    pub const fn is_due(&self, len: usize) -> bool {
        self.interval > 0 && len > 0 && len % self.interval == 0
    }
}

// ── Actor ────────────────────────────────────────────────────────────────────

/// Processes one session's commands strictly one at a time.
pub(super) struct SessionActor {
    session_id: String,
    store: Arc<dyn LogStore>,
    summarizer: Arc<dyn Summarizer>,
    policy: SummaryPolicy,
    /// Commands sent but not yet finished; shared with the registry handle.
    pending: Arc<AtomicUsize>,
}

impl SessionActor {
    pub(super) fn new(
        session_id: String,
        store: Arc<dyn LogStore>,
        summarizer: Arc<dyn Summarizer>,
        policy: SummaryPolicy,
        pending: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            session_id,
            store,
            summarizer,
            policy,
            pending,
        }
    }

    /// Run until every sender is dropped.
    pub(super) async fn run(self, mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>) {
        debug!("Session actor started for {}", self.session_id);
        while let Some(cmd) = cmd_rx.recv().await {
            self.handle_command(cmd).await;
        }
        debug!("Session actor stopped for {}", self.session_id);
    }

    async fn handle_command(&self, cmd: SessionCommand) {
        // `pending` drops before the reply so a caller woken by the reply
        // observes this command as finished.
        match cmd {
            SessionCommand::Submit { entry, reply_tx } => {
                let result = self.submit(entry).await;
                self.pending.fetch_sub(1, Ordering::AcqRel);
                let _ = reply_tx.send(result);
            }
            SessionCommand::Reset { reply_tx } => {
                let result = self.reset().await;
                self.pending.fetch_sub(1, Ordering::AcqRel);
                let _ = reply_tx.send(result);
            }
        }
    }

    async fn submit(&self, entry: MessageEntry) -> SessionResult<SubmitOutcome> {
        let history = self.store.append(&self.session_id, entry.stamp()).await?;

        if !self.policy.is_due(history.len()) {
            return Ok(SubmitOutcome {
                summary: PLACEHOLDER_SUMMARY.to_string(),
                history,
                regenerated: false,
            });
        }

        // The appended message stays even if generation fails below.
        let summary = self.regenerate(&history).await?;
        self.store
            .store_summary(&self.session_id, summary.clone())
            .await?;
        info!(
            "Regenerated summary for session {} at {} messages",
            self.session_id,
            history.len()
        );

        Ok(SubmitOutcome {
            summary,
            history,
            regenerated: true,
        })
    }

    async fn regenerate(&self, history: &[Message]) -> SessionResult<String> {
        let generated =
            tokio::time::timeout(self.policy.timeout, self.summarizer.summarize(history)).await;

        let summary = match generated {
            Err(_) => {
                warn!(
                    "{} summarizer timed out for session {}",
                    self.summarizer.name(),
                    self.session_id
                );
                return Err(SessionError::GenerationTimeout(self.policy.timeout));
            }
            Ok(Err(err)) => {
                warn!(
                    "{} summarizer failed for session {}: {err}",
                    self.summarizer.name(),
                    self.session_id
                );
                return Err(match err {
                    SessionError::Generation(_) | SessionError::GenerationTimeout(_) => err,
                    other => SessionError::Generation(other.to_string()),
                });
            }
            Ok(Ok(summary)) => summary,
        };

        if summary.trim().is_empty() {
            return Err(SessionError::Generation(
                "summarizer returned empty text".to_string(),
            ));
        }

        Ok(summary)
    }

    async fn reset(&self) -> SessionResult<()> {
        self.store.reset(&self.session_id).await?;
        info!("Reset session {}", self.session_id);
        Ok(())
    }
}
