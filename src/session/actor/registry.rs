//! Actor table keyed by session id.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::session::actor::session_actor::{
    SessionActor, SessionCommand, SubmitOutcome, SummaryPolicy,
};
use crate::session::core::errors::{SessionError, SessionResult};
use crate::session::core::message::MessageEntry;
use crate::session::storage::LogStore;
use crate::session::summarization::Summarizer;

/// Sending side of a live session actor.
struct SessionHandle {
    cmd_tx: mpsc::UnboundedSender<SessionCommand>,
    pending: Arc<AtomicUsize>,
}

/// Lazily spawns one [`SessionActor`] per session id and routes commands to it.
///
/// Commands are enqueued while holding the map entry, and an actor is only
/// retired while holding the same entry with nothing pending, so a session
/// never has two live actors. An actor whose task has died is replaced on
/// the next dispatch.
pub struct SessionRegistry {
    actors: DashMap<String, SessionHandle>,
    store: Arc<dyn LogStore>,
    summarizer: Arc<dyn Summarizer>,
    policy: SummaryPolicy,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(
        store: Arc<dyn LogStore>,
        summarizer: Arc<dyn Summarizer>,
        policy: SummaryPolicy,
    ) -> Self {
        Self {
            actors: DashMap::new(),
            store,
            summarizer,
            policy,
        }
    }

    /// Append `entry` to the session log through its actor.
    ///
    /// # Errors
    /// Returns store or generation errors from the actor, or
    /// [`SessionError::ActorUnavailable`] if the actor stopped.
    pub async fn submit(
        &self,
        session_id: &str,
        entry: MessageEntry,
    ) -> SessionResult<SubmitOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.dispatch(session_id, SessionCommand::Submit { entry, reply_tx })?;
        reply_rx
            .await
            .map_err(|_| SessionError::ActorUnavailable(session_id.to_string()))?
    }

    /// Clear the session log and summary, then retire the actor if idle.
    ///
    /// # Errors
    /// Returns store errors from the actor, or
    /// [`SessionError::ActorUnavailable`] if the actor stopped.
    pub async fn reset(&self, session_id: &str) -> SessionResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.dispatch(session_id, SessionCommand::Reset { reply_tx })?;
        reply_rx
            .await
            .map_err(|_| SessionError::ActorUnavailable(session_id.to_string()))??;
        self.retire_if_idle(session_id);
        Ok(())
    }

    /// Number of live actors.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.actors.len()
    }

    /// Whether `session_id` currently has a live actor.
    #[must_use]
    pub fn is_active(&self, session_id: &str) -> bool {
        self.actors.contains_key(session_id)
    }

    fn dispatch(&self, session_id: &str, cmd: SessionCommand) -> SessionResult<()> {
        let mut handle = self
            .actors
            .entry(session_id.to_string())
            .or_insert_with(|| self.spawn_actor(session_id));

        handle.pending.fetch_add(1, Ordering::AcqRel);
        let Err(mpsc::error::SendError(cmd)) = handle.cmd_tx.send(cmd) else {
            return Ok(());
        };

        // The actor task is gone; its pending count will never drain.
        warn!("Session actor for {session_id} stopped unexpectedly, respawning");
        *handle = self.spawn_actor(session_id);
        handle.pending.fetch_add(1, Ordering::AcqRel);
        if handle.cmd_tx.send(cmd).is_err() {
            handle.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(SessionError::ActorUnavailable(session_id.to_string()));
        }
        Ok(())
    }

    fn spawn_actor(&self, session_id: &str) -> SessionHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let actor = SessionActor::new(
            session_id.to_string(),
            Arc::clone(&self.store),
            Arc::clone(&self.summarizer),
            self.policy,
            Arc::clone(&pending),
        );
        tokio::spawn(actor.run(cmd_rx));
        debug!("Spawned session actor for {session_id}");

        SessionHandle { cmd_tx, pending }
    }

    fn retire_if_idle(&self, session_id: &str) {
        let removed = self
            .actors
            .remove_if(session_id, |_, handle| {
                handle.pending.load(Ordering::Acquire) == 0
            })
            .is_some();
        if removed {
            debug!("Retired session actor for {session_id}");
        }
    }
}
