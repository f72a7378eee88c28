pub mod actor;
pub mod commands;
pub mod events;
pub mod handle;
pub mod mode;
pub mod snapshot;
pub mod state;
pub mod timers;

use std::sync::Arc;

use openings::{BookLine, OpeningRepository};
use rand::RngCore;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};

use crate::config::Timings;
use crate::persistence::JsonBlobStore;
use crate::progress::{ProgressLedger, ProgressState};
use actor::{run_trainer_actor, ProgressSink};
pub use commands::SessionError;
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use mode::{
    accuracy, CompletionStats, Feedback, FeedbackKind, GameOutcome, MoveOutcome, RejectReason,
    SessionPhase, TrainingMode,
};
pub use snapshot::SessionSnapshot;
pub use state::TrainingSession;
pub use timers::{ScheduledTask, TimerAction, TimerToken};

/// Owns the opening catalogue and progress, and runs at most one training
/// session at a time. Each session is an actor task.
pub struct Trainer {
    repository: Arc<OpeningRepository>,
    progress: Arc<RwLock<ProgressLedger>>,
    store: Option<Arc<Mutex<JsonBlobStore<ProgressState>>>>,
    timings: Timings,
    active: RwLock<Option<SessionHandle>>,
}

impl Trainer {
    /// A trainer whose progress lives only in memory.
    pub fn new(repository: OpeningRepository, timings: Timings) -> Self {
        Self {
            repository: Arc::new(repository),
            progress: Arc::new(RwLock::new(ProgressLedger::new())),
            store: None,
            timings,
            active: RwLock::new(None),
        }
    }

    /// Load progress from `store` and save it there after every completion.
    /// Saves run in the background; a failed save is logged and dropped.
    pub fn with_store(mut self, store: JsonBlobStore<ProgressState>) -> Self {
        let state = store.load_or_default();
        tracing::info!(
            path = ?store.file_path(),
            completed = state.total_completed,
            "Loaded progress"
        );
        self.progress = Arc::new(RwLock::new(ProgressLedger::from_state(state)));
        self.store = Some(Arc::new(Mutex::new(store)));
        self
    }

    pub fn repository(&self) -> &OpeningRepository {
        &self.repository
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Open a session on one variation. Any session already open is shut
    /// down first.
    pub async fn open_session(
        &self,
        opening_id: &str,
        variation_id: &str,
    ) -> Result<SessionHandle, SessionError> {
        if self.repository.get_by_id(opening_id).is_none() {
            return Err(SessionError::NotFound(format!("opening {}", opening_id)));
        }
        let line = self
            .repository
            .resolve_line(opening_id, variation_id)
            .ok_or_else(|| {
                SessionError::NotFound(format!("variation {} of {}", variation_id, opening_id))
            })?;
        Ok(self.open_line(line).await)
    }

    /// Open a session on an arbitrary line.
    pub async fn open_line(&self, line: BookLine) -> SessionHandle {
        let session = TrainingSession::new(line, self.timings);
        self.spawn(session).await
    }

    /// Like [`open_line`](Self::open_line) with a fixed random source for
    /// the opponent.
    pub async fn open_line_with_rng(
        &self,
        line: BookLine,
        rng: impl RngCore + Send + 'static,
    ) -> SessionHandle {
        let session = TrainingSession::new(line, self.timings).with_rng(rng);
        self.spawn(session).await
    }

    async fn spawn(&self, session: TrainingSession) -> SessionHandle {
        self.close_session().await;

        let session_id = session.session_id().to_string();
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (event_tx, _) = broadcast::channel(100);
        let sink = ProgressSink {
            ledger: self.progress.clone(),
            store: self.store.clone(),
        };

        tracing::info!(
            id = %session_id,
            opening = %session.line().opening_id,
            variation = %session.line().variation_id,
            "Opening training session"
        );
        tokio::spawn(async move {
            run_trainer_actor(session, cmd_rx, event_tx, sink).await;
        });

        let handle = SessionHandle::new(session_id, cmd_tx);
        *self.active.write().await = Some(handle.clone());
        handle
    }

    /// The open session, if any.
    pub async fn active(&self) -> Option<SessionHandle> {
        self.active
            .read()
            .await
            .as_ref()
            .filter(|h| !h.is_closed())
            .cloned()
    }

    /// Shut the open session down. Does nothing when none is open.
    pub async fn close_session(&self) {
        let previous = self.active.write().await.take();
        if let Some(handle) = previous {
            tracing::info!(id = %handle.id(), "Closing training session");
            handle.shutdown().await;
        }
    }

    /// A copy of the current progress.
    pub async fn progress(&self) -> ProgressState {
        self.progress.read().await.state().clone()
    }
}
