use tokio::sync::{broadcast, oneshot};

use crate::matcher::MoveIntent;

use super::events::SessionEvent;
use super::mode::{MoveOutcome, TrainingMode};
use super::snapshot::SessionSnapshot;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Session actor closed")]
    ActorClosed,
    #[error("Reply dropped")]
    ReplyDropped,
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Commands sent to the training actor. Each embeds a oneshot for the reply.
pub enum SessionCommand {
    Start {
        mode: TrainingMode,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    SubmitMove {
        intent: MoveIntent,
        reply: oneshot::Sender<(MoveOutcome, SessionSnapshot)>,
    },
    Hint {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Reset {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
