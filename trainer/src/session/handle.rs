use tokio::sync::{broadcast, mpsc, oneshot};

use crate::matcher::MoveIntent;

use super::commands::{SessionCommand, SessionError};
use super::events::SessionEvent;
use super::mode::{MoveOutcome, TrainingMode};
use super::snapshot::SessionSnapshot;

/// Cheap, cloneable handle to a training actor.
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(id: String, cmd_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { id, cmd_tx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn start(&self, mode: TrainingMode) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Start { mode, reply: tx }).await?;
        rx.await.map_err(|_| SessionError::ReplyDropped)
    }

    pub async fn submit_move(
        &self,
        intent: MoveIntent,
    ) -> Result<(MoveOutcome, SessionSnapshot), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::SubmitMove { intent, reply: tx })
            .await?;
        rx.await.map_err(|_| SessionError::ReplyDropped)
    }

    pub async fn hint(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Hint { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::ReplyDropped)
    }

    pub async fn reset(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Reset { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::ReplyDropped)
    }

    pub async fn get_snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::GetSnapshot { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::ReplyDropped)
    }

    pub async fn subscribe(
        &self,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SessionEvent>), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Subscribe { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::ReplyDropped)
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::ActorClosed)
    }
}
