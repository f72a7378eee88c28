use super::mode::CompletionStats;
use super::snapshot::SessionSnapshot;

/// Events broadcast from the training actor to all subscribers.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum SessionEvent {
    /// Full snapshot after any change.
    StateChanged(SessionSnapshot),
    /// Sent once when a run completes.
    Completed(CompletionStats),
}
