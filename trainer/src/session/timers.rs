//! Deferred session actions.
//!
//! The session never sleeps. It queues [`ScheduledTask`]s and whoever owns
//! it fires them back after `delay`. A token carries the session generation
//! it was issued in; tasks from an older generation are ignored.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub generation: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Play the next book move in demo mode.
    DemoAdvance,
    /// Let the scripted opponent move.
    OpponentMove,
    /// Clear the feedback this token was issued with.
    ClearFeedback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub token: TimerToken,
    pub delay: Duration,
    pub action: TimerAction,
}
