use chess::PieceColor;
use openings::BookMove;
use serde::Serialize;

/// How a line is being trained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TrainingMode {
    /// The line plays itself.
    Demo,
    /// The user reproduces the book. With a `side`, the other side's book
    /// moves are played automatically.
    Practice { side: Option<PieceColor> },
    /// A game against the scripted opponent.
    #[serde(rename = "versus")]
    VersusComputer { human: PieceColor },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "mode", rename_all = "camelCase")]
pub enum SessionPhase {
    NotStarted,
    Running(TrainingMode),
    Complete(TrainingMode),
}

impl SessionPhase {
    pub fn mode(&self) -> Option<TrainingMode> {
        match self {
            Self::NotStarted => None,
            Self::Running(mode) | Self::Complete(mode) => Some(*mode),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackKind {
    Correct,
    Incorrect,
    Hint,
}

/// Transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
    /// SAN of the book move, for Incorrect and Hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    /// No mode is running, the session is complete, or it is a demo.
    NotAccepting,
    NotYourTurn,
    Illegal,
}

/// What happened to a submitted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing changed.
    Rejected(RejectReason),
    /// Matched the book and was played.
    Correct { san: String },
    /// Did not match the book. `applied` says whether it was still played.
    Incorrect {
        attempted: String,
        expected: Option<BookMove>,
        applied: bool,
    },
    /// Played with no book to check against.
    Played { san: String },
}

impl MoveOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Result of a versus game, from the human's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GameOutcome {
    Won,
    Lost,
    Drawn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub opening_id: String,
    pub variation_id: String,
    pub mode: TrainingMode,
    pub correct: u32,
    pub incorrect: u32,
    pub accuracy: u8,
    pub outcome: Option<GameOutcome>,
}

/// Percentage of correct moves, rounded. 100 when nothing was attempted.
pub fn accuracy(correct: u32, incorrect: u32) -> u8 {
    let total = correct + incorrect;
    if total == 0 {
        return 100;
    }
    (f64::from(correct) / f64::from(total) * 100.0).round() as u8
}
