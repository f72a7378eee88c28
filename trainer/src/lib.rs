//! Opening trainer: drills book lines against a scripted opponent and keeps
//! track of progress and a personal repertoire.

pub mod config;
pub mod matcher;
pub mod opponent;
pub mod persistence;
pub mod progress;
pub mod repertoire;
pub mod session;

pub use matcher::{is_expected_move, MoveIntent};
pub use opponent::{MoveChoice, OpponentDriver};
pub use progress::{ProgressLedger, ProgressState, VariationProgress};
pub use repertoire::{Repertoire, RepertoireError, RepertoireGroup, RepertoireItem, RepertoireStats};
pub use session::{
    SessionEvent, SessionHandle, SessionSnapshot, Trainer, TrainingMode, TrainingSession,
};
