use chess::{LegalMoves, PieceColor};
use serde::Serialize;

use super::mode::{Feedback, GameOutcome, SessionPhase};

/// Complete, immutable view of a training session.
/// Broadcast after every change and handed out on subscribe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    /// Bumped on every reset or start.
    pub generation: u64,
    pub opening_id: String,
    pub opening_name: String,
    pub variation_id: String,
    pub variation_name: String,
    pub fen: String,
    pub side_to_move: PieceColor,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    /// SAN of every move played so far.
    pub history: Vec<String>,
    pub last_move: Option<(String, String)>,
    pub cursor: usize,
    pub line_length: usize,
    pub progress_percent: u8,
    pub phase: SessionPhase,
    pub feedback: Option<Feedback>,
    pub correct: u32,
    pub incorrect: u32,
    pub accuracy: u8,
    pub outcome: Option<GameOutcome>,
    pub in_book: bool,
    /// Empty whenever the user may not move.
    pub legal_moves: LegalMoves,
}

impl SessionSnapshot {
    /// Move list as `1. e4 e5 2. Nf3`.
    pub fn move_text(&self) -> String {
        let mut out = String::new();
        for (i, san) in self.history.iter().enumerate() {
            if i % 2 == 0 {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(&format!("{}. ", i / 2 + 1));
            } else {
                out.push(' ');
            }
            out.push_str(san);
        }
        out
    }
}
