use cozy_chess::Board;

use crate::position::Position;

/// FEN of the standard initial position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.is_empty() {
        return Err(FenError::InvalidFormat);
    }
    if parts[0].split('/').count() != 8 {
        return Err(FenError::InvalidBoardLayout);
    }

    fen.trim().parse().map_err(|_| FenError::InvalidFormat)
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

/// Replay SAN moves from the initial position and return the resulting FEN.
///
/// Replay stops at the first move that does not parse in the current
/// position; the FEN reached so far is returned.
pub fn fen_from_moves<S: AsRef<str>>(sans: &[S]) -> String {
    let mut position = Position::new();
    for san in sans {
        match position.apply_san(san.as_ref()) {
            Ok((next, _)) => position = next,
            Err(_) => break,
        }
    }
    position.to_fen()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
    #[error("Invalid board layout")]
    InvalidBoardLayout,
}
