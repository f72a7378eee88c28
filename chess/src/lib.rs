//! Position layer for the opening trainer.
//!
//! Wraps cozy-chess behind project-owned types: positions are immutable
//! values, moves go in and out as coordinate strings, and notation (SAN and
//! UCI) is produced here so that callers never touch cozy-chess directly.

pub mod board_display;
pub mod fen;
pub mod position;
pub mod san;
pub mod types;
pub mod uci;

pub use board_display::{DisplayBoard, DisplayBoardError};
pub use fen::{fen_from_moves, FenError, STARTING_FEN};
pub use position::{LegalMoves, PlayedMove, Position, PositionError};
pub use san::SanError;
pub use types::{PieceColor, PieceKind};
pub use uci::{format_square, parse_square, parse_uci, UciMove};
