//! Standard Algebraic Notation.

use cozy_chess::{Board, Move, Piece};

use crate::position::generate_legal;
use crate::types::PieceKind;
use crate::uci::{file_to_char, format_square, is_castling, rank_to_char};

/// Format a move as SAN. `board` is the position before the move.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = if is_castling(board, mv) {
        if (mv.to.file() as u8) > (mv.from.file() as u8) {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        }
    } else {
        format_body(board, mv)
    };

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        let has_reply = after.generate_moves(|mvs| mvs.into_iter().next().is_some());
        san.push(if has_reply { '+' } else { '#' });
    }
    san
}

fn format_body(board: &Board, mv: Move) -> String {
    let Some(piece) = board.piece_on(mv.from) else {
        return format!("{}{}", format_square(mv.from), format_square(mv.to));
    };
    let is_capture = board.color_on(mv.to).is_some_and(|c| c != board.side_to_move())
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

    let mut san = String::new();
    if piece == Piece::Pawn {
        if is_capture {
            san.push(file_to_char(mv.from));
            san.push('x');
        }
        san.push_str(&format_square(mv.to));
        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(PieceKind::from(promo).to_char_upper());
        }
        return san;
    }

    san.push(PieceKind::from(piece).to_char_upper());
    if piece != Piece::King {
        let rivals: Vec<Move> = generate_legal(board)
            .into_iter()
            .filter(|other| {
                other.to == mv.to
                    && other.from != mv.from
                    && board.piece_on(other.from) == Some(piece)
            })
            .collect();
        if !rivals.is_empty() {
            let file_unique = rivals.iter().all(|o| o.from.file() != mv.from.file());
            let rank_unique = rivals.iter().all(|o| o.from.rank() != mv.from.rank());
            if file_unique {
                san.push(file_to_char(mv.from));
            } else if rank_unique {
                san.push(rank_to_char(mv.from));
            } else {
                san.push(file_to_char(mv.from));
                san.push(rank_to_char(mv.from));
            }
        }
    }
    if is_capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));
    san
}

/// Strip annotations and normalise spellings so two SAN strings for the
/// same move compare equal.
fn normalize(san: &str) -> String {
    san.trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .chars()
        .filter(|&c| c != '=')
        .map(|c| if c == '0' { 'O' } else { c })
        .collect()
}

/// Parse a SAN move in the given position.
///
/// Accepts check/mate suffixes, `!`/`?` annotations, `0-0` castling and
/// promotions with or without `=`.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let wanted = normalize(san);
    if wanted.len() < 2 {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let mut found: Option<Move> = None;
    for mv in generate_legal(board) {
        if normalize(&format_san(board, mv)) == wanted {
            if found.is_some() {
                return Err(SanError::AmbiguousMove(san.to_string()));
            }
            found = Some(mv);
        }
    }
    found.ok_or_else(|| SanError::NoLegalMove(san.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
