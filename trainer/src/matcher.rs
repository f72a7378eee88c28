//! Comparing what the user played with what the book expects.

use chess::{format_square, parse_uci, PieceKind};
use openings::BookMove;

/// A move as the user expressed it: two squares and maybe a promotion piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    pub from: String,
    pub to: String,
    pub promotion: Option<PieceKind>,
}

impl MoveIntent {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, piece: PieceKind) -> Self {
        self.promotion = Some(piece);
        self
    }

    /// Parse `"e2e4"` / `"e7e8q"`.
    pub fn from_uci(uci: &str) -> Option<Self> {
        let parsed = parse_uci(uci)?;
        Some(Self {
            from: format_square(parsed.from),
            to: format_square(parsed.to),
            promotion: parsed.promotion,
        })
    }

    pub fn to_uci(&self) -> String {
        let mut s = format!("{}{}", self.from, self.to);
        if let Some(p) = self.promotion {
            s.push(p.to_char_lower());
        }
        s
    }
}

/// The from and to squares of a book move, e.g. for drawing a hint arrow.
pub fn expected_squares(expected: &BookMove) -> Option<(String, String)> {
    let uci = expected.uci.trim().to_ascii_lowercase();
    if uci.len() < 4 || !uci.is_ascii() {
        return None;
    }
    Some((uci[0..2].to_string(), uci[2..4].to_string()))
}

/// Does `attempt` play the book move `expected`?
///
/// Squares are compared against the first four characters of the book UCI.
/// A promotion is only compared when both sides name a piece, so an attempt
/// that leaves the piece out still matches a promoting book move.
pub fn is_expected_move(attempt: &MoveIntent, expected: &BookMove) -> bool {
    let Some((from, to)) = expected_squares(expected) else {
        return false;
    };
    if !attempt.from.trim().eq_ignore_ascii_case(&from)
        || !attempt.to.trim().eq_ignore_ascii_case(&to)
    {
        return false;
    }

    let book_promotion = expected
        .uci
        .trim()
        .chars()
        .nth(4)
        .and_then(PieceKind::from_char);
    match (attempt.promotion, book_promotion) {
        (Some(played), Some(book)) => played == book,
        _ => true,
    }
}
