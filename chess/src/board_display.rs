//! Lightweight board representation for rendering from FEN.

use crate::types::{PieceColor, PieceKind};

/// An 8x8 board for display purposes only.
#[derive(Debug, Clone, Default)]
pub struct DisplayBoard {
    squares: [[Option<(PieceKind, PieceColor)>; 8]; 8],
}

impl DisplayBoard {
    /// Parse the board placement from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, DisplayBoardError> {
        let placement = fen
            .split_whitespace()
            .next()
            .ok_or(DisplayBoardError::InvalidFen)?;

        let mut squares = [[None; 8]; 8];
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(DisplayBoardError::InvalidFen);
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if file > 7 {
                    return Err(DisplayBoardError::InvalidFen);
                }
                let color = if c.is_uppercase() {
                    PieceColor::White
                } else {
                    PieceColor::Black
                };
                let kind = PieceKind::from_char(c).ok_or(DisplayBoardError::InvalidPiece(c))?;
                squares[rank][file] = Some((kind, color));
                file += 1;
            }
            if file > 8 {
                return Err(DisplayBoardError::InvalidFen);
            }
        }

        Ok(DisplayBoard { squares })
    }

    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file > 7 || rank > 7 {
            return None;
        }
        self.squares[rank as usize][file as usize]
    }

    /// Render as text, white pieces upper case and empty squares as `.`.
    ///
    /// `flipped` puts black at the bottom, for training the black side.
    /// `highlight` marks squares (e.g. the last move) with brackets.
    pub fn render_ascii(&self, flipped: bool, highlight: &[(u8, u8)]) -> String {
        let ranks: Vec<u8> = if flipped {
            (0..8).collect()
        } else {
            (0..8).rev().collect()
        };
        let files: Vec<u8> = if flipped {
            (0..8).rev().collect()
        } else {
            (0..8).collect()
        };

        let mut out = String::new();
        for &rank in &ranks {
            out.push_str(&format!("{} ", rank + 1));
            for &file in &files {
                let glyph = match self.piece_at(file, rank) {
                    Some((kind, PieceColor::White)) => kind.to_char_upper(),
                    Some((kind, PieceColor::Black)) => kind.to_char_lower(),
                    None => '.',
                };
                if highlight.contains(&(file, rank)) {
                    out.push('[');
                    out.push(glyph);
                    out.push(']');
                } else {
                    out.push(' ');
                    out.push(glyph);
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out.push_str("  ");
        for &file in &files {
            out.push(' ');
            out.push((b'a' + file) as char);
            out.push(' ');
        }
        out.push('\n');
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayBoardError {
    #[error("Invalid FEN string")]
    InvalidFen,
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::STARTING_FEN;

    #[test]
    fn test_starting_position() {
        let board = DisplayBoard::from_fen(STARTING_FEN).unwrap();
        assert_eq!(
            board.piece_at(4, 0),
            Some((PieceKind::King, PieceColor::White))
        );
        assert_eq!(
            board.piece_at(3, 7),
            Some((PieceKind::Queen, PieceColor::Black))
        );
        assert_eq!(board.piece_at(4, 4), None);
    }

    #[test]
    fn test_render_orientation() {
        let board = DisplayBoard::from_fen(STARTING_FEN).unwrap();

        let white = board.render_ascii(false, &[]);
        let first = white.lines().next().unwrap();
        assert!(first.starts_with("8 "));
        assert!(first.contains(" r "));
        assert!(white.lines().last().unwrap().trim_start().starts_with('a'));

        let black = board.render_ascii(true, &[(4, 1)]);
        assert!(black.lines().next().unwrap().starts_with("1 "));
        assert!(black.contains("[P]"));
        assert!(black.lines().last().unwrap().trim_start().starts_with('h'));
    }

    #[test]
    fn test_bad_fen() {
        assert!(DisplayBoard::from_fen("8/8/8 w - - 0 1").is_err());
        assert!(matches!(
            DisplayBoard::from_fen("8/8/8/8/8/8/8/7X w - - 0 1"),
            Err(DisplayBoardError::InvalidPiece('X'))
        ));
    }
}
