//! UCI (Universal Chess Interface) coordinate notation.
//!
//! cozy-chess encodes castling as "king captures own rook" (e1h1). Everything
//! that leaves this crate uses the standard king-two-squares form (e1g1).

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::types::PieceKind;

/// A parsed coordinate move: origin, destination and optional promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

/// Parse a square such as `"e4"`.
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.trim().chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let file = File::try_index((file.to_ascii_lowercase() as usize).checked_sub('a' as usize)?)?;
    let rank = Rank::try_index((rank as usize).checked_sub('1' as usize)?)?;
    Some(Square::new(file, rank))
}

/// Parse a 4 or 5 character coordinate move (`"e2e4"`, `"e7e8q"`).
pub fn parse_uci(s: &str) -> Option<UciMove> {
    let s = s.trim();
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return None;
    }
    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;
    let promotion = match s[4..].chars().next() {
        Some(c) => {
            let kind = PieceKind::from_char(c)?;
            if !kind.is_promotion_piece() {
                return None;
            }
            Some(kind)
        }
        None => None,
    };
    Some(UciMove {
        from,
        to,
        promotion,
    })
}

pub fn format_square(square: Square) -> String {
    let mut s = String::with_capacity(2);
    s.push(file_to_char(square));
    s.push(rank_to_char(square));
    s
}

pub(crate) fn file_to_char(square: Square) -> char {
    match square.file() {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    }
}

pub(crate) fn rank_to_char(square: Square) -> char {
    match square.rank() {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    }
}

/// True when `mv` is cozy-chess's king-takes-own-rook castling encoding.
pub(crate) fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to).is_some()
        && board.color_on(mv.to) == board.color_on(mv.from)
}

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// The conversion only happens when the piece on the origin square is a king
/// and the converted move is present in `legal_moves`.
pub fn convert_uci_castling_to_cozy(board: &Board, mv: Move, legal_moves: &[Move]) -> Move {
    if board.piece_on(mv.from) != Some(Piece::King) || mv.promotion.is_some() {
        return mv;
    }

    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let same_rank = mv.from.rank() == mv.to.rank();

    if is_rank_1_or_8 && is_e_file && same_rank {
        let rook_file = match mv.to.file() {
            File::G => File::H,
            File::C => File::A,
            _ => return mv,
        };

        let converted = Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        };

        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Format a move in standard UCI notation (e.g., "e2e4", "e7e8q", "e1g1").
///
/// `board` is the position before the move; it is needed to recognise
/// castling.
pub fn format_uci_move(board: &Board, mv: Move) -> String {
    let to = if is_castling(board, mv) {
        let king_file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
            File::G
        } else {
            File::C
        };
        Square::new(king_file, mv.from.rank())
    } else {
        mv.to
    };

    let mut s = format!("{}{}", format_square(mv.from), format_square(to));
    if let Some(promo) = mv.promotion {
        s.push(PieceKind::from(promo).to_char_lower());
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from: &str, to: &str) -> Move {
        Move {
            from: parse_square(from).unwrap(),
            to: parse_square(to).unwrap(),
            promotion: None,
        }
    }

    #[test]
    fn test_parse_square() {
        assert_eq!(parse_square("e4"), Some(Square::new(File::E, Rank::Fourth)));
        assert_eq!(parse_square("A1"), Some(Square::new(File::A, Rank::First)));
        assert_eq!(parse_square("i1"), None);
        assert_eq!(parse_square("e9"), None);
        assert_eq!(parse_square("e"), None);
        assert_eq!(parse_square("e44"), None);
    }

    #[test]
    fn test_parse_uci() {
        let parsed = parse_uci("e7e8q").unwrap();
        assert_eq!(parsed.promotion, Some(PieceKind::Queen));
        assert_eq!(format_square(parsed.to), "e8");
        assert!(parse_uci("e7e8k").is_none());
        assert!(parse_uci("e2").is_none());
        assert!(parse_uci("e2e4e5").is_none());
    }

    #[test]
    fn test_format_uci_move() {
        let board = Board::default();
        assert_eq!(format_uci_move(&board, mv("e2", "e4")), "e2e4");
    }

    #[test]
    fn test_format_uci_move_with_promotion() {
        let board: Board = "8/4P3/8/8/8/8/k7/7K w - - 0 1".parse().unwrap();
        let promo = Move {
            from: parse_square("e7").unwrap(),
            to: parse_square("e8").unwrap(),
            promotion: Some(Piece::Queen),
        };
        assert_eq!(format_uci_move(&board, promo), "e7e8q");
    }

    #[test]
    fn test_castling_round_trip() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let mut legal = Vec::new();
        board.generate_moves(|mvs| {
            legal.extend(mvs);
            false
        });

        let cozy = convert_uci_castling_to_cozy(&board, mv("e1", "g1"), &legal);
        assert_eq!(cozy, mv("e1", "h1"));
        assert_eq!(format_uci_move(&board, cozy), "e1g1");

        let cozy = convert_uci_castling_to_cozy(&board, mv("e1", "c1"), &legal);
        assert_eq!(cozy, mv("e1", "a1"));
        assert_eq!(format_uci_move(&board, cozy), "e1c1");
    }

    #[test]
    fn test_rook_move_is_not_castling() {
        // Rook on e1, king elsewhere: e1g1 is a plain rook move.
        let board: Board = "4k3/8/8/8/8/8/8/K3R3 w - - 0 1".parse().unwrap();
        let mut legal = Vec::new();
        board.generate_moves(|mvs| {
            legal.extend(mvs);
            false
        });
        let converted = convert_uci_castling_to_cozy(&board, mv("e1", "g1"), &legal);
        assert_eq!(converted, mv("e1", "g1"));
    }
}
