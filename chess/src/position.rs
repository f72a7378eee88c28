//! Immutable chess position.
//!
//! Every mutating operation returns a new [`Position`]; the receiver is
//! never changed. Moves cross the API as coordinate strings.

use std::collections::{BTreeMap, BTreeSet};

use cozy_chess::{Board, GameStatus, Move, Piece, Rank};
use serde::{Deserialize, Serialize};

use crate::fen::{format_fen, parse_fen, FenError};
use crate::san::{format_san, parse_san, SanError};
use crate::types::{PieceColor, PieceKind};
use crate::uci::{convert_uci_castling_to_cozy, format_uci_move, parse_square, parse_uci};

/// Legal destinations grouped by origin square, both as `"e2"`-style names.
pub type LegalMoves = BTreeMap<String, BTreeSet<String>>;

/// A move that has been applied to a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedMove {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
    pub san: String,
    pub uci: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion piece: {0}")]
    InvalidPromotion(char),
    #[error("Invalid UCI move: {0}")]
    InvalidUci(String),
    #[error(transparent)]
    San(#[from] SanError),
}

/// Collect every legal move of `board` in generation order.
pub(crate) fn generate_legal(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard initial position.
    pub fn new() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self {
            board: parse_fen(fen)?,
        })
    }

    pub fn to_fen(&self) -> String {
        format_fen(&self.board)
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.board.side_to_move().into()
    }

    pub fn is_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    pub fn has_legal_moves(&self) -> bool {
        self.board
            .generate_moves(|mvs| mvs.into_iter().next().is_some())
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.has_legal_moves()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.has_legal_moves()
    }

    pub fn is_game_over(&self) -> bool {
        self.board.status() != GameStatus::Ongoing
    }

    /// Legal moves as origin -> destinations. Castling appears as the king's
    /// two-square move; the four promotion choices collapse into one entry.
    pub fn legal_moves(&self) -> LegalMoves {
        let mut map = LegalMoves::new();
        for uci in self.legal_uci_moves() {
            map.entry(uci[0..2].to_string())
                .or_default()
                .insert(uci[2..4].to_string());
        }
        map
    }

    /// Legal moves in canonical UCI form, in generation order.
    pub fn legal_uci_moves(&self) -> Vec<String> {
        generate_legal(&self.board)
            .into_iter()
            .map(|mv| format_uci_move(&self.board, mv))
            .collect()
    }

    /// Apply a move given by squares.
    ///
    /// A pawn reaching the last rank promotes to a queen unless `promotion`
    /// says otherwise. A promotion piece on a non-promoting move is ignored.
    pub fn apply_move(
        &self,
        from: &str,
        to: &str,
        promotion: Option<PieceKind>,
    ) -> Result<(Position, PlayedMove), PositionError> {
        let from_sq = parse_square(from).ok_or_else(|| PositionError::InvalidSquare(from.into()))?;
        let to_sq = parse_square(to).ok_or_else(|| PositionError::InvalidSquare(to.into()))?;
        if let Some(kind) = promotion {
            if !kind.is_promotion_piece() {
                return Err(PositionError::InvalidPromotion(kind.to_char_lower()));
            }
        }

        let legal = generate_legal(&self.board);
        let requested = Move {
            from: from_sq,
            to: to_sq,
            promotion: None,
        };
        let requested = convert_uci_castling_to_cozy(&self.board, requested, &legal);

        let reaches_last_rank = self.board.piece_on(from_sq) == Some(Piece::Pawn)
            && matches!(to_sq.rank(), Rank::First | Rank::Eighth);
        let mv = Move {
            promotion: reaches_last_rank
                .then(|| promotion.unwrap_or(PieceKind::Queen).into()),
            ..requested
        };

        if !legal.contains(&mv) {
            return Err(PositionError::IllegalMove(format!("{from}{to}")));
        }
        Ok(self.play(mv))
    }

    /// Apply a move in UCI form (`"e2e4"`, `"e7e8q"`, `"e1g1"`).
    pub fn apply_uci(&self, uci: &str) -> Result<(Position, PlayedMove), PositionError> {
        let parsed = parse_uci(uci).ok_or_else(|| PositionError::InvalidUci(uci.into()))?;
        self.apply_move(
            &crate::uci::format_square(parsed.from),
            &crate::uci::format_square(parsed.to),
            parsed.promotion,
        )
    }

    /// Apply a move in SAN form.
    pub fn apply_san(&self, san: &str) -> Result<(Position, PlayedMove), PositionError> {
        let mv = parse_san(&self.board, san)?;
        Ok(self.play(mv))
    }

    fn play(&self, mv: Move) -> (Position, PlayedMove) {
        let san = format_san(&self.board, mv);
        let uci = format_uci_move(&self.board, mv);
        let mut board = self.board.clone();
        board.play_unchecked(mv);

        let played = PlayedMove {
            from: uci[0..2].to_string(),
            to: uci[2..4].to_string(),
            promotion: mv.promotion.map(|p| PieceKind::from(p).to_char_lower()),
            san,
            uci,
        };
        (Position { board }, played)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
