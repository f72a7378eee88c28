//! The scripted opponent: plays the book while it can, then random legal
//! moves.

use chess::Position;
use openings::BookMove;
use rand::seq::IndexedRandom;
use rand::Rng;

/// A move the opponent has decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveChoice {
    pub san: String,
    pub uci: String,
    pub from_book: bool,
}

#[derive(Debug, Clone)]
pub struct OpponentDriver {
    moves: Vec<BookMove>,
    cursor: usize,
    in_book: bool,
}

impl OpponentDriver {
    pub fn new(moves: Vec<BookMove>) -> Self {
        let in_book = !moves.is_empty();
        Self {
            moves,
            cursor: 0,
            in_book,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_in_book(&self) -> bool {
        self.in_book
    }

    /// The book move expected next, if still in book.
    pub fn hint(&self) -> Option<&BookMove> {
        if !self.in_book {
            return None;
        }
        self.moves.get(self.cursor)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.in_book = !self.moves.is_empty();
    }

    pub fn leave_book(&mut self) {
        if self.in_book {
            tracing::debug!(cursor = self.cursor, "Opponent leaving book");
        }
        self.in_book = false;
    }

    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.moves.len() {
            self.in_book = false;
        }
    }

    /// Decide the reply in `position`.
    ///
    /// Plays the book move at the cursor while in book. Out of book, or if
    /// the book move is not legal here, picks a legal move uniformly at
    /// random from `rng`. Returns `None` only when there is no legal move.
    pub fn next_move<R: Rng + ?Sized>(
        &mut self,
        position: &Position,
        rng: &mut R,
    ) -> Option<MoveChoice> {
        if let Some(book) = self.hint().cloned() {
            match position.apply_uci(&book.uci) {
                Ok((_, played)) => {
                    self.advance();
                    return Some(MoveChoice {
                        san: played.san,
                        uci: played.uci,
                        from_book: true,
                    });
                }
                Err(e) => {
                    tracing::warn!(uci = %book.uci, "Book move not playable, leaving book: {}", e);
                    self.leave_book();
                }
            }
        }

        let legal = position.legal_uci_moves();
        let uci = legal.choose(rng)?;
        let (_, played) = position.apply_uci(uci).ok()?;
        Some(MoveChoice {
            san: played.san,
            uci: played.uci,
            from_book: false,
        })
    }

    /// Check the player's move (SAN) against the book. Advances on a match.
    /// Out of book every move is accepted.
    pub fn check_player_move(&mut self, san: &str) -> bool {
        let Some(book) = self.hint() else {
            return true;
        };
        if book.san == san {
            self.advance();
            true
        } else {
            false
        }
    }
}
