//! Fully resolved, replayable book lines.

use chess::PieceColor;
use serde::{Deserialize, Serialize};

use crate::model::{BookMove, Opening, Variation};

/// The complete move sequence for one variation: the opening's starting
/// moves followed by the moves of every variation on the path from the root
/// of the tree down to the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookLine {
    pub opening_id: String,
    pub opening_name: String,
    pub variation_id: String,
    pub variation_name: String,
    /// Side the opening is played by.
    pub color: PieceColor,
    pub moves: Vec<BookMove>,
}

impl BookLine {
    /// Build a line directly from SAN/UCI pairs, e.g. for ad hoc drills.
    pub fn from_pairs(id: &str, color: PieceColor, pairs: &[(&str, &str)]) -> Self {
        Self {
            opening_id: id.to_string(),
            opening_name: id.to_string(),
            variation_id: id.to_string(),
            variation_name: id.to_string(),
            color,
            moves: pairs
                .iter()
                .map(|(san, uci)| BookMove::new(*san, *uci))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BookMove> {
        self.moves.get(index)
    }

    pub fn sans(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.san.as_str()).collect()
    }
}

/// Resolve `variation_id` inside `opening` by accumulating moves along the
/// path from the root. Returns `None` if the id is not in the tree.
pub fn resolve(opening: &Opening, variation_id: &str) -> Option<BookLine> {
    let mut path = Vec::new();
    if !find_path(&opening.variations, variation_id, &mut path) {
        return None;
    }

    let mut moves = opening.starting_moves.clone();
    for node in &path {
        moves.extend(node.moves.iter().cloned());
    }
    let target = path.last()?;

    Some(BookLine {
        opening_id: opening.id.clone(),
        opening_name: opening.name.clone(),
        variation_id: target.id.clone(),
        variation_name: target.name.clone(),
        color: opening.color,
        moves,
    })
}

/// Depth-first search that leaves the root-to-target chain in `path`.
fn find_path<'a>(nodes: &'a [Variation], id: &str, path: &mut Vec<&'a Variation>) -> bool {
    for node in nodes {
        path.push(node);
        if node.id == id || find_path(&node.sub_variations, id, path) {
            return true;
        }
        path.pop();
    }
    false
}
