//! Reference data types. Serialized with camelCase keys.

use chess::PieceColor;
use serde::{Deserialize, Serialize};

/// A single book move. `uci` is authoritative for matching, `san` for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMove {
    pub san: String,
    pub uci: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// `"!"`, `"?"`, `"!!"` and friends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl BookMove {
    pub fn new(san: impl Into<String>, uci: impl Into<String>) -> Self {
        Self {
            san: san.into(),
            uci: uci.into(),
            comment: None,
            annotation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A node in an opening's variation tree. `moves` continue from the parent
/// node's line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    pub moves: Vec<BookMove>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_variations: Vec<Variation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opening {
    pub id: String,
    pub name: String,
    pub eco: String,
    /// The side this opening is played by.
    pub color: PieceColor,
    pub description: String,
    pub starting_moves: Vec<BookMove>,
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Opening {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
