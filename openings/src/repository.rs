//! Read-only store of openings.

use std::collections::HashSet;

use chess::{PieceColor, Position};

use crate::categories::{categorize, Category, CategoryGroup};
use crate::data::EMBEDDED;
use crate::error::OpeningDataError;
use crate::line::{self, BookLine};
use crate::model::{Opening, Variation};

/// Every variation of `opening`, parents before their sub-variations.
pub fn flatten_variations(opening: &Opening) -> Vec<&Variation> {
    fn walk<'a>(nodes: &'a [Variation], out: &mut Vec<&'a Variation>) {
        for node in nodes {
            out.push(node);
            walk(&node.sub_variations, out);
        }
    }

    let mut out = Vec::new();
    walk(&opening.variations, &mut out);
    out
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct OpeningRepository {
    openings: Vec<Opening>,
}

impl OpeningRepository {
    /// Build a repository from already-trusted data. No validation.
    pub fn new(openings: Vec<Opening>) -> Self {
        Self { openings }
    }

    /// The built-in openings. Documents that fail to parse or validate are
    /// skipped with a warning.
    pub fn embedded() -> Self {
        let repo = Self::from_json_sources(EMBEDDED.iter().copied());
        tracing::info!(openings = repo.openings.len(), "Loaded embedded opening data");
        repo
    }

    /// Parse and validate JSON opening documents given as `(name, json)`.
    pub fn from_json_sources<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut openings: Vec<Opening> = Vec::new();
        let mut seen = HashSet::new();

        for (name, json) in sources {
            let result = serde_json::from_str::<Opening>(json)
                .map_err(|source| OpeningDataError::Json {
                    source_name: name.to_string(),
                    source,
                })
                .and_then(|opening| {
                    if seen.contains(&opening.id) {
                        return Err(OpeningDataError::DuplicateId(opening.id));
                    }
                    validate(&opening)?;
                    Ok(opening)
                });

            match result {
                Ok(opening) => {
                    seen.insert(opening.id.clone());
                    openings.push(opening);
                }
                Err(e) => tracing::warn!(source = name, "Skipping opening: {}", e),
            }
        }

        Self { openings }
    }

    pub fn all(&self) -> &[Opening] {
        &self.openings
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Opening> {
        self.openings.iter().find(|o| o.id == id)
    }

    /// Depth-first lookup over the whole variation tree.
    pub fn get_variation(
        &self,
        opening_id: &str,
        variation_id: &str,
    ) -> Option<(&Opening, &Variation)> {
        let opening = self.get_by_id(opening_id)?;
        let variation = flatten_variations(opening)
            .into_iter()
            .find(|v| v.id == variation_id)?;
        Some((opening, variation))
    }

    /// Openings whose name, ECO code or any tag contains `query`, ignoring
    /// case. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Opening> {
        let needle = query.trim().to_lowercase();
        self.openings
            .iter()
            .filter(|o| {
                o.name.to_lowercase().contains(&needle)
                    || o.eco.to_lowercase().contains(&needle)
                    || o.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn filter_by_color(&self, color: PieceColor) -> Vec<&Opening> {
        self.openings.iter().filter(|o| o.color == color).collect()
    }

    /// The full replayable line for a variation.
    pub fn resolve_line(&self, opening_id: &str, variation_id: &str) -> Option<BookLine> {
        line::resolve(self.get_by_id(opening_id)?, variation_id)
    }

    pub fn categorize<'a>(&'a self, categories: &'a [Category]) -> Vec<CategoryGroup<'a>> {
        categorize(&self.openings, categories)
    }
}

/// Replay every resolved line of `opening` and check each book move is
/// legal and that its SAN agrees with its UCI.
pub fn validate(opening: &Opening) -> Result<(), OpeningDataError> {
    for variation in flatten_variations(opening) {
        let Some(line) = line::resolve(opening, &variation.id) else {
            continue;
        };
        let mut position = Position::new();
        for (index, book) in line.moves.iter().enumerate() {
            let (next, played) =
                position
                    .apply_uci(&book.uci)
                    .map_err(|e| OpeningDataError::IllegalBookMove {
                        opening_id: opening.id.clone(),
                        variation_id: variation.id.clone(),
                        index,
                        uci: book.uci.clone(),
                        reason: e.to_string(),
                    })?;
            if played.san != book.san {
                return Err(OpeningDataError::SanMismatch {
                    opening_id: opening.id.clone(),
                    variation_id: variation.id.clone(),
                    index,
                    uci: book.uci.clone(),
                    recorded: book.san.clone(),
                    actual: played.san,
                });
            }
            position = next;
        }
    }
    Ok(())
}
