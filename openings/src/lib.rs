//! Opening repository: the static tree of openings, variations and book
//! moves, plus the lookups the trainer needs over it.

pub mod categories;
mod data;
pub mod error;
pub mod line;
pub mod model;
pub mod repository;

pub use categories::{categorize, Category, CategoryGroup, CategoryKind, CATEGORIES};
pub use error::OpeningDataError;
pub use line::BookLine;
pub use model::{BookMove, Difficulty, Opening, Variation};
pub use repository::{flatten_variations, OpeningRepository};
