//! Grouping of openings for browsing: by first move and by playing style.

use crate::model::Opening;

/// The two ways openings are browsed. Each category belongs to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    FirstMove,
    Style,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 2] = [CategoryKind::FirstMove, CategoryKind::Style];

    pub fn heading(self) -> &'static str {
        match self {
            CategoryKind::FirstMove => "By first move",
            CategoryKind::Style => "By style",
        }
    }
}

/// How an opening is tested for membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRule {
    /// Tagged with `tag`, or the first book move is `san`.
    FirstMove { tag: &'static str, san: &'static str },
    /// Tagged `flank`/`hypermodern`, or starts with a flank move.
    Flank,
    /// Tagged `gambit`, or "gambit" appears in the name.
    Gambit,
    /// Carries any of these tags.
    AnyTag(&'static [&'static str]),
    /// Tagged `system`, or one of the classic system openings by name.
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: CategoryKind,
    pub rule: CategoryRule,
}

const FLANK_FIRST_MOVES: &[&str] = &["Nf3", "f4", "b3"];
const SYSTEM_NAMES: &[&str] = &[
    "London System",
    "Colle System",
    "Torre Attack",
    "Stonewall Attack",
];

pub const CATEGORIES: &[Category] = &[
    Category {
        id: "king-pawn",
        name: "King's Pawn (1.e4)",
        description: "Open games starting with 1.e4",
        kind: CategoryKind::FirstMove,
        rule: CategoryRule::FirstMove { tag: "1.e4", san: "e4" },
    },
    Category {
        id: "queen-pawn",
        name: "Queen's Pawn (1.d4)",
        description: "Closed games starting with 1.d4",
        kind: CategoryKind::FirstMove,
        rule: CategoryRule::FirstMove { tag: "1.d4", san: "d4" },
    },
    Category {
        id: "english",
        name: "English (1.c4)",
        description: "Flank opening with 1.c4",
        kind: CategoryKind::FirstMove,
        rule: CategoryRule::FirstMove { tag: "1.c4", san: "c4" },
    },
    Category {
        id: "flank",
        name: "Other Flank Openings",
        description: "Reti, Bird's, and other hypermodern openings",
        kind: CategoryKind::FirstMove,
        rule: CategoryRule::Flank,
    },
    Category {
        id: "gambit",
        name: "Gambits",
        description: "Aggressive pawn sacrifices for rapid development",
        kind: CategoryKind::Style,
        rule: CategoryRule::Gambit,
    },
    Category {
        id: "tactical",
        name: "Tactical & Sharp",
        description: "Complex tactical positions with sharp play",
        kind: CategoryKind::Style,
        rule: CategoryRule::AnyTag(&["tactical", "sharp", "aggressive"]),
    },
    Category {
        id: "positional",
        name: "Positional & Strategic",
        description: "Strategic play focusing on structure and long-term plans",
        kind: CategoryKind::Style,
        rule: CategoryRule::AnyTag(&["positional", "strategic", "solid"]),
    },
    Category {
        id: "system",
        name: "System Openings",
        description: "Set formations that work against many defenses",
        kind: CategoryKind::Style,
        rule: CategoryRule::System,
    },
    Category {
        id: "beginner",
        name: "Beginner-Friendly",
        description: "Easy to learn with clear plans",
        kind: CategoryKind::Style,
        rule: CategoryRule::AnyTag(&["beginner-friendly"]),
    },
];

impl Category {
    pub fn matches(&self, opening: &Opening) -> bool {
        let first = opening.starting_moves.first().map(|m| m.san.as_str());
        match self.rule {
            CategoryRule::FirstMove { tag, san } => opening.has_tag(tag) || first == Some(san),
            CategoryRule::Flank => {
                opening.has_tag("flank")
                    || opening.has_tag("hypermodern")
                    || first.is_some_and(|san| FLANK_FIRST_MOVES.contains(&san))
            }
            CategoryRule::Gambit => {
                opening.has_tag("gambit") || opening.name.to_lowercase().contains("gambit")
            }
            CategoryRule::AnyTag(tags) => tags.iter().any(|t| opening.has_tag(t)),
            CategoryRule::System => {
                opening.has_tag("system") || SYSTEM_NAMES.contains(&opening.name.as_str())
            }
        }
    }
}

/// A category together with the openings that fall into it.
#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub category: &'a Category,
    pub openings: Vec<&'a Opening>,
}

/// Group `openings` by each of `categories`, in category order. An opening
/// may appear in several groups; empty groups are dropped.
pub fn categorize<'a>(
    openings: &'a [Opening],
    categories: &'a [Category],
) -> Vec<CategoryGroup<'a>> {
    categories
        .iter()
        .map(|category| CategoryGroup {
            category,
            openings: openings.iter().filter(|o| category.matches(o)).collect(),
        })
        .filter(|group| !group.openings.is_empty())
        .collect()
}
