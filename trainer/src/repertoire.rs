//! The user's personal repertoire: variations they chose to study, per
//! color, sorted into groups.

use std::collections::BTreeMap;

use chess::PieceColor;
use serde::{Deserialize, Serialize};

use crate::persistence::Blob;
use crate::progress::ProgressState;

/// Group that items fall back to. It cannot be deleted.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepertoireError {
    #[error("Group already exists: {0}")]
    GroupExists(String),
    #[error("Group cannot be removed: {0}")]
    ProtectedGroup(String),
    #[error("Group not found: {0}")]
    GroupNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepertoireItem {
    pub opening_id: String,
    pub variation_id: String,
    pub added_at: u64,
    #[serde(rename = "customGroup", default = "default_group")]
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_group() -> String {
    UNCATEGORIZED.to_string()
}

impl RepertoireItem {
    fn is(&self, opening_id: &str, variation_id: &str) -> bool {
        self.opening_id == opening_id && self.variation_id == variation_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepertoireGroup {
    pub id: String,
    pub name: String,
    /// Hex color used when displaying the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub sort_order: i32,
}

impl RepertoireGroup {
    fn new(id: &str, name: &str, color: &str, sort_order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: Some(color.into()),
            sort_order,
        }
    }
}

/// Partial update for a group; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i32>,
}

pub fn default_groups() -> Vec<RepertoireGroup> {
    vec![
        RepertoireGroup::new("priority", "Priority", "#f44336", 0),
        RepertoireGroup::new("learning", "Learning", "#ff9800", 1),
        RepertoireGroup::new("mastered", "Mastered", "#4caf50", 2),
        RepertoireGroup::new(UNCATEGORIZED, "Uncategorized", "#9e9e9e", 3),
    ]
}

/// Group id derived from a display name: lower case, whitespace runs
/// collapsed into `-`.
pub fn group_id_for(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Summary numbers for a repertoire against the progress ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepertoireStats {
    pub total_items: usize,
    pub white_count: usize,
    pub black_count: usize,
    /// Percentage of items whose variation has been completed.
    pub completion_rate: u8,
    /// Mean best score over items that have any progress.
    pub average_accuracy: u8,
    pub last_practiced: Option<u64>,
    pub items_by_group: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repertoire {
    pub white: Vec<RepertoireItem>,
    pub black: Vec<RepertoireItem>,
    pub groups: Vec<RepertoireGroup>,
}

impl Default for Repertoire {
    fn default() -> Self {
        Self {
            white: Vec::new(),
            black: Vec::new(),
            groups: default_groups(),
        }
    }
}

impl Blob for Repertoire {
    const NAME: &'static str = "repertoire";
}

impl Repertoire {
    pub fn items_by_color(&self, color: PieceColor) -> &[RepertoireItem] {
        match color {
            PieceColor::White => &self.white,
            PieceColor::Black => &self.black,
        }
    }

    fn items_mut(&mut self, color: PieceColor) -> &mut Vec<RepertoireItem> {
        match color {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }

    fn item_mut(
        &mut self,
        color: PieceColor,
        opening_id: &str,
        variation_id: &str,
    ) -> Option<&mut RepertoireItem> {
        self.items_mut(color)
            .iter_mut()
            .find(|i| i.is(opening_id, variation_id))
    }

    pub fn contains(&self, color: PieceColor, opening_id: &str, variation_id: &str) -> bool {
        self.items_by_color(color)
            .iter()
            .any(|i| i.is(opening_id, variation_id))
    }

    /// Add a variation. Returns false if it was already present.
    pub fn add(
        &mut self,
        color: PieceColor,
        opening_id: &str,
        variation_id: &str,
        group_id: Option<&str>,
        at: u64,
    ) -> bool {
        if self.contains(color, opening_id, variation_id) {
            return false;
        }
        self.items_mut(color).push(RepertoireItem {
            opening_id: opening_id.into(),
            variation_id: variation_id.into(),
            added_at: at,
            group_id: group_id.unwrap_or(UNCATEGORIZED).into(),
            notes: None,
        });
        true
    }

    /// Returns false if nothing was removed.
    pub fn remove(&mut self, color: PieceColor, opening_id: &str, variation_id: &str) -> bool {
        let items = self.items_mut(color);
        let before = items.len();
        items.retain(|i| !i.is(opening_id, variation_id));
        items.len() != before
    }

    pub fn move_to_group(
        &mut self,
        color: PieceColor,
        opening_id: &str,
        variation_id: &str,
        group_id: &str,
    ) -> Result<bool, RepertoireError> {
        if self.group_by_id(group_id).is_none() {
            return Err(RepertoireError::GroupNotFound(group_id.into()));
        }
        Ok(match self.item_mut(color, opening_id, variation_id) {
            Some(item) => {
                item.group_id = group_id.into();
                true
            }
            None => false,
        })
    }

    pub fn update_notes(
        &mut self,
        color: PieceColor,
        opening_id: &str,
        variation_id: &str,
        notes: &str,
    ) -> bool {
        match self.item_mut(color, opening_id, variation_id) {
            Some(item) => {
                item.notes = Some(notes.into());
                true
            }
            None => false,
        }
    }

    /// Create a group after the existing ones. Returns its id.
    pub fn create_group(
        &mut self,
        name: &str,
        color: Option<&str>,
    ) -> Result<String, RepertoireError> {
        let id = group_id_for(name);
        if id.is_empty() || self.group_by_id(&id).is_some() {
            return Err(RepertoireError::GroupExists(id));
        }
        let sort_order = self.groups.iter().map(|g| g.sort_order).max().unwrap_or(0).max(0) + 1;
        self.groups.push(RepertoireGroup {
            id: id.clone(),
            name: name.into(),
            color: color.map(Into::into),
            sort_order,
        });
        Ok(id)
    }

    pub fn update_group(
        &mut self,
        group_id: &str,
        update: GroupUpdate,
    ) -> Result<(), RepertoireError> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| RepertoireError::GroupNotFound(group_id.into()))?;
        if let Some(name) = update.name {
            group.name = name;
        }
        if let Some(color) = update.color {
            group.color = Some(color);
        }
        if let Some(order) = update.sort_order {
            group.sort_order = order;
        }
        Ok(())
    }

    /// Delete a group. Its items move to the uncategorized group.
    pub fn delete_group(&mut self, group_id: &str) -> Result<(), RepertoireError> {
        if group_id == UNCATEGORIZED {
            return Err(RepertoireError::ProtectedGroup(group_id.into()));
        }
        if self.group_by_id(group_id).is_none() {
            return Err(RepertoireError::GroupNotFound(group_id.into()));
        }
        for item in self.white.iter_mut().chain(self.black.iter_mut()) {
            if item.group_id == group_id {
                item.group_id = UNCATEGORIZED.into();
            }
        }
        self.groups.retain(|g| g.id != group_id);
        Ok(())
    }

    pub fn items_by_group(&self, color: PieceColor, group_id: &str) -> Vec<&RepertoireItem> {
        self.items_by_color(color)
            .iter()
            .filter(|i| i.group_id == group_id)
            .collect()
    }

    pub fn group_by_id(&self, group_id: &str) -> Option<&RepertoireGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Groups ordered for display.
    pub fn sorted_groups(&self) -> Vec<&RepertoireGroup> {
        let mut groups: Vec<&RepertoireGroup> = self.groups.iter().collect();
        groups.sort_by_key(|g| g.sort_order);
        groups
    }

    /// Stats over one color, or both when `color` is `None`.
    pub fn stats(&self, progress: &ProgressState, color: Option<PieceColor>) -> RepertoireStats {
        let items: Vec<&RepertoireItem> = match color {
            Some(c) => self.items_by_color(c).iter().collect(),
            None => self.white.iter().chain(self.black.iter()).collect(),
        };

        let mut completed = 0usize;
        let mut score_sum = 0u32;
        let mut with_progress = 0u32;
        let mut last_practiced: Option<u64> = None;
        let mut items_by_group = BTreeMap::new();

        for item in &items {
            *items_by_group.entry(item.group_id.clone()).or_insert(0) += 1;
            let Some(p) = progress.variation(&item.opening_id, &item.variation_id) else {
                continue;
            };
            if p.completed_at.is_some() {
                completed += 1;
            }
            score_sum += u32::from(p.best_score);
            with_progress += 1;
            last_practiced = last_practiced.max(Some(p.last_attempt_at));
        }

        let completion_rate = if items.is_empty() {
            0
        } else {
            (completed as f64 / items.len() as f64 * 100.0).round() as u8
        };
        let average_accuracy = if with_progress == 0 {
            0
        } else {
            (f64::from(score_sum) / f64::from(with_progress)).round() as u8
        };

        RepertoireStats {
            total_items: items.len(),
            white_count: self.white.len(),
            black_count: self.black.len(),
            completion_rate,
            average_accuracy,
            last_practiced,
            items_by_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressLedger;

    const W: PieceColor = PieceColor::White;
    const B: PieceColor = PieceColor::Black;

    #[test]
    fn test_default_groups() {
        let rep = Repertoire::default();
        let ids: Vec<&str> = rep.sorted_groups().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["priority", "learning", "mastered", "uncategorized"]);
    }

    #[test]
    fn test_add_is_idempotent_and_per_color() {
        let mut rep = Repertoire::default();
        assert!(rep.add(W, "italian-game", "giuoco-piano", None, 1));
        assert!(!rep.add(W, "italian-game", "giuoco-piano", Some("priority"), 2));
        assert!(rep.contains(W, "italian-game", "giuoco-piano"));
        assert!(!rep.contains(B, "italian-game", "giuoco-piano"));
        assert_eq!(rep.white[0].group_id, UNCATEGORIZED);

        assert!(rep.remove(W, "italian-game", "giuoco-piano"));
        assert!(!rep.remove(W, "italian-game", "giuoco-piano"));
    }

    #[test]
    fn test_create_group_id_and_order() {
        let mut rep = Repertoire::default();
        let id = rep.create_group("Sharp  Lines\tFor Blitz", Some("#123456")).unwrap();
        assert_eq!(id, "sharp-lines-for-blitz");
        assert_eq!(rep.group_by_id(&id).unwrap().sort_order, 4);
        assert_eq!(
            rep.create_group("sharp lines for blitz", None),
            Err(RepertoireError::GroupExists(id))
        );
    }

    #[test]
    fn test_delete_group_reassigns_items() {
        let mut rep = Repertoire::default();
        rep.add(W, "o", "a", Some("priority"), 1);
        rep.add(B, "o", "b", Some("priority"), 1);
        rep.add(B, "o", "c", Some("learning"), 1);

        rep.delete_group("priority").unwrap();
        assert!(rep.group_by_id("priority").is_none());
        assert_eq!(rep.items_by_group(W, UNCATEGORIZED).len(), 1);
        assert_eq!(rep.items_by_group(B, UNCATEGORIZED).len(), 1);
        assert_eq!(rep.items_by_group(B, "learning").len(), 1);

        assert_eq!(
            rep.delete_group(UNCATEGORIZED),
            Err(RepertoireError::ProtectedGroup(UNCATEGORIZED.into()))
        );
        assert!(matches!(rep.delete_group("nope"), Err(RepertoireError::GroupNotFound(_))));
    }

    #[test]
    fn test_move_update_notes_and_group() {
        let mut rep = Repertoire::default();
        rep.add(W, "o", "a", None, 1);
        assert_eq!(rep.move_to_group(W, "o", "a", "mastered"), Ok(true));
        assert_eq!(rep.move_to_group(W, "o", "zz", "mastered"), Ok(false));
        assert!(rep.move_to_group(W, "o", "a", "nope").is_err());
        assert!(rep.update_notes(W, "o", "a", "watch for Bb5"));
        assert_eq!(rep.white[0].notes.as_deref(), Some("watch for Bb5"));

        rep.update_group(
            "mastered",
            GroupUpdate {
                name: Some("Done".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rep.group_by_id("mastered").unwrap().name, "Done");
    }

    #[test]
    fn test_stats() {
        let mut rep = Repertoire::default();
        rep.add(W, "o", "a", Some("priority"), 1);
        rep.add(W, "o", "b", None, 1);
        rep.add(B, "p", "c", None, 1);

        let mut ledger = ProgressLedger::new();
        ledger.record_attempt("o", "a", 80, 10);
        ledger.mark_completed("o", "a", 10);
        ledger.record_attempt("o", "b", 45, 20);

        let white = rep.stats(ledger.state(), Some(W));
        assert_eq!(white.total_items, 2);
        assert_eq!(white.white_count, 2);
        assert_eq!(white.black_count, 1);
        assert_eq!(white.completion_rate, 50);
        assert_eq!(white.average_accuracy, 63);
        assert_eq!(white.last_practiced, Some(20));
        assert_eq!(white.items_by_group.get("priority"), Some(&1));

        let all = rep.stats(ledger.state(), None);
        assert_eq!(all.total_items, 3);
        assert_eq!(all.completion_rate, 33);
        assert_eq!(all.items_by_group.get(UNCATEGORIZED), Some(&2));

        let empty = Repertoire::default().stats(ledger.state(), None);
        assert_eq!(empty.completion_rate, 0);
        assert_eq!(empty.average_accuracy, 0);
        assert_eq!(empty.last_practiced, None);
    }

    #[test]
    fn test_item_serializes_custom_group() {
        let mut rep = Repertoire::default();
        rep.add(B, "o", "a", Some("learning"), 7);
        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(json["black"][0]["customGroup"], "learning");
        assert_eq!(json["black"][0]["addedAt"], 7);

        let back: Repertoire = serde_json::from_value(json).unwrap();
        assert_eq!(back, rep);
    }
}
