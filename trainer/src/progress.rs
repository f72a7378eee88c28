//! Per-variation progress: attempts, best score, completion.
//!
//! The ledger is a reducer: every operation takes the current state and an
//! event and can only move counters forward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::Blob;
use crate::session::{CompletionStats, TrainingMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationProgress {
    pub variation_id: String,
    pub attempts: u32,
    /// Best session accuracy, 0..=100.
    pub best_score: u8,
    pub last_attempt_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
}

impl VariationProgress {
    fn new(variation_id: &str, at: u64) -> Self {
        Self {
            variation_id: variation_id.to_string(),
            attempts: 0,
            best_score: 0,
            last_attempt_at: at,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningProgress {
    pub opening_id: String,
    pub variations: BTreeMap<String, VariationProgress>,
}

/// The persisted progress record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub openings: BTreeMap<String, OpeningProgress>,
    pub total_completed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_practiced: Option<u64>,
}

impl Blob for ProgressState {
    const NAME: &'static str = "progress";
}

impl ProgressState {
    pub fn variation(&self, opening_id: &str, variation_id: &str) -> Option<&VariationProgress> {
        self.openings.get(opening_id)?.variations.get(variation_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressLedger {
    state: ProgressState,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: ProgressState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    fn entry(&mut self, opening_id: &str, variation_id: &str, at: u64) -> &mut VariationProgress {
        self.state
            .openings
            .entry(opening_id.to_string())
            .or_insert_with(|| OpeningProgress {
                opening_id: opening_id.to_string(),
                variations: BTreeMap::new(),
            })
            .variations
            .entry(variation_id.to_string())
            .or_insert_with(|| VariationProgress::new(variation_id, at))
    }

    /// Count one attempt with the given accuracy (clamped to 100).
    pub fn record_attempt(
        &mut self,
        opening_id: &str,
        variation_id: &str,
        score: u8,
        at: u64,
    ) -> &VariationProgress {
        let score = score.min(100);
        self.state.last_practiced = Some(at);
        let progress = self.entry(opening_id, variation_id, at);
        progress.attempts += 1;
        progress.best_score = progress.best_score.max(score);
        progress.last_attempt_at = at;
        progress
    }

    /// Mark a variation completed. Only the first call has any effect.
    pub fn mark_completed(
        &mut self,
        opening_id: &str,
        variation_id: &str,
        at: u64,
    ) -> &VariationProgress {
        let newly_completed = {
            let progress = self.entry(opening_id, variation_id, at);
            if progress.completed_at.is_none() {
                progress.completed_at = Some(at);
                true
            } else {
                false
            }
        };
        if newly_completed {
            self.state.total_completed += 1;
            tracing::info!(opening_id, variation_id, "Variation completed for the first time");
        }
        self.entry(opening_id, variation_id, at)
    }

    pub fn variation_progress(
        &self,
        opening_id: &str,
        variation_id: &str,
    ) -> Option<&VariationProgress> {
        self.state.variation(opening_id, variation_id)
    }

    /// Best score for the variation, 0 if never attempted.
    pub fn completion_percentage(&self, opening_id: &str, variation_id: &str) -> u8 {
        self.variation_progress(opening_id, variation_id)
            .map(|p| p.best_score)
            .unwrap_or(0)
    }

    pub fn total_completed(&self) -> u32 {
        self.state.total_completed
    }

    /// Fold a finished session into the ledger. Practice records the attempt
    /// and marks the variation completed; versus games record the attempt;
    /// demos are not scored.
    pub fn apply(&mut self, stats: &CompletionStats, at: u64) {
        match stats.mode {
            TrainingMode::Demo => {}
            TrainingMode::Practice { .. } => {
                self.record_attempt(&stats.opening_id, &stats.variation_id, stats.accuracy, at);
                self.mark_completed(&stats.opening_id, &stats.variation_id, at);
            }
            TrainingMode::VersusComputer { .. } => {
                self.record_attempt(&stats.opening_id, &stats.variation_id, stats.accuracy, at);
            }
        }
    }
}
