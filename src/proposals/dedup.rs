//! Cross-generator deduplication of candidates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::{ConfigError, ConfigValidator};
use crate::domain::Candidate;

/// Collapses near-duplicate candidates, highest weight first.
///
/// Candidates are ordered by `(weight, area)` descending with ties kept in
/// input order, then greedily kept unless they overlap an already kept
/// candidate with IoU at or above `iou_threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deduplicator {
    /// IoU at which a candidate counts as a duplicate.
    pub iou_threshold: f64,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self {
            iou_threshold: 0.82,
        }
    }
}

impl Deduplicator {
    /// Deduplicates `candidates`.
    pub fn dedup(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        let total = candidates.len();
        candidates.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| b.bbox.area().cmp(&a.bbox.area()))
        });

        let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let duplicate = kept
                .iter()
                .any(|existing| candidate.bbox.iou(&existing.bbox) >= self.iou_threshold);
            if !duplicate {
                kept.push(candidate);
            }
        }

        debug!(total, kept = kept.len(), "Deduplicated candidates");
        kept
    }
}

impl ConfigValidator for Deduplicator {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio("dedup.iou_threshold", self.iou_threshold)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
