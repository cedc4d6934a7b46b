//! Merging of vertically adjacent layout bands.
//!
//! A multi-panel figure often splits into several layout bands because the
//! gap between its panels looks like a paragraph break. Bands below the page
//! header that sit close together and share most of their horizontal extent
//! are fused back into one candidate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::MERGE_WEIGHT_DISCOUNT;
use crate::domain::Candidate;
use crate::processors::PageSize;

/// Fuses vertically adjacent layout bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandMerger {
    /// The running band must start at or below this fraction of page height.
    pub min_anchor_top_fraction: f64,
    /// Largest vertical gap, as a fraction of page height, bridged by a merge.
    pub max_gap_fraction: f64,
    /// Minimum horizontal overlap over the narrower band's width.
    pub min_overlap_ratio: f64,
    /// Share of an absorbed band's weight added to the merged candidate.
    pub weight_discount: f64,
}

impl Default for BandMerger {
    fn default() -> Self {
        Self {
            min_anchor_top_fraction: 0.25,
            max_gap_fraction: 0.05,
            min_overlap_ratio: 0.35,
            weight_discount: MERGE_WEIGHT_DISCOUNT,
        }
    }
}

impl BandMerger {
    /// Returns true if `next` should be absorbed into `current`.
    fn should_merge(&self, current: &Candidate, next: &Candidate, page: PageSize) -> bool {
        let gap = i64::from(next.bbox.y) - i64::from(current.bbox.bottom());
        let min_width = current.bbox.width.min(next.bbox.width).max(1);
        let overlap_ratio =
            f64::from(current.bbox.horizontal_overlap(&next.bbox)) / f64::from(min_width);

        current.bbox.y >= page.height_fraction(self.min_anchor_top_fraction)
            && gap <= i64::from(page.height_fraction(self.max_gap_fraction))
            && overlap_ratio >= self.min_overlap_ratio
    }

    /// Merges layout bands in top-to-bottom order.
    ///
    /// Bands are visited by ascending top edge (ties keep input order). Each
    /// band is either absorbed into the running merged band or closes it and
    /// starts a new one. The returned list holds every resulting band, merged
    /// or not, in that same order. The input is not modified.
    pub fn merge(&self, bands: &[Candidate], page: PageSize) -> Vec<Candidate> {
        let mut ordered = bands.to_vec();
        ordered.sort_by_key(|c| c.bbox.y);

        let mut iter = ordered.into_iter();
        let Some(mut current) = iter.next() else {
            return Vec::new();
        };

        let mut merged = Vec::new();
        for next in iter {
            if self.should_merge(&current, &next, page) {
                current = Candidate::with_weight(
                    current.bbox.union(&next.bbox, page),
                    current.weight + next.weight * self.weight_discount,
                    current.source,
                );
                continue;
            }
            merged.push(current);
            current = next;
        }
        merged.push(current);

        debug!(
            bands = bands.len(),
            merged = merged.len(),
            "Merged layout bands"
        );
        merged
    }
}

impl ConfigValidator for BandMerger {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio("merge.min_anchor_top_fraction", self.min_anchor_top_fraction)?;
        self.validate_ratio("merge.max_gap_fraction", self.max_gap_fraction)?;
        self.validate_ratio("merge.min_overlap_ratio", self.min_overlap_ratio)?;
        self.validate_ratio("merge.weight_discount", self.weight_discount)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
