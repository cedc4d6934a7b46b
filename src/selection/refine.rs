//! Removal of systematic false positives after NMS.
//!
//! Three shapes are known to come out of the generators without being
//! diagrams: tall strips along the left or right page edge (edge-map
//! spillover), wide short strips near the top (headings), and oversized
//! chunks hugging the page border when a proper interior figure exists.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::{ConfigError, ConfigValidator};
use crate::domain::ScoredBox;
use crate::processors::PageSize;

/// Drops page-edge strips, heading strips and border-hugging chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FalsePositiveFilter {
    /// Side strips are at least this fraction of page height...
    pub side_strip_min_height_fraction: f64,
    /// ...and at most this fraction of page width.
    pub side_strip_max_width_fraction: f64,
    /// Distance from the left or right border, as a page-width fraction,
    /// within which a strip counts as touching it.
    pub side_strip_margin: f64,
    /// Strips scoring at least this share of the best score survive.
    pub side_strip_score_ratio: f64,
    /// Heading strips start above this fraction of page height...
    pub heading_max_top_fraction: f64,
    /// ...span at least this fraction of page width...
    pub heading_min_width_fraction: f64,
    /// ...and are at most this fraction of page height.
    pub heading_max_height_fraction: f64,
    /// Heading strips scoring at least this share of the best score survive.
    pub heading_score_ratio: f64,
    /// Border chunks cover at least this share of the page...
    pub chunk_min_area_ratio: f64,
    /// ...and at least this fraction of page width.
    pub chunk_min_width_fraction: f64,
    /// Border margin, as a page fraction, for chunk detection.
    pub chunk_border_margin: f64,
    /// Interior alternatives keep this far from the left and right borders.
    pub interior_margin: f64,
    /// Smallest area ratio of an interior alternative.
    pub alternative_min_area_ratio: f64,
    /// Largest area ratio of an interior alternative.
    pub alternative_max_area_ratio: f64,
    /// Alternatives must score at least this share of the best chunk.
    pub alternative_score_ratio: f64,
}

impl Default for FalsePositiveFilter {
    fn default() -> Self {
        Self {
            side_strip_min_height_fraction: 0.75,
            side_strip_max_width_fraction: 0.28,
            side_strip_margin: 0.05,
            side_strip_score_ratio: 0.70,
            heading_max_top_fraction: 0.22,
            heading_min_width_fraction: 0.80,
            heading_max_height_fraction: 0.18,
            heading_score_ratio: 0.60,
            chunk_min_area_ratio: 0.35,
            chunk_min_width_fraction: 0.82,
            chunk_border_margin: 0.01,
            interior_margin: 0.02,
            alternative_min_area_ratio: 0.06,
            alternative_max_area_ratio: 0.35,
            alternative_score_ratio: 0.35,
        }
    }
}

impl FalsePositiveFilter {
    fn is_side_strip(&self, item: &ScoredBox, page: PageSize, best: f64) -> bool {
        let b = &item.bbox;
        f64::from(b.height) >= self.side_strip_min_height_fraction * f64::from(page.height)
            && f64::from(b.width) <= self.side_strip_max_width_fraction * f64::from(page.width)
            && b.touches_side(page, self.side_strip_margin)
            && item.score < best * self.side_strip_score_ratio
    }

    fn is_heading_strip(&self, item: &ScoredBox, page: PageSize, best: f64) -> bool {
        let b = &item.bbox;
        f64::from(b.y) <= self.heading_max_top_fraction * f64::from(page.height)
            && f64::from(b.width) >= self.heading_min_width_fraction * f64::from(page.width)
            && f64::from(b.height) <= self.heading_max_height_fraction * f64::from(page.height)
            && item.score < best * self.heading_score_ratio
    }

    fn is_edge_chunk(&self, item: &ScoredBox, page: PageSize) -> bool {
        let b = &item.bbox;
        b.area_ratio(page) >= self.chunk_min_area_ratio
            && b.touches_border(page, self.chunk_border_margin)
            && f64::from(b.width) >= self.chunk_min_width_fraction * f64::from(page.width)
    }

    fn is_interior_alternative(&self, item: &ScoredBox, page: PageSize, chunk_best: f64) -> bool {
        let area_ratio = item.bbox.area_ratio(page);
        item.bbox.is_horizontally_interior(page, self.interior_margin)
            && (self.alternative_min_area_ratio..=self.alternative_max_area_ratio)
                .contains(&area_ratio)
            && item.score >= chunk_best * self.alternative_score_ratio
    }

    /// Applies the filter to the NMS survivors.
    ///
    /// The best score is taken over the whole input. If the strip rules
    /// would remove every box, the input is returned unchanged. Edge chunks
    /// are only removed when at least one interior alternative exists.
    pub fn apply(&self, boxes: Vec<ScoredBox>, page: PageSize) -> Vec<ScoredBox> {
        let Some(best) = boxes.iter().map(|b| b.score).max_by(f64::total_cmp) else {
            return boxes;
        };

        let refined: Vec<ScoredBox> = boxes
            .iter()
            .filter(|item| {
                !self.is_side_strip(item, page, best) && !self.is_heading_strip(item, page, best)
            })
            .copied()
            .collect();
        if refined.is_empty() {
            return boxes;
        }

        let chunk_flags: Vec<bool> = refined
            .iter()
            .map(|item| self.is_edge_chunk(item, page))
            .collect();
        let Some(chunk_best) = refined
            .iter()
            .zip(&chunk_flags)
            .filter(|&(_, &is_chunk)| is_chunk)
            .map(|(item, _)| item.score)
            .max_by(f64::total_cmp)
        else {
            return refined;
        };

        let has_alternative = refined
            .iter()
            .any(|item| self.is_interior_alternative(item, page, chunk_best));
        if !has_alternative {
            return refined;
        }

        let kept: Vec<ScoredBox> = refined
            .into_iter()
            .zip(chunk_flags)
            .filter(|&(_, is_chunk)| !is_chunk)
            .map(|(item, _)| item)
            .collect();
        debug!(kept = kept.len(), "Dropped border-hugging chunks");
        kept
    }
}

impl ConfigValidator for FalsePositiveFilter {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (
                "side_strip_min_height_fraction",
                self.side_strip_min_height_fraction,
            ),
            (
                "side_strip_max_width_fraction",
                self.side_strip_max_width_fraction,
            ),
            ("side_strip_margin", self.side_strip_margin),
            ("heading_max_top_fraction", self.heading_max_top_fraction),
            ("heading_min_width_fraction", self.heading_min_width_fraction),
            (
                "heading_max_height_fraction",
                self.heading_max_height_fraction,
            ),
            ("chunk_min_area_ratio", self.chunk_min_area_ratio),
            ("chunk_min_width_fraction", self.chunk_min_width_fraction),
            ("chunk_border_margin", self.chunk_border_margin),
            ("interior_margin", self.interior_margin),
        ] {
            self.validate_ratio(name, value)?;
        }
        self.validate_range(
            "alternative_area_ratio",
            self.alternative_min_area_ratio,
            self.alternative_max_area_ratio,
        )
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
