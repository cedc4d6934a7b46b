//! Pruning of small context fragments above a dominant figure.

use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigError, ConfigValidator};
use crate::domain::ScoredBox;
use crate::processors::PageSize;

/// Drops small, weak boxes sitting above the dominant large box.
///
/// The anchor is the best-scoring box whose area ratio is at least
/// `large_area_ratio`; on equal scores the earliest such box wins. Any other
/// box smaller than `fragment_max_area_ratio` whose top lies above the
/// anchor's top and whose score is below `score_ratio` times the anchor's is
/// removed. Without a large box nothing changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextPruner {
    /// Smallest area ratio of an anchor box.
    pub large_area_ratio: f64,
    /// Boxes below this area ratio may be pruned as fragments.
    pub fragment_max_area_ratio: f64,
    /// Fragments scoring below this share of the anchor's score are pruned.
    pub score_ratio: f64,
}

impl Default for ContextPruner {
    fn default() -> Self {
        Self {
            large_area_ratio: 0.25,
            fragment_max_area_ratio: 0.05,
            score_ratio: 0.55,
        }
    }
}

impl ContextPruner {
    /// Index of the anchor box, if any box is large enough.
    fn anchor_index(&self, boxes: &[ScoredBox], page: PageSize) -> Option<usize> {
        let mut anchor: Option<usize> = None;
        for (i, item) in boxes.iter().enumerate() {
            if item.bbox.area_ratio(page) < self.large_area_ratio {
                continue;
            }
            match anchor {
                Some(best) if boxes[best].score >= item.score => {}
                _ => anchor = Some(i),
            }
        }
        anchor
    }

    /// Applies the pruning, keeping the order of the surviving boxes.
    pub fn apply(&self, boxes: Vec<ScoredBox>, page: PageSize) -> Vec<ScoredBox> {
        let Some(anchor_idx) = self.anchor_index(&boxes, page) else {
            return boxes;
        };
        let anchor = boxes[anchor_idx];

        boxes
            .into_iter()
            .enumerate()
            .filter(|&(i, item)| {
                let fragment = i != anchor_idx
                    && item.bbox.area_ratio(page) < self.fragment_max_area_ratio
                    && item.bbox.y < anchor.bbox.y
                    && item.score < anchor.score * self.score_ratio;
                !fragment
            })
            .map(|(_, item)| item)
            .collect()
    }
}

impl ConfigValidator for ContextPruner {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio("selection.prune.large_area_ratio", self.large_area_ratio)?;
        self.validate_ratio(
            "selection.prune.fragment_max_area_ratio",
            self.fragment_max_area_ratio,
        )?;
        self.validate_ratio("selection.prune.score_ratio", self.score_ratio)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
