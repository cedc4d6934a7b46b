//! Final selection of diagram boxes.
//!
//! Selection runs three passes in a fixed order, each over the output of the
//! previous one:
//!
//! 1. [`NonMaxSuppression`] keeps the best non-overlapping boxes, capped.
//! 2. [`FalsePositiveFilter`] removes edge strips, heading strips and
//!    border-hugging chunks, judged against the best surviving score.
//! 3. [`ContextPruner`] removes small fragments above the dominant box.
//!
//! Passes 2 and 3 depend on aggregates (best score, anchor box) over the
//! whole output of the pass before them, so the order cannot change.

pub mod nms;
pub mod prune;
pub mod refine;

pub use nms::NonMaxSuppression;
pub use prune::ContextPruner;
pub use refine::FalsePositiveFilter;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::{ConfigError, ConfigValidator};
use crate::domain::ScoredBox;
use crate::processors::PageSize;

/// Outcome of the selection passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Surviving boxes, in descending score order of NMS.
    pub boxes: Vec<ScoredBox>,
    /// Boxes kept by NMS.
    pub after_nms: usize,
    /// Boxes kept by the false-positive filter.
    pub after_refine: usize,
}

/// The three selection passes, applied in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selector {
    /// First pass: non-maximum suppression.
    pub nms: NonMaxSuppression,
    /// Second pass: strip and chunk removal.
    pub refine: FalsePositiveFilter,
    /// Third pass: fragment pruning.
    pub prune: ContextPruner,
}

impl Selector {
    /// Runs NMS, false-positive refinement and context pruning.
    pub fn select(&self, scored: Vec<ScoredBox>, page: PageSize) -> Selection {
        let kept = self.nms.apply(scored);
        let after_nms = kept.len();

        let refined = self.refine.apply(kept, page);
        let after_refine = refined.len();

        let boxes = self.prune.apply(refined, page);
        debug!(
            after_nms,
            after_refine,
            selected = boxes.len(),
            "Selected diagram boxes"
        );

        Selection {
            boxes,
            after_nms,
            after_refine,
        }
    }
}

impl ConfigValidator for Selector {
    fn validate(&self) -> Result<(), ConfigError> {
        self.nms.validate()?;
        self.refine.validate()?;
        self.prune.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::PixelBox;

    const PAGE: PageSize = PageSize {
        width: 1000,
        height: 1000,
    };

    fn scored(x: u32, y: u32, w: u32, h: u32, score: f64) -> ScoredBox {
        ScoredBox::new(PixelBox::new(x, y, w, h), score)
    }

    #[test]
    fn test_passes_run_in_order() {
        let figure = scored(100, 400, 700, 500, 4.0);
        let duplicate = scored(110, 410, 700, 500, 3.9);
        let caption = scored(100, 250, 200, 100, 1.5);
        let heading = scored(50, 20, 900, 100, 2.0);

        let selection = Selector::default().select(vec![caption, duplicate, figure, heading], PAGE);
        assert_eq!(selection.after_nms, 3);
        assert_eq!(selection.after_refine, 2);
        assert_eq!(selection.boxes, vec![figure]);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        let selection = Selector::default().select(Vec::new(), PAGE);
        assert_eq!(selection, Selection::default());
    }
}
