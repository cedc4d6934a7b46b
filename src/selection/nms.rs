//! Greedy non-maximum suppression over scored boxes.

use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::DEFAULT_MAX_DETECTIONS;
use crate::domain::ScoredBox;

/// Keeps the best-scoring boxes that do not overlap an already kept box.
///
/// A box is suppressed when its IoU with a kept box reaches `iou_threshold`
/// or when either box covers `containment_threshold` of the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonMaxSuppression {
    /// IoU with a kept box at which a box is suppressed.
    pub iou_threshold: f64,
    /// Share of the smaller box covered by the other at which a box is suppressed.
    pub containment_threshold: f64,
    /// Upper bound on the number of kept boxes.
    pub max_detections: usize,
}

impl Default for NonMaxSuppression {
    fn default() -> Self {
        Self {
            iou_threshold: 0.55,
            containment_threshold: 0.85,
            max_detections: DEFAULT_MAX_DETECTIONS,
        }
    }
}

impl NonMaxSuppression {
    /// Applies NMS. The result is ordered by descending score, ties in input order.
    pub fn apply(&self, mut boxes: Vec<ScoredBox>) -> Vec<ScoredBox> {
        boxes.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut keep: Vec<ScoredBox> = Vec::new();
        for candidate in boxes {
            if keep.len() >= self.max_detections {
                break;
            }
            let suppressed = keep.iter().any(|kept| {
                candidate.bbox.iou(&kept.bbox) >= self.iou_threshold
                    || candidate.bbox.containment(&kept.bbox) >= self.containment_threshold
            });
            if !suppressed {
                keep.push(candidate);
            }
        }
        keep
    }
}

impl ConfigValidator for NonMaxSuppression {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio("selection.nms.iou_threshold", self.iou_threshold)?;
        self.validate_ratio(
            "selection.nms.containment_threshold",
            self.containment_threshold,
        )?;
        if self.max_detections == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "selection.nms.max_detections must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::PixelBox;

    fn scored(x: u32, y: u32, w: u32, h: u32, score: f64) -> ScoredBox {
        ScoredBox::new(PixelBox::new(x, y, w, h), score)
    }

    #[test]
    fn test_overlapping_boxes_keep_the_best() {
        let boxes = vec![
            scored(0, 0, 100, 100, 2.0),
            scored(10, 10, 100, 100, 3.0),
            scored(400, 400, 100, 100, 1.0),
        ];
        let kept = NonMaxSuppression::default().apply(boxes);
        assert_eq!(
            kept,
            vec![scored(10, 10, 100, 100, 3.0), scored(400, 400, 100, 100, 1.0)]
        );
    }

    #[test]
    fn test_contained_box_is_suppressed() {
        let outer = scored(0, 0, 400, 400, 3.0);
        let inner = scored(100, 100, 50, 50, 2.5);
        let kept = NonMaxSuppression::default().apply(vec![inner, outer]);
        assert_eq!(kept, vec![outer]);
    }

    #[test]
    fn test_low_overlap_survives() {
        // IoU 0.25 and containment 0.4
        let a = scored(0, 0, 100, 100, 2.0);
        let b = scored(60, 0, 100, 100, 1.5);
        assert_eq!(NonMaxSuppression::default().apply(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_cap_on_detections() {
        let boxes: Vec<ScoredBox> = (0..12)
            .map(|i| scored(i * 150, 0, 100, 100, f64::from(i)))
            .collect();
        let kept = NonMaxSuppression::default().apply(boxes);
        assert_eq!(kept.len(), 8);
        assert_eq!(kept[0].score, 11.0);
        assert_eq!(kept[7].score, 4.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(NonMaxSuppression::default().apply(Vec::new()).is_empty());
    }
}
