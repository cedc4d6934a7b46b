//! Per-region statistical descriptors computed from the ink mask.

use serde::{Deserialize, Serialize};

/// Statistics describing the ink inside one candidate box.
///
/// A `FeatureVector` only exists for boxes that passed every rejection rule
/// of the feature analyzer; a rejected box has no features at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Box area over page area.
    pub area_ratio: f64,
    /// Fraction of ink pixels inside the box.
    pub ink_ratio: f64,
    /// Connected ink components larger than the medium-size threshold.
    pub medium_components: usize,
    /// Connected ink components larger than the large-size threshold.
    pub large_components: usize,
    /// Fraction of rows whose ink density exceeds the row activity threshold.
    pub row_active: f64,
    /// Population standard deviation of the per-row ink density.
    pub row_std: f64,
    /// Medium components per 100,000 square pixels.
    pub component_density: f64,
}
