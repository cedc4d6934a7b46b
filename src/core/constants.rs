//! Constants used throughout the diagram pipeline.
//!
//! Prior weights for each candidate source and the default limits of the
//! selection stage. Stage-specific thresholds live on the stage structs as
//! overridable fields; these are the values several stages agree on.

/// Prior weight of candidates proposed from the dilated edge map.
pub const EDGE_PRIOR_WEIGHT: f64 = 1.0;

/// Prior weight of candidates proposed from closed ink clusters.
pub const INK_PRIOR_WEIGHT: f64 = 1.15;

/// Prior weight of candidates proposed from layout bands.
pub const LAYOUT_PRIOR_WEIGHT: f64 = 1.35;

/// Discount applied to a layout band's weight when it is absorbed by a merge.
pub const MERGE_WEIGHT_DISCOUNT: f64 = 0.85;

/// The default maximum number of diagrams kept per page.
pub const DEFAULT_MAX_DETECTIONS: usize = 8;

/// Area, in square pixels, that one unit of component density refers to.
pub const COMPONENT_DENSITY_AREA: f64 = 100_000.0;

/// File name prefix of exported crops (`diagram_<index>.png`).
pub const DIAGRAM_FILE_PREFIX: &str = "diagram";
