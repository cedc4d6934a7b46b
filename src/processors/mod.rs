//! Raster processing primitives for diagram detection.
//!
//! This module provides the low-level building blocks the detection stages are
//! assembled from. Everything here works on plain `image` buffers and is free
//! of detection policy.
//!
//! # Modules
//!
//! * `geometry` - Page-relative boxes, clipping, IoU and containment
//! * `types` - Structuring elements for binary morphology
//! * `morphology` - Dilation, erosion and closing of binary masks
//! * `contours` - External contour boxes and connected-component areas
//! * `profile` - Row/column density profiles and 1-D signal helpers
//! * `preprocess` - Ink mask and edge map extraction

pub mod contours;
mod geometry;
pub mod morphology;
pub mod preprocess;
pub mod profile;
pub mod types;

pub use geometry::*;
pub use preprocess::{PageRasters, Preprocessor};
pub use types::*;
