//! The diagram detection pipeline.
//!
//! This module ties the stages together: [`DiagramDetector`] turns a page into
//! a [`DetectionResult`], and [`DiagramExporter`] crops the selected boxes and
//! writes them to disk.

mod config;
mod detector;
mod export;
mod result;
mod stats;

pub use config::DetectorConfig;
pub use detector::DiagramDetector;
pub use export::{DiagramCrop, DiagramExporter};
pub use result::DetectionResult;
pub use stats::DetectionStats;
