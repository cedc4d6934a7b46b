//! # OAR Diagram
//!
//! A Rust library that locates diagram regions (figures, charts, schematics)
//! on scanned document pages and crops them out as separate images.
//!
//! Detection is purely heuristic. Three independent generators propose
//! candidate regions from different visual cues, and the candidates are then
//! deduplicated, measured, scored and narrowed down by a sequence of selection
//! passes.
//!
//! ## Features
//!
//! - Edge, ink-cluster and layout-band candidate generators
//! - Feature-based scoring that separates figures from text blocks
//! - Greedy NMS followed by false-positive refinement and fragment pruning
//! - Cropping with padding and export in reading order
//! - JSON-overridable thresholds for every stage
//! - Deterministic output; generators run in parallel with rayon
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration validation and constants
//! * [`domain`] - Candidates, scored boxes and feature vectors
//! * [`processors`] - Raster primitives (preprocessing, morphology, contours, profiles)
//! * [`proposals`] - Candidate generators, band merging and deduplication
//! * [`analysis`] - Feature analysis and scoring
//! * [`selection`] - NMS, refinement and pruning
//! * [`pipeline`] - The detector, its configuration and the exporter
//! * [`utils`] - Image loading, overlays and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oar_diagram::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = load_image("page.png")?;
//! let detector = DiagramDetector::new(DetectorConfig::default())?;
//! let result = detector.detect(&page);
//!
//! for diagram in &result.diagrams {
//!     println!("{:?} score={:.2}", diagram.bbox, diagram.score);
//! }
//!
//! // Crop and write diagram_0.png, diagram_1.png, ... in reading order
//! let paths = detector.config().export.export(&page, &result.diagrams, "out")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### JSON Configuration
//!
//! ```rust
//! use oar_diagram::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DetectorConfig::from_json_str(
//!     r#"{ "selection": { "nms": { "max_detections": 3 } } }"#,
//! )?;
//! let detector = DiagramDetector::new(config)?;
//! # Ok(())
//! # }
//! ```

use image::RgbImage;
use std::path::{Path, PathBuf};

pub mod analysis;
pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod proposals;
pub mod selection;
pub mod utils;

use crate::core::errors::DiagramResult;
use crate::domain::ScoredBox;
use crate::pipeline::DiagramDetector;

/// Prelude module for convenient imports.
///
/// ```rust
/// use oar_diagram::prelude::*;
/// ```
///
/// Included items cover the common path from page to crops:
/// - Detector and configuration (`DiagramDetector`, `DetectorConfig`)
/// - Results (`DetectionResult`, `ScoredBox`, `PixelBox`)
/// - Export (`DiagramExporter`)
/// - Error and result types (`DiagramError`, `DiagramResult`)
/// - Image loading (`load_image`)
pub mod prelude {
    pub use crate::core::{ConfigValidator, DiagramError, DiagramResult};
    pub use crate::domain::{PageSize, PixelBox, ScoredBox};
    pub use crate::pipeline::{
        DetectionResult, DetectionStats, DetectorConfig, DiagramDetector, DiagramExporter,
    };
    pub use crate::utils::{load_image, load_image_from_memory};
    pub use crate::{detect_diagrams, extract_diagrams};
}

/// Detects diagrams on a page with the default configuration.
///
/// Boxes are returned in selection order (descending score).
pub fn detect_diagrams(image: &RgbImage) -> Vec<ScoredBox> {
    DiagramDetector::default().detect(image).diagrams
}

/// Detects diagrams on the page at `image_path` and writes them to `output_dir`.
///
/// Uses the default configuration. See [`DiagramDetector::extract`].
pub fn extract_diagrams(
    image_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> DiagramResult<Vec<PathBuf>> {
    DiagramDetector::default().extract(image_path, output_dir)
}
