//! Ink-cluster candidate generator.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CandidateGenerator;
use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::INK_PRIOR_WEIGHT;
use crate::domain::{Candidate, CandidateSource};
use crate::processors::contours::external_boxes;
use crate::processors::morphology::{close, dilate};
use crate::processors::{PageRasters, PageSize, StructuringElement};

/// An elliptical closing kernel whose size scales with the page.
///
/// The kernel is `max(min_width, width_fraction * W)` by
/// `max(min_height, height_fraction * H)` pixels, fractions truncated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkKernel {
    pub min_width: u32,
    pub width_fraction: f64,
    pub min_height: u32,
    pub height_fraction: f64,
}

impl InkKernel {
    /// Resolves the kernel for a concrete page.
    pub fn element(&self, page: PageSize) -> StructuringElement {
        StructuringElement::ellipse(
            self.min_width.max(page.width_fraction(self.width_fraction)),
            self.min_height.max(page.height_fraction(self.height_fraction)),
        )
    }
}

/// Proposes regions where ink strokes cluster together.
///
/// For each kernel the ink mask is closed to bridge nearby strokes, grown by
/// a small rectangular dilation, and bounded per external contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkClusterProposer {
    /// Closing kernels, applied independently.
    pub kernels: Vec<InkKernel>,
    /// Dilation applied after each closing.
    pub post_dilation: StructuringElement,
    /// Minimum box area as a fraction of the page area.
    pub min_area_ratio: f64,
    /// Prior weight of emitted candidates.
    pub weight: f64,
}

impl Default for InkClusterProposer {
    fn default() -> Self {
        Self {
            kernels: vec![
                InkKernel {
                    min_width: 17,
                    width_fraction: 0.02,
                    min_height: 13,
                    height_fraction: 0.015,
                },
                InkKernel {
                    min_width: 27,
                    width_fraction: 0.03,
                    min_height: 17,
                    height_fraction: 0.02,
                },
            ],
            post_dilation: StructuringElement::rect(5, 5),
            min_area_ratio: 0.004,
            weight: INK_PRIOR_WEIGHT,
        }
    }
}

impl CandidateGenerator for InkClusterProposer {
    fn source(&self) -> CandidateSource {
        CandidateSource::Ink
    }

    fn propose(&self, rasters: &PageRasters) -> Vec<Candidate> {
        let page = rasters.page;
        if page.is_empty() {
            return Vec::new();
        }
        let min_area = self.min_area_ratio * page.area() as f64;

        let per_kernel: Vec<Vec<Candidate>> = self
            .kernels
            .par_iter()
            .map(|kernel| {
                let element = kernel.element(page);
                let closed = close(&rasters.ink, &element);
                let mask = dilate(&closed, &self.post_dilation, 1);
                debug!(
                    kernel_width = element.width,
                    kernel_height = element.height,
                    "Ink clustering pass"
                );
                external_boxes(&mask, min_area)
                    .into_iter()
                    .map(|bbox| Candidate::with_weight(bbox, self.weight, self.source()))
                    .collect()
            })
            .collect();

        let candidates: Vec<Candidate> = per_kernel.into_iter().flatten().collect();
        debug!(count = candidates.len(), "Ink proposals");
        candidates
    }
}

impl ConfigValidator for InkClusterProposer {
    fn validate(&self) -> Result<(), ConfigError> {
        for kernel in &self.kernels {
            self.validate_kernel("ink closing", kernel.min_width, kernel.min_height)?;
            self.validate_ratio("ink.width_fraction", kernel.width_fraction)?;
            self.validate_ratio("ink.height_fraction", kernel.height_fraction)?;
        }
        self.validate_kernel(
            "ink post dilation",
            self.post_dilation.width,
            self.post_dilation.height,
        )?;
        self.validate_ratio("ink.min_area_ratio", self.min_area_ratio)?;
        self.validate_positive("ink.weight", self.weight)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
