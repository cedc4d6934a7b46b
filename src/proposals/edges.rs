//! Edge-density candidate generator.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CandidateGenerator;
use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::EDGE_PRIOR_WEIGHT;
use crate::domain::{Candidate, CandidateSource};
use crate::processors::contours::external_boxes;
use crate::processors::morphology::dilate;
use crate::processors::{PageRasters, StructuringElement};

/// One dilation configuration applied to the edge map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DilationPass {
    /// Structuring element of the dilation.
    pub kernel: StructuringElement,
    /// How many times the dilation is repeated.
    pub iterations: u32,
}

impl DilationPass {
    /// A rectangular dilation pass.
    pub fn rect(width: u32, height: u32, iterations: u32) -> Self {
        Self {
            kernel: StructuringElement::rect(width, height),
            iterations,
        }
    }
}

/// Proposes regions enclosed by the dilated edge map.
///
/// Every pass dilates the edges until nearby strokes fuse into closed blobs,
/// then bounds each external contour. Passes are independent and their
/// candidates are concatenated in pass order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeProposer {
    /// Dilation configurations, applied independently.
    pub passes: Vec<DilationPass>,
    /// Minimum box area as a fraction of the page area.
    pub min_area_ratio: f64,
    /// Prior weight of emitted candidates.
    pub weight: f64,
}

impl Default for EdgeProposer {
    fn default() -> Self {
        Self {
            passes: vec![
                DilationPass::rect(7, 7, 2),
                DilationPass::rect(11, 11, 1),
                DilationPass::rect(15, 9, 1),
            ],
            min_area_ratio: 0.0025,
            weight: EDGE_PRIOR_WEIGHT,
        }
    }
}

impl CandidateGenerator for EdgeProposer {
    fn source(&self) -> CandidateSource {
        CandidateSource::Edges
    }

    fn propose(&self, rasters: &PageRasters) -> Vec<Candidate> {
        if rasters.page.is_empty() {
            return Vec::new();
        }
        let min_area = self.min_area_ratio * rasters.page.area() as f64;

        let per_pass: Vec<Vec<Candidate>> = self
            .passes
            .par_iter()
            .map(|pass| {
                let mask = dilate(&rasters.edges, &pass.kernel, pass.iterations);
                external_boxes(&mask, min_area)
                    .into_iter()
                    .map(|bbox| Candidate::with_weight(bbox, self.weight, self.source()))
                    .collect()
            })
            .collect();

        let candidates: Vec<Candidate> = per_pass.into_iter().flatten().collect();
        debug!(count = candidates.len(), "Edge proposals");
        candidates
    }
}

impl ConfigValidator for EdgeProposer {
    fn validate(&self) -> Result<(), ConfigError> {
        for pass in &self.passes {
            self.validate_kernel("edge dilation", pass.kernel.width, pass.kernel.height)?;
        }
        self.validate_ratio("edges.min_area_ratio", self.min_area_ratio)?;
        self.validate_positive("edges.weight", self.weight)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
