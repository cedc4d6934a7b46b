//! Candidate regions and their scored counterparts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::constants::{EDGE_PRIOR_WEIGHT, INK_PRIOR_WEIGHT, LAYOUT_PRIOR_WEIGHT};
use crate::processors::PixelBox;

/// The heuristic that proposed a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateSource {
    /// Dilated edge-map contours.
    Edges,
    /// Closed ink clusters.
    Ink,
    /// Row/column layout bands.
    Layout,
}

impl CandidateSource {
    /// Prior confidence attached to candidates from this source.
    pub fn prior_weight(self) -> f64 {
        match self {
            CandidateSource::Edges => EDGE_PRIOR_WEIGHT,
            CandidateSource::Ink => INK_PRIOR_WEIGHT,
            CandidateSource::Layout => LAYOUT_PRIOR_WEIGHT,
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Edges => write!(f, "edges"),
            CandidateSource::Ink => write!(f, "ink"),
            CandidateSource::Layout => write!(f, "layout"),
        }
    }
}

/// A proposed diagram region with a source-specific prior weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Region on the page, already clipped.
    pub bbox: PixelBox,
    /// Prior confidence of the proposing heuristic.
    pub weight: f64,
    /// The heuristic that proposed this region.
    pub source: CandidateSource,
}

impl Candidate {
    /// Creates a candidate with the default prior weight of its source.
    pub fn new(bbox: PixelBox, source: CandidateSource) -> Self {
        Self {
            bbox,
            weight: source.prior_weight(),
            source,
        }
    }

    /// Creates a candidate with an explicit weight.
    pub fn with_weight(bbox: PixelBox, weight: f64, source: CandidateSource) -> Self {
        Self {
            bbox,
            weight,
            source,
        }
    }
}

/// A region together with its ranking score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredBox {
    /// Region on the page.
    pub bbox: PixelBox,
    /// Ranking score; higher is more diagram-like.
    pub score: f64,
}

impl ScoredBox {
    /// Creates a new scored box.
    pub fn new(bbox: PixelBox, score: f64) -> Self {
        Self { bbox, score }
    }
}
