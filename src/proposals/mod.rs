//! Candidate proposal stage.
//!
//! Three independent generators read the shared [`PageRasters`] and each
//! propose regions from a different visual cue:
//!
//! * [`EdgeProposer`] - closed regions of the dilated edge map
//! * [`InkClusterProposer`] - clusters of nearby ink strokes
//! * [`LayoutBandProposer`] - content blocks between low-density row valleys
//!
//! Layout bands are then post-processed by the [`BandMerger`], and the union
//! of every proposal is collapsed by the [`Deduplicator`].

use std::fmt::Debug;

use crate::domain::{Candidate, CandidateSource};
use crate::processors::PageRasters;

pub mod dedup;
pub mod edges;
pub mod ink;
pub mod layout;
pub mod merge;

pub use dedup::Deduplicator;
pub use edges::{DilationPass, EdgeProposer};
pub use ink::{InkClusterProposer, InkKernel};
pub use layout::LayoutBandProposer;
pub use merge::BandMerger;

/// A heuristic that proposes diagram candidates from page rasters.
///
/// Generators only read the rasters, so several of them may run on the same
/// page concurrently.
pub trait CandidateGenerator: Send + Sync + Debug {
    /// The source tag attached to every proposed candidate.
    fn source(&self) -> CandidateSource;

    /// Proposes candidates for one page.
    ///
    /// # Arguments
    ///
    /// * `rasters` - Ink mask and edge map of the page.
    ///
    /// # Returns
    ///
    /// Candidates clipped to the page, possibly empty.
    fn propose(&self, rasters: &PageRasters) -> Vec<Candidate>;
}
