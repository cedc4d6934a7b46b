//! Domain-level structures shared across the diagram pipeline.
//!
//! Candidates flow from the proposal stage through deduplication into the
//! feature analyzer, which turns survivors into scored boxes for selection.

pub mod candidate;
pub mod features;

pub use crate::processors::{PageSize, PixelBox};
pub use candidate::{Candidate, CandidateSource, ScoredBox};
pub use features::FeatureVector;
