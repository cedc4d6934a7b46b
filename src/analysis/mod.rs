//! Feature analysis and scoring of deduplicated candidates.
//!
//! Every candidate is measured against the ink mask by the
//! [`FeatureAnalyzer`]. Candidates it rejects are dropped; the rest are ranked
//! by the [`Scorer`].

pub mod features;
pub mod scoring;

pub use features::FeatureAnalyzer;
pub use scoring::Scorer;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{Candidate, ScoredBox};
use crate::processors::PageRasters;

/// Analyzes and scores `candidates`, keeping their relative order.
///
/// Rejected candidates are left out of the result.
pub fn score_candidates(
    candidates: &[Candidate],
    rasters: &PageRasters,
    analyzer: &FeatureAnalyzer,
    scorer: &Scorer,
) -> Vec<ScoredBox> {
    let scored: Vec<ScoredBox> = candidates
        .par_iter()
        .filter_map(|candidate| {
            let features = analyzer.analyze(&candidate.bbox, &rasters.ink)?;
            let score = scorer.score(candidate.weight, &features, &candidate.bbox, rasters.page);
            Some(ScoredBox::new(candidate.bbox, score))
        })
        .collect();

    debug!(
        candidates = candidates.len(),
        accepted = scored.len(),
        "Scored candidates"
    );
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CandidateSource;
    use crate::processors::{PageSize, PixelBox};
    use image::GrayImage;

    #[test]
    fn test_blank_page_scores_nothing() {
        let page = PageSize::new(400, 400);
        let rasters = PageRasters {
            ink: GrayImage::new(400, 400),
            edges: GrayImage::new(400, 400),
            page,
        };
        let candidates = vec![Candidate::new(
            PixelBox::new(50, 50, 200, 200),
            CandidateSource::Layout,
        )];
        let scored = score_candidates(
            &candidates,
            &rasters,
            &FeatureAnalyzer::default(),
            &Scorer::default(),
        );
        assert!(scored.is_empty());
        assert!(
            score_candidates(&[], &rasters, &FeatureAnalyzer::default(), &Scorer::default())
                .is_empty()
        );
    }
}
