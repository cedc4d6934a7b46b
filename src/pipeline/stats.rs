//! Per-page detection statistics.
//!
//! `DetectionStats` records how many candidates survived each stage of one
//! detection run, which is the first thing to look at when a figure is
//! missed or a text block slips through.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidate counts per stage for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    /// Candidates from the edge generator.
    pub edge_candidates: usize,
    /// Candidates from the ink-cluster generator.
    pub ink_candidates: usize,
    /// Candidates from the layout-band generator.
    pub layout_candidates: usize,
    /// Layout bands after merging.
    pub merged_candidates: usize,
    /// Candidates left after deduplication.
    pub deduplicated: usize,
    /// Candidates that passed feature analysis.
    pub analyzed: usize,
    /// Boxes kept by non-maximum suppression.
    pub after_nms: usize,
    /// Boxes kept by the false-positive filter.
    pub after_refine: usize,
    /// Final diagram count.
    pub selected: usize,
    /// Wall-clock detection time in milliseconds.
    pub elapsed_ms: f64,
}

impl DetectionStats {
    /// Total number of raw proposals fed into deduplication.
    pub fn total_proposals(&self) -> usize {
        self.edge_candidates + self.ink_candidates + self.layout_candidates + self.merged_candidates
    }
}

impl fmt::Display for DetectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detection Statistics:")?;
        writeln!(
            f,
            "  Proposals: {} (edges {}, ink {}, layout {}, merged {})",
            self.total_proposals(),
            self.edge_candidates,
            self.ink_candidates,
            self.layout_candidates,
            self.merged_candidates
        )?;
        writeln!(f, "  Deduplicated: {}", self.deduplicated)?;
        writeln!(f, "  Analyzed: {}", self.analyzed)?;
        writeln!(
            f,
            "  Selected: {} (nms {}, refined {})",
            self.selected, self.after_nms, self.after_refine
        )?;
        writeln!(f, "  Time: {:.2} ms", self.elapsed_ms)?;
        Ok(())
    }
}
