//! Result type of one detection run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::ScoredBox;
use crate::pipeline::stats::DetectionStats;
use crate::processors::PageSize;

/// Diagrams found on one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Size of the analyzed page.
    pub page: PageSize,
    /// Selected diagram boxes in selection order (descending score after NMS).
    pub diagrams: Vec<ScoredBox>,
    /// Candidate counts per stage.
    pub stats: DetectionStats,
}

impl DetectionResult {
    /// An empty result for a page of the given size.
    pub fn empty(page: PageSize) -> Self {
        Self {
            page,
            diagrams: Vec::new(),
            stats: DetectionStats::default(),
        }
    }

    /// Returns true if no diagram was found.
    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }

    /// Number of diagrams found.
    pub fn len(&self) -> usize {
        self.diagrams.len()
    }
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Page {}x{}: {} diagram(s)",
            self.page.width,
            self.page.height,
            self.diagrams.len()
        )?;
        for (i, item) in self.diagrams.iter().enumerate() {
            let b = &item.bbox;
            writeln!(
                f,
                "  [{}] x={} y={} w={} h={} score={:.3}",
                i, b.x, b.y, b.width, b.height, item.score
            )?;
        }
        Ok(())
    }
}
