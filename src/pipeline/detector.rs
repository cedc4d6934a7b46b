//! The diagram detector.
//!
//! [`DiagramDetector`] runs every stage of the pipeline on one page:
//!
//! 1. preprocessing into an ink mask and an edge map
//! 2. candidate proposal by the edge, ink and layout generators
//! 3. merging of adjacent layout bands
//! 4. deduplication of the combined proposals
//! 5. feature analysis and scoring
//! 6. selection (NMS, false-positive refinement, context pruning)
//!
//! Detection never fails. A page that cannot be decoded, or a stage that
//! produces nothing, yields an empty [`DetectionResult`].

use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::analysis::score_candidates;
use crate::core::config::ConfigValidator;
use crate::core::errors::DiagramResult;
use crate::domain::Candidate;
use crate::pipeline::config::DetectorConfig;
use crate::pipeline::result::DetectionResult;
use crate::pipeline::stats::DetectionStats;
use crate::processors::{PageRasters, PageSize};
use crate::proposals::CandidateGenerator;
use crate::utils::image::{load_image, load_image_from_memory};

/// Raw proposals of the three generators for one page.
#[derive(Debug, Default)]
struct Proposals {
    edges: Vec<Candidate>,
    ink: Vec<Candidate>,
    layout: Vec<Candidate>,
}

/// Detects diagram regions on document pages.
///
/// A detector holds only its configuration and can be shared between threads;
/// every call to [`detect`](Self::detect) is independent.
#[derive(Debug, Clone, Default)]
pub struct DiagramDetector {
    config: DetectorConfig,
}

impl DiagramDetector {
    /// Creates a detector after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns `DiagramError::Config` if any threshold is out of range.
    pub fn new(config: DetectorConfig) -> DiagramResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration of this detector.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn propose(&self, rasters: &PageRasters) -> Proposals {
        let edges = &self.config.edges;
        let ink = &self.config.ink;
        let layout = &self.config.layout;

        if self.config.parallel_proposals {
            let (edge_candidates, (ink_candidates, layout_candidates)) = rayon::join(
                || edges.propose(rasters),
                || rayon::join(|| ink.propose(rasters), || layout.propose(rasters)),
            );
            Proposals {
                edges: edge_candidates,
                ink: ink_candidates,
                layout: layout_candidates,
            }
        } else {
            Proposals {
                edges: edges.propose(rasters),
                ink: ink.propose(rasters),
                layout: layout.propose(rasters),
            }
        }
    }

    /// Runs the full pipeline on a decoded page.
    ///
    /// The returned boxes are in selection order, which is descending score.
    /// Use [`DiagramExporter::reading_order`](crate::pipeline::DiagramExporter::reading_order)
    /// for top-to-bottom order.
    pub fn detect(&self, image: &RgbImage) -> DetectionResult {
        let start = Instant::now();
        let page = PageSize::new(image.width(), image.height());
        if page.is_empty() {
            debug!("Empty page, nothing to detect");
            return DetectionResult::empty(page);
        }

        let rasters = self.config.preprocess.apply(image);
        let proposals = self.propose(&rasters);
        let merged = self.config.merge.merge(&proposals.layout, page);

        let mut stats = DetectionStats {
            edge_candidates: proposals.edges.len(),
            ink_candidates: proposals.ink.len(),
            layout_candidates: proposals.layout.len(),
            merged_candidates: merged.len(),
            ..Default::default()
        };
        debug!(
            edges = stats.edge_candidates,
            ink = stats.ink_candidates,
            layout = stats.layout_candidates,
            merged = stats.merged_candidates,
            "Proposed candidates"
        );

        let mut candidates = Vec::with_capacity(stats.total_proposals());
        candidates.extend(proposals.edges);
        candidates.extend(proposals.ink);
        candidates.extend(proposals.layout);
        candidates.extend(merged);

        let unique = self.config.dedup.dedup(candidates);
        stats.deduplicated = unique.len();

        let scored = score_candidates(
            &unique,
            &rasters,
            &self.config.analysis,
            &self.config.scoring,
        );
        stats.analyzed = scored.len();

        let selection = self.config.selection.select(scored, page);
        stats.after_nms = selection.after_nms;
        stats.after_refine = selection.after_refine;
        stats.selected = selection.boxes.len();
        stats.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            width = page.width,
            height = page.height,
            deduplicated = stats.deduplicated,
            analyzed = stats.analyzed,
            selected = stats.selected,
            elapsed_ms = stats.elapsed_ms,
            "Detected diagrams"
        );

        DetectionResult {
            page,
            diagrams: selection.boxes,
            stats,
        }
    }

    /// Loads a page from `path` and detects diagrams on it.
    ///
    /// An unreadable file is logged and yields an empty result.
    pub fn detect_path(&self, path: impl AsRef<Path>) -> DetectionResult {
        let path = path.as_ref();
        match load_image(path) {
            Ok(image) => self.detect(&image),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Could not read page image");
                DetectionResult::default()
            }
        }
    }

    /// Decodes a page from encoded bytes and detects diagrams on it.
    ///
    /// Undecodable bytes are logged and yield an empty result.
    pub fn detect_bytes(&self, bytes: &[u8]) -> DetectionResult {
        match load_image_from_memory(bytes) {
            Ok(image) => self.detect(&image),
            Err(err) => {
                warn!(len = bytes.len(), error = %err, "Could not decode page image");
                DetectionResult::default()
            }
        }
    }

    /// Detects diagrams on the page at `image_path` and writes the crops.
    ///
    /// `output_dir` is created before the page is read, so it exists even when
    /// the page turns out to be unreadable. Crops are written as
    /// `<prefix>_<index>.png` in reading order and their paths are returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory cannot be created or a crop
    /// cannot be written.
    pub fn extract(
        &self,
        image_path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> DiagramResult<Vec<PathBuf>> {
        let image_path = image_path.as_ref();
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let image = match load_image(image_path) {
            Ok(image) => image,
            Err(err) => {
                warn!(path = %image_path.display(), error = %err, "Could not read page image");
                return Ok(Vec::new());
            }
        };

        let result = self.detect(&image);
        self.config
            .export
            .export(&image, &result.diagrams, output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::DiagramError;
    use image::Rgb;

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = DetectorConfig::default();
        config.selection.nms.max_detections = 0;
        assert!(matches!(
            DiagramDetector::new(config),
            Err(DiagramError::Config(_))
        ));
        assert!(DiagramDetector::new(DetectorConfig::default()).is_ok());
    }

    #[test]
    fn test_blank_page_has_no_diagrams() {
        let page = RgbImage::from_pixel(300, 400, Rgb([255, 255, 255]));
        let result = DiagramDetector::default().detect(&page);

        assert!(result.is_empty());
        assert_eq!(result.page, PageSize::new(300, 400));
        assert_eq!(result.stats.total_proposals(), 0);
        assert_eq!(result.stats.selected, 0);
    }

    #[test]
    fn test_zero_sized_page() {
        let result = DiagramDetector::default().detect(&RgbImage::new(0, 0));
        assert!(result.is_empty());
    }

    #[test]
    fn test_undecodable_bytes_give_empty_result() {
        let result = DiagramDetector::default().detect_bytes(b"definitely not a png");
        assert!(result.is_empty());
        assert_eq!(result.page, PageSize::default());
        assert!(DiagramDetector::default().detect_bytes(&[]).is_empty());
    }

    #[test]
    fn test_missing_file_gives_empty_result() {
        let result = DiagramDetector::default().detect_path("/nonexistent/page.png");
        assert!(result.is_empty());
    }

    #[test]
    fn test_sequential_and_parallel_proposals_agree() {
        let mut page = RgbImage::from_pixel(400, 500, Rgb([255, 255, 255]));
        for y in 150..330 {
            for x in 80..320 {
                if (x / 12 + y / 12) % 3 == 0 {
                    page.put_pixel(x, y, Rgb([0, 0, 0]));
                }
            }
        }

        let parallel = DiagramDetector::default().detect(&page);
        let sequential = DiagramDetector::new(DetectorConfig {
            parallel_proposals: false,
            ..Default::default()
        })
        .unwrap()
        .detect(&page);

        assert_eq!(parallel.diagrams, sequential.diagrams);
        assert_eq!(
            parallel.stats.total_proposals(),
            sequential.stats.total_proposals()
        );
    }
}
