//! Layout-band candidate generator.
//!
//! Rows of the ink mask are projected into a density signal. Sustained runs
//! of low density ("valleys") separate the page into vertical content blocks,
//! and every sufficiently tall block becomes one candidate spanning the
//! columns that carry a meaningful share of its ink.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CandidateGenerator;
use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::LAYOUT_PRIOR_WEIGHT;
use crate::domain::{Candidate, CandidateSource};
use crate::processors::profile::{
    column_counts, fill_short_false_runs, gaussian_smooth, percentile, row_counts, true_runs,
};
use crate::processors::{PageRasters, PageSize, PixelBox};

/// Proposes one candidate per vertical content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutBandProposer {
    /// Row smoothing sigma as a fraction of page height (truncated).
    pub smoothing_sigma_fraction: f64,
    /// Lower bound of the smoothing sigma in pixels.
    pub min_smoothing_sigma: u32,
    /// Percentile of the smoothed row density used as valley threshold.
    pub valley_percentile: f64,
    /// Lower clamp of the valley threshold.
    pub min_valley_threshold: f64,
    /// Upper clamp of the valley threshold.
    pub max_valley_threshold: f64,
    /// Longest non-valley run, as a fraction of page height, absorbed into
    /// the surrounding valley.
    pub fill_run_fraction: f64,
    /// Lower bound of the absorbed run length in rows.
    pub min_fill_run: usize,
    /// Minimum valley and block length as a fraction of page height.
    pub min_gap_fraction: f64,
    /// Lower bound of the minimum valley and block length in rows.
    pub min_gap: u32,
    /// Minimum band height as a fraction of page height.
    pub min_band_fraction: f64,
    /// Lower bound of the minimum band height in rows.
    pub min_band_height: u32,
    /// A column is active when its density exceeds this share of the band's
    /// mean column density.
    pub active_column_ratio: f64,
    /// Lower bound of the active column threshold.
    pub min_active_column_density: f64,
    /// Horizontal padding on each side as a fraction of page width.
    pub side_padding_fraction: f64,
    /// Prior weight of emitted candidates.
    pub weight: f64,
}

impl Default for LayoutBandProposer {
    fn default() -> Self {
        Self {
            smoothing_sigma_fraction: 0.0035,
            min_smoothing_sigma: 1,
            valley_percentile: 30.0,
            min_valley_threshold: 0.015,
            max_valley_threshold: 0.08,
            fill_run_fraction: 0.004,
            min_fill_run: 2,
            min_gap_fraction: 0.012,
            min_gap: 20,
            min_band_fraction: 0.08,
            min_band_height: 70,
            active_column_ratio: 0.35,
            min_active_column_density: 0.01,
            side_padding_fraction: 0.01,
            weight: LAYOUT_PRIOR_WEIGHT,
        }
    }
}

impl LayoutBandProposer {
    /// Smoothed per-row ink density (ink pixels per page width).
    pub fn row_profile(&self, rasters: &PageRasters) -> Vec<f64> {
        let page = rasters.page;
        let width = f64::from(page.width.max(1));
        let density: Vec<f64> = row_counts(&rasters.ink, 0, 0, page.width, page.height)
            .into_iter()
            .map(|count| f64::from(count) / width)
            .collect();

        let sigma = self
            .min_smoothing_sigma
            .max(page.height_fraction(self.smoothing_sigma_fraction));
        gaussian_smooth(&density, f64::from(sigma))
    }

    /// Splits the rows of a page into content blocks `[y0, y1)`.
    ///
    /// Rows whose smoothed density falls below the valley threshold are
    /// valley rows; short interruptions of a valley are absorbed into it.
    /// Valleys of at least `min_gap` rows separate blocks, and blocks shorter
    /// than `min_gap` are discarded.
    pub fn content_blocks(&self, row_profile: &[f64], page: PageSize) -> Vec<(u32, u32)> {
        let threshold = percentile(row_profile, self.valley_percentile)
            .min(self.max_valley_threshold)
            .max(self.min_valley_threshold);

        let valley_rows: Vec<bool> = row_profile.iter().map(|&d| d < threshold).collect();
        let max_fill = self
            .min_fill_run
            .max(page.height_fraction(self.fill_run_fraction) as usize);
        let valley_rows = fill_short_false_runs(&valley_rows, max_fill);

        let min_gap = self.min_gap.max(page.height_fraction(self.min_gap_fraction)) as usize;

        let mut blocks = Vec::new();
        let mut cursor = 0usize;
        for (start, end) in true_runs(&valley_rows) {
            if end - start < min_gap {
                continue;
            }
            if start.saturating_sub(cursor) >= min_gap {
                blocks.push((cursor as u32, start as u32));
            }
            cursor = end;
        }
        let height = page.height as usize;
        if height.saturating_sub(cursor) >= min_gap {
            blocks.push((cursor as u32, page.height));
        }
        blocks
    }

    /// Horizontal extent of the active columns of band `[y0, y1)`, padded
    /// and clipped to the page. `None` when no column is active.
    pub fn band_box(&self, rasters: &PageRasters, y0: u32, y1: u32) -> Option<PixelBox> {
        let page = rasters.page;
        let band_height = f64::from((y1 - y0).max(1));
        let density: Vec<f64> = column_counts(&rasters.ink, 0, y0, page.width, y1)
            .into_iter()
            .map(|count| f64::from(count) / band_height)
            .collect();
        if density.is_empty() {
            return None;
        }

        let mean = density.iter().sum::<f64>() / density.len() as f64;
        let threshold = self
            .min_active_column_density
            .max(mean * self.active_column_ratio);

        let mut active = density
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d > threshold)
            .map(|(x, _)| x as i64);
        let first = active.next()?;
        let last = active.last().unwrap_or(first);

        let pad = i64::from(page.width_fraction(self.side_padding_fraction));
        let x0 = (first - pad).max(0);
        let x1 = (last + pad).min(i64::from(page.width));
        Some(PixelBox::clipped(
            x0,
            i64::from(y0),
            (x1 - x0).max(1),
            i64::from(y1 - y0).max(1),
            page,
        ))
    }
}

impl CandidateGenerator for LayoutBandProposer {
    fn source(&self) -> CandidateSource {
        CandidateSource::Layout
    }

    fn propose(&self, rasters: &PageRasters) -> Vec<Candidate> {
        let page = rasters.page;
        if page.is_empty() {
            return Vec::new();
        }

        let profile = self.row_profile(rasters);
        let blocks = self.content_blocks(&profile, page);
        let min_band = self
            .min_band_height
            .max(page.height_fraction(self.min_band_fraction));

        let candidates: Vec<Candidate> = blocks
            .into_iter()
            .filter(|&(y0, y1)| y1 - y0 >= min_band)
            .filter_map(|(y0, y1)| self.band_box(rasters, y0, y1))
            .map(|bbox| Candidate::with_weight(bbox, self.weight, self.source()))
            .collect();

        debug!(count = candidates.len(), "Layout proposals");
        candidates
    }
}

impl ConfigValidator for LayoutBandProposer {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio(
            "layout.smoothing_sigma_fraction",
            self.smoothing_sigma_fraction,
        )?;
        if !(0.0..=100.0).contains(&self.valley_percentile) {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "layout.valley_percentile must be between 0 and 100, got {}",
                    self.valley_percentile
                ),
            });
        }
        self.validate_range(
            "layout.valley_threshold",
            self.min_valley_threshold,
            self.max_valley_threshold,
        )?;
        self.validate_ratio("layout.fill_run_fraction", self.fill_run_fraction)?;
        self.validate_ratio("layout.min_gap_fraction", self.min_gap_fraction)?;
        self.validate_ratio("layout.min_band_fraction", self.min_band_fraction)?;
        self.validate_ratio("layout.active_column_ratio", self.active_column_ratio)?;
        self.validate_ratio("layout.side_padding_fraction", self.side_padding_fraction)?;
        if self.min_gap == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "layout.min_gap must be positive".to_string(),
            });
        }
        self.validate_positive("layout.weight", self.weight)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
