//! Per-box feature extraction from the ink mask.

use image::GrayImage;
use image::imageops::crop_imm;
use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::COMPONENT_DENSITY_AREA;
use crate::domain::FeatureVector;
use crate::processors::contours::component_areas;
use crate::processors::profile::{mean_std, row_counts};
use crate::processors::{PageSize, PixelBox};

/// Computes [`FeatureVector`]s and rejects boxes that cannot be diagrams.
///
/// Rules are applied in a fixed order and the first failing rule rejects the
/// box:
///
/// 1. size: too narrow, too short, area outside the allowed page share, or a
///    short full-width strip;
/// 2. ink density outside `[min_ink_ratio, max_ink_ratio]`;
/// 3. no ink components, or fewer than `min_medium_components` medium ones;
/// 4. a large, component-dense box whose rows are almost all active, which
///    is what a block of running text looks like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureAnalyzer {
    /// Smallest accepted box width in pixels.
    pub min_width: u32,
    /// Smallest accepted box width as a fraction of page width.
    pub min_width_fraction: f64,
    /// Smallest accepted box height in pixels.
    pub min_height: u32,
    /// Smallest accepted box height as a fraction of page height.
    pub min_height_fraction: f64,
    /// Smallest accepted box area over page area.
    pub min_area_ratio: f64,
    /// Largest accepted box area over page area.
    pub max_area_ratio: f64,
    /// Strips shorter than this fraction of page height...
    pub strip_max_height_fraction: f64,
    /// ...and wider than this fraction of page width are rejected.
    pub strip_min_width_fraction: f64,
    /// Lowest accepted share of ink pixels inside the box.
    pub min_ink_ratio: f64,
    /// Highest accepted share of ink pixels inside the box.
    pub max_ink_ratio: f64,
    /// Medium components are larger than `max(medium_component_min,
    /// medium_component_fraction * box_area)` pixels.
    pub medium_component_min: u64,
    /// Medium-size threshold as a fraction of box area.
    pub medium_component_fraction: f64,
    /// Large components are larger than `max(large_component_min,
    /// large_component_fraction * box_area)` pixels.
    pub large_component_min: u64,
    /// Large-size threshold as a fraction of box area.
    pub large_component_fraction: f64,
    /// Fewest medium components a diagram may have.
    pub min_medium_components: usize,
    /// A row is active when its ink density exceeds this value.
    pub row_active_threshold: f64,
    /// Text-block rule: box area over page area must exceed this...
    pub text_block_min_area_ratio: f64,
    /// ...medium components per 100,000 px must exceed this...
    pub text_block_min_density: f64,
    /// ...and the share of active rows must exceed this.
    pub text_block_min_row_active: f64,
}

impl Default for FeatureAnalyzer {
    fn default() -> Self {
        Self {
            min_width: 80,
            min_width_fraction: 0.08,
            min_height: 80,
            min_height_fraction: 0.07,
            min_area_ratio: 0.01,
            max_area_ratio: 0.88,
            strip_max_height_fraction: 0.05,
            strip_min_width_fraction: 0.7,
            min_ink_ratio: 0.008,
            max_ink_ratio: 0.46,
            medium_component_min: 25,
            medium_component_fraction: 0.00015,
            large_component_min: 200,
            large_component_fraction: 0.003,
            min_medium_components: 3,
            row_active_threshold: 0.01,
            text_block_min_area_ratio: 0.12,
            text_block_min_density: 4.7,
            text_block_min_row_active: 0.96,
        }
    }
}

impl FeatureAnalyzer {
    /// Returns true if the box fails one of the geometric rules.
    pub fn rejects_geometry(&self, bbox: &PixelBox, page: PageSize) -> bool {
        let area_ratio = bbox.area_ratio(page);
        bbox.width < self.min_width.max(page.width_fraction(self.min_width_fraction))
            || bbox.height < self.min_height.max(page.height_fraction(self.min_height_fraction))
            || area_ratio < self.min_area_ratio
            || area_ratio > self.max_area_ratio
            || (bbox.height < page.height_fraction(self.strip_max_height_fraction)
                && bbox.width > page.width_fraction(self.strip_min_width_fraction))
    }

    /// Analyzes the ink inside `bbox`.
    ///
    /// # Arguments
    ///
    /// * `bbox` - Candidate region, inside the page.
    /// * `ink` - Ink mask of the whole page.
    ///
    /// # Returns
    ///
    /// The features of the region, or `None` if any rejection rule fires.
    pub fn analyze(&self, bbox: &PixelBox, ink: &GrayImage) -> Option<FeatureVector> {
        let page = PageSize::new(ink.width(), ink.height());
        if page.is_empty() || !bbox.is_within(page) || self.rejects_geometry(bbox, page) {
            return None;
        }

        let roi = crop_imm(ink, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
        let box_area = bbox.area();

        let ink_pixels = roi.pixels().filter(|p| p[0] > 0).count() as u64;
        let ink_ratio = ink_pixels as f64 / box_area.max(1) as f64;
        if ink_ratio < self.min_ink_ratio || ink_ratio > self.max_ink_ratio {
            return None;
        }

        let areas = component_areas(&roi);
        if areas.is_empty() {
            return None;
        }
        let medium_min = self
            .medium_component_min
            .max((self.medium_component_fraction * box_area as f64) as u64);
        let large_min = self
            .large_component_min
            .max((self.large_component_fraction * box_area as f64) as u64);
        let medium_components = areas.iter().filter(|&&a| a > medium_min).count();
        let large_components = areas.iter().filter(|&&a| a > large_min).count();
        if medium_components < self.min_medium_components {
            return None;
        }

        let width = f64::from(bbox.width.max(1));
        let row_profile: Vec<f64> = row_counts(&roi, 0, 0, roi.width(), roi.height())
            .into_iter()
            .map(|count| f64::from(count) / width)
            .collect();
        let active_rows = row_profile
            .iter()
            .filter(|&&d| d > self.row_active_threshold)
            .count();
        let row_active = active_rows as f64 / row_profile.len().max(1) as f64;
        let (_, row_std) = mean_std(&row_profile);
        let component_density =
            medium_components as f64 / (box_area as f64 / COMPONENT_DENSITY_AREA).max(1.0);

        let area_ratio = bbox.area_ratio(page);
        if area_ratio > self.text_block_min_area_ratio
            && component_density > self.text_block_min_density
            && row_active > self.text_block_min_row_active
        {
            return None;
        }

        Some(FeatureVector {
            area_ratio,
            ink_ratio,
            medium_components,
            large_components,
            row_active,
            row_std,
            component_density,
        })
    }
}

impl ConfigValidator for FeatureAnalyzer {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio("analysis.min_width_fraction", self.min_width_fraction)?;
        self.validate_ratio("analysis.min_height_fraction", self.min_height_fraction)?;
        self.validate_range("analysis.area_ratio", self.min_area_ratio, self.max_area_ratio)?;
        self.validate_ratio("analysis.max_area_ratio", self.max_area_ratio)?;
        self.validate_range("analysis.ink_ratio", self.min_ink_ratio, self.max_ink_ratio)?;
        self.validate_ratio("analysis.max_ink_ratio", self.max_ink_ratio)?;
        self.validate_ratio(
            "analysis.medium_component_fraction",
            self.medium_component_fraction,
        )?;
        self.validate_ratio(
            "analysis.large_component_fraction",
            self.large_component_fraction,
        )?;
        self.validate_ratio("analysis.row_active_threshold", self.row_active_threshold)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    const INK: Luma<u8> = Luma([255]);

    /// Draws a 3px-thick hollow rectangle.
    fn outline(ink: &mut GrayImage, x: i32, y: i32, w: u32, h: u32) {
        for i in 0..3 {
            draw_hollow_rect_mut(
                ink,
                Rect::at(x + i, y + i).of_size(w - 2 * i as u32, h - 2 * i as u32),
                INK,
            );
        }
    }

    /// A figure-like region: two rows of five boxes with a blank gutter.
    fn figure_page() -> GrayImage {
        let mut ink = GrayImage::new(600, 800);
        for row in 0..2 {
            for col in 0..5 {
                outline(&mut ink, 120 + col * 80, 240 + row * 180, 40, 140);
            }
        }
        ink
    }

    #[test]
    fn test_figure_region_features() {
        let ink = figure_page();
        let bbox = PixelBox::new(114, 235, 372, 330);
        let features = FeatureAnalyzer::default()
            .analyze(&bbox, &ink)
            .expect("figure should pass");

        assert_eq!(features.medium_components, 10);
        assert_eq!(features.large_components, 10);
        assert!(features.ink_ratio > 0.05 && features.ink_ratio < 0.12);
        assert!(features.row_active < 0.96);
        assert!(features.row_std > 0.0);
        assert!((features.area_ratio - 372.0 * 330.0 / 480_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_boxes_are_rejected() {
        let ink = figure_page();
        let analyzer = FeatureAnalyzer::default();
        assert!(analyzer.analyze(&PixelBox::new(114, 235, 60, 330), &ink).is_none());
        assert!(analyzer.analyze(&PixelBox::new(114, 235, 372, 60), &ink).is_none());
    }

    #[test]
    fn test_geometry_rules() {
        let page = PageSize::new(2000, 3000);
        let analyzer = FeatureAnalyzer::default();
        assert!(analyzer.rejects_geometry(&PixelBox::new(0, 0, 1500, 140), page));
        assert!(!analyzer.rejects_geometry(&PixelBox::new(0, 0, 1500, 210), page));
        assert!(!analyzer.rejects_geometry(&PixelBox::new(0, 0, 1300, 300), page));
        // more than 88% of the page
        assert!(analyzer.rejects_geometry(&PixelBox::new(0, 0, 2000, 2700), page));

        let strips = FeatureAnalyzer {
            min_height: 10,
            min_height_fraction: 0.0,
            ..Default::default()
        };
        // 140px tall (< 150) and 1500px wide (> 1400)
        assert!(strips.rejects_geometry(&PixelBox::new(0, 0, 1500, 140), page));
        assert!(!strips.rejects_geometry(&PixelBox::new(0, 0, 1300, 140), page));
    }

    #[test]
    fn test_blank_and_solid_regions_are_rejected() {
        let analyzer = FeatureAnalyzer::default();
        let bbox = PixelBox::new(100, 100, 300, 300);

        let blank = GrayImage::new(600, 800);
        assert!(analyzer.analyze(&bbox, &blank).is_none());

        let mut solid = GrayImage::new(600, 800);
        draw_filled_rect_mut(&mut solid, Rect::at(100, 100).of_size(300, 300), INK);
        assert!(analyzer.analyze(&bbox, &solid).is_none());
    }

    #[test]
    fn test_too_few_components_are_rejected() {
        let mut ink = GrayImage::new(600, 800);
        outline(&mut ink, 100, 100, 300, 300);
        outline(&mut ink, 150, 150, 100, 100);
        let bbox = PixelBox::new(100, 100, 300, 300);
        assert!(FeatureAnalyzer::default().analyze(&bbox, &ink).is_none());
    }

    #[test]
    fn test_dense_text_block_is_rejected() {
        // staggered word-like strokes so that no row is blank
        let mut ink = GrayImage::new(600, 800);
        for row in 0..60 {
            for col in 0..8 {
                draw_filled_rect_mut(
                    &mut ink,
                    Rect::at(60 + col * 60, 100 + row * 6 + (col % 2) * 3).of_size(40, 4),
                    INK,
                );
            }
        }
        let bbox = PixelBox::new(60, 100, 480, 360);
        let analyzer = FeatureAnalyzer::default();
        assert!(!analyzer.rejects_geometry(&bbox, PageSize::new(600, 800)));
        assert!(analyzer.analyze(&bbox, &ink).is_none());
    }
}
