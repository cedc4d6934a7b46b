//! Page preprocessing.
//!
//! Turns a color page into the two rasters every later stage reads: an ink
//! mask where strokes are foreground, and a binary edge map.

use image::{GrayImage, Luma, RgbImage, imageops};
use imageproc::edges::canny;
use imageproc::filter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::{ConfigError, ConfigValidator};
use crate::processors::geometry::PageSize;

/// Derived rasters of one page. Both masks hold `0` or `255`.
#[derive(Debug, Clone)]
pub struct PageRasters {
    /// Adaptive-threshold ink mask, strokes are foreground.
    pub ink: GrayImage,
    /// Gradient edge map.
    pub edges: GrayImage,
    /// Size of the page both rasters were derived from.
    pub page: PageSize,
}

/// Converts a color page into [`PageRasters`].
///
/// The page is converted to grayscale and lightly blurred. Ink is every pixel
/// darker than its Gaussian-weighted neighbourhood mean by at least
/// `adaptive_offset`, cleaned with a median filter. Edges come from Canny on
/// the same blurred grayscale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preprocessor {
    /// Sigma of the noise-suppression blur.
    pub blur_sigma: f32,
    /// Side of the adaptive-threshold neighbourhood. Must be odd.
    pub adaptive_block_size: u32,
    /// How much darker than the local mean a pixel must be to count as ink.
    pub adaptive_offset: i16,
    /// Radius of the speckle-removing median filter.
    pub median_radius: u32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            blur_sigma: 0.8,
            adaptive_block_size: 35,
            adaptive_offset: 11,
            median_radius: 1,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

impl Preprocessor {
    /// Sigma that matches a Gaussian window of `adaptive_block_size` taps.
    pub fn adaptive_sigma(&self) -> f32 {
        0.3 * ((self.adaptive_block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Computes the ink mask and edge map of `image`.
    pub fn apply(&self, image: &RgbImage) -> PageRasters {
        let page = PageSize::new(image.width(), image.height());
        if page.is_empty() {
            return PageRasters {
                ink: GrayImage::new(page.width, page.height),
                edges: GrayImage::new(page.width, page.height),
                page,
            };
        }

        let gray = imageops::grayscale(image);
        let blurred = filter::gaussian_blur_f32(&gray, self.blur_sigma);

        let (ink, edges) = rayon::join(
            || self.ink_mask(&blurred),
            || canny(&blurred, self.canny_low, self.canny_high),
        );

        debug!(
            width = page.width,
            height = page.height,
            ink_pixels = ink.pixels().filter(|p| p[0] > 0).count(),
            edge_pixels = edges.pixels().filter(|p| p[0] > 0).count(),
            "Preprocessed page"
        );

        PageRasters { ink, edges, page }
    }

    fn ink_mask(&self, gray: &GrayImage) -> GrayImage {
        let local_mean = filter::gaussian_blur_f32(gray, self.adaptive_sigma());
        let mut ink = GrayImage::new(gray.width(), gray.height());
        for ((out, src), mean) in ink
            .pixels_mut()
            .zip(gray.pixels())
            .zip(local_mean.pixels())
        {
            if i16::from(src[0]) - i16::from(mean[0]) <= -self.adaptive_offset {
                *out = Luma([255]);
            }
        }
        filter::median_filter(&ink, self.median_radius, self.median_radius)
    }
}

impl ConfigValidator for Preprocessor {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive("blur_sigma", f64::from(self.blur_sigma))?;
        self.validate_kernel(
            "adaptive_block_size",
            self.adaptive_block_size,
            self.adaptive_block_size,
        )?;
        if self.adaptive_block_size % 2 == 0 || self.adaptive_block_size < 3 {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "adaptive_block_size must be odd and at least 3, got {}",
                    self.adaptive_block_size
                ),
            });
        }
        self.validate_range(
            "canny thresholds",
            f64::from(self.canny_low),
            f64::from(self.canny_high),
        )?;
        self.validate_positive("canny_high", f64::from(self.canny_high))
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn white_page(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    fn count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p[0] > 0).count()
    }

    #[test]
    fn test_blank_page_has_no_ink_or_edges() {
        let rasters = Preprocessor::default().apply(&white_page(120, 90));
        assert_eq!(rasters.page, PageSize::new(120, 90));
        assert_eq!(count(&rasters.ink), 0);
        assert_eq!(count(&rasters.edges), 0);
    }

    #[test]
    fn test_stroke_becomes_ink_and_edges() {
        let mut page = white_page(160, 120);
        draw_filled_rect_mut(&mut page, Rect::at(20, 50).of_size(120, 4), Rgb([0, 0, 0]));
        let rasters = Preprocessor::default().apply(&page);

        assert_eq!(rasters.ink.get_pixel(80, 51)[0], 255);
        assert_eq!(rasters.ink.get_pixel(80, 20)[0], 0);
        assert_eq!(rasters.ink.get_pixel(5, 5)[0], 0);
        assert!(count(&rasters.edges) > 100);
    }

    #[test]
    fn test_adaptive_sigma_for_default_window() {
        assert!((Preprocessor::default().adaptive_sigma() - 5.6).abs() < 1e-5);
    }

    #[test]
    fn test_validation() {
        assert!(Preprocessor::default().validate().is_ok());
        let even = Preprocessor {
            adaptive_block_size: 34,
            ..Default::default()
        };
        assert!(even.validate().is_err());
        let inverted = Preprocessor {
            canny_low: 200.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
