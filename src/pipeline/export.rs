//! Cropping and writing of selected diagrams.

use image::RgbImage;
use image::imageops::crop_imm;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::DIAGRAM_FILE_PREFIX;
use crate::core::errors::{DiagramError, DiagramResult};
use crate::domain::ScoredBox;
use crate::processors::{PageSize, PixelBox};

/// One cropped diagram.
#[derive(Debug, Clone)]
pub struct DiagramCrop {
    /// Position in reading order.
    pub index: usize,
    /// Selected box before padding.
    pub bbox: PixelBox,
    /// Padded box the crop was taken from.
    pub crop_box: PixelBox,
    /// Ranking score of the box.
    pub score: f64,
    /// Pixels of the padded box, taken from the original page.
    pub image: RgbImage,
}

/// Pads, crops and writes diagrams in reading order.
///
/// Each box is padded by `max(min_padding, padding_fraction * size)` on every
/// side, separately for width and height, and clipped to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramExporter {
    /// Smallest padding in pixels.
    pub min_padding: u32,
    /// Padding as a fraction of the box's own width or height.
    pub padding_fraction: f64,
    /// File name prefix; files are named `<prefix>_<index>.png`.
    pub file_prefix: String,
}

impl Default for DiagramExporter {
    fn default() -> Self {
        Self {
            min_padding: 8,
            padding_fraction: 0.02,
            file_prefix: DIAGRAM_FILE_PREFIX.to_string(),
        }
    }
}

impl DiagramExporter {
    /// Returns the boxes sorted top-to-bottom, then left-to-right.
    pub fn reading_order(boxes: &[ScoredBox]) -> Vec<ScoredBox> {
        let mut ordered = boxes.to_vec();
        ordered.sort_by_key(|b| (b.bbox.y, b.bbox.x));
        ordered
    }

    /// The padded and clipped region cropped for `bbox`.
    pub fn crop_box(&self, bbox: &PixelBox, page: PageSize) -> PixelBox {
        let pad_x = self
            .min_padding
            .max((self.padding_fraction * f64::from(bbox.width)) as u32);
        let pad_y = self
            .min_padding
            .max((self.padding_fraction * f64::from(bbox.height)) as u32);
        bbox.padded(pad_x, pad_y, page)
    }

    /// File name of the crop at `index`.
    pub fn file_name(&self, index: usize) -> String {
        format!("{}_{}.png", self.file_prefix, index)
    }

    /// Crops every box from `image` in reading order.
    pub fn crop(&self, image: &RgbImage, boxes: &[ScoredBox]) -> Vec<DiagramCrop> {
        let page = PageSize::new(image.width(), image.height());
        if page.is_empty() {
            return Vec::new();
        }

        Self::reading_order(boxes)
            .par_iter()
            .enumerate()
            .map(|(index, item)| {
                let crop_box = self.crop_box(&item.bbox, page);
                let pixels = crop_imm(
                    image,
                    crop_box.x,
                    crop_box.y,
                    crop_box.width,
                    crop_box.height,
                )
                .to_image();
                DiagramCrop {
                    index,
                    bbox: item.bbox,
                    crop_box,
                    score: item.score,
                    image: pixels,
                }
            })
            .collect()
    }

    /// Crops every box and writes it as PNG into `output_dir`.
    ///
    /// The directory is created if needed. Files are named by reading-order
    /// index and the written paths are returned in that order.
    pub fn export(
        &self,
        image: &RgbImage,
        boxes: &[ScoredBox],
        output_dir: impl AsRef<Path>,
    ) -> DiagramResult<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let crops = self.crop(image, boxes);
        let mut written = Vec::with_capacity(crops.len());
        for crop in crops {
            let path = output_dir.join(self.file_name(crop.index));
            crop.image
                .save(&path)
                .map_err(|e| DiagramError::image_save(&path, e))?;
            debug!(path = %path.display(), score = crop.score, "Wrote diagram");
            written.push(path);
        }

        info!(
            count = written.len(),
            dir = %output_dir.display(),
            "Exported diagrams"
        );
        Ok(written)
    }
}

impl ConfigValidator for DiagramExporter {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio("export.padding_fraction", self.padding_fraction)?;
        if self.file_prefix.is_empty() || self.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "export.file_prefix must be a plain file name, got {:?}",
                    self.file_prefix
                ),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
