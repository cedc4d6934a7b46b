//! Types used in raster processing operations
//!
//! This module defines the structuring elements used by the binary morphology
//! in [`crate::processors::morphology`].

use serde::{Deserialize, Serialize};

/// Shape of a morphological structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelShape {
    /// Every cell of the `width x height` box is set.
    Rect,
    /// The ellipse inscribed in the `width x height` box.
    Ellipse,
}

/// A horizontal run of set cells in a structuring element, relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSpan {
    /// Row offset from the anchor.
    pub dy: i64,
    /// First column offset (inclusive).
    pub dx_start: i64,
    /// Last column offset (inclusive).
    pub dx_end: i64,
}

/// A structuring element anchored at its center cell `(width / 2, height / 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuringElement {
    /// Shape of the element.
    pub shape: KernelShape,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl StructuringElement {
    /// A filled `width x height` rectangle.
    pub fn rect(width: u32, height: u32) -> Self {
        Self {
            shape: KernelShape::Rect,
            width,
            height,
        }
    }

    /// The ellipse inscribed in a `width x height` box.
    pub fn ellipse(width: u32, height: u32) -> Self {
        Self {
            shape: KernelShape::Ellipse,
            width,
            height,
        }
    }

    /// Anchor cell `(x, y)`.
    #[inline]
    pub fn anchor(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }

    /// Returns the Chebyshev radius if this element is an odd square rectangle.
    ///
    /// Such elements are equivalent to an L-infinity ball and can be applied
    /// through a distance transform instead of span scanning.
    pub fn square_radius(&self) -> Option<u32> {
        (self.shape == KernelShape::Rect && self.width == self.height && self.width % 2 == 1)
            .then_some(self.width / 2)
    }

    /// Decomposes the element into one horizontal span per non-empty row.
    ///
    /// The ellipse rasterization follows the usual inscribed-ellipse rule: with
    /// `r = height / 2` and `c = width / 2`, row `i` covers the columns
    /// `c - dx ..= c + dx` where `dx = round(c * sqrt(1 - (i - r)^2 / r^2))`.
    pub fn spans(&self) -> Vec<KernelSpan> {
        let width = i64::from(self.width.max(1));
        let height = i64::from(self.height.max(1));
        let (ax, ay) = (width / 2, height / 2);

        match self.shape {
            KernelShape::Rect => (0..height)
                .map(|i| KernelSpan {
                    dy: i - ay,
                    dx_start: -ax,
                    dx_end: width - 1 - ax,
                })
                .collect(),
            KernelShape::Ellipse => {
                let r = height / 2;
                let c = width / 2;
                let inv_r2 = if r > 0 {
                    1.0 / (r * r) as f64
                } else {
                    0.0
                };

                (0..height)
                    .filter_map(|i| {
                        let dy = i - r;
                        if dy.abs() > r {
                            return None;
                        }
                        let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt())
                            .round_ties_even() as i64;
                        let j1 = (c - dx).max(0);
                        let j2 = (c + dx + 1).min(width);
                        (j2 > j1).then_some(KernelSpan {
                            dy: i - ay,
                            dx_start: j1 - ax,
                            dx_end: j2 - 1 - ax,
                        })
                    })
                    .collect()
            }
        }
    }
}
