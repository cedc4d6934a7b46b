//! Geometric utilities for diagram detection.
//!
//! All boxes in the pipeline are axis-aligned rectangles in pixel coordinates
//! with the origin at the top-left corner of the page. A [`PixelBox`] produced
//! by [`PixelBox::clipped`] always lies inside the page and has a non-zero
//! width and height, so downstream stages never have to guard against
//! degenerate or out-of-range rectangles.

use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

/// Dimensions of the page raster all boxes refer to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
}

impl PageSize {
    /// Creates a new page size.
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels on the page.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns true if the page has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `fraction * width`, truncated toward zero.
    #[inline]
    pub fn width_fraction(&self, fraction: f64) -> u32 {
        (fraction * f64::from(self.width)) as u32
    }

    /// `fraction * height`, truncated toward zero.
    #[inline]
    pub fn height_fraction(&self, fraction: f64) -> u32 {
        (fraction * f64::from(self.height)) as u32
    }
}

/// An axis-aligned rectangle `(x, y, width, height)` in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelBox {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelBox {
    /// Creates a box from raw coordinates without clipping.
    ///
    /// Use [`PixelBox::clipped`] for anything derived from image content.
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a box clipped to the page.
    ///
    /// The origin is clamped into `[0, width - 1] x [0, height - 1]`, then the
    /// extent is clamped into `[1, remaining]` so the result is never empty and
    /// never crosses the right or bottom page border. Inputs may be negative or
    /// far outside the page.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Requested top-left corner.
    /// * `width`, `height` - Requested extent.
    /// * `page` - The page to clip against. Must not be empty.
    pub fn clipped(x: i64, y: i64, width: i64, height: i64, page: PageSize) -> Self {
        let page_w = i64::from(page.width.max(1));
        let page_h = i64::from(page.height.max(1));

        let x = x.clamp(0, page_w - 1);
        let y = y.clamp(0, page_h - 1);
        let width = width.clamp(1, page_w - x);
        let height = height.clamp(1, page_h - y);

        Self {
            x: x as u32,
            y: y as u32,
            width: width as u32,
            height: height as u32,
        }
    }

    /// Creates a clipped box from inclusive-exclusive corner coordinates.
    pub fn from_corners(x0: i64, y0: i64, x1: i64, y1: i64, page: PageSize) -> Self {
        Self::clipped(x0, y0, x1 - x0, y1 - y0, page)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Area in square pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Fraction of the page covered by this box.
    #[inline]
    pub fn area_ratio(&self, page: PageSize) -> f64 {
        self.area() as f64 / page.area().max(1) as f64
    }

    /// Returns true if the box lies completely inside the page.
    pub fn is_within(&self, page: PageSize) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= page.width
            && self.bottom() <= page.height
    }

    /// Width of the overlap between the horizontal extents of both boxes.
    pub fn horizontal_overlap(&self, other: &PixelBox) -> u32 {
        let left = self.x.max(other.x);
        let right = self.right().min(other.right());
        right.saturating_sub(left)
    }

    /// Area of the intersection of both boxes.
    pub fn intersection_area(&self, other: &PixelBox) -> u64 {
        let iw = self.horizontal_overlap(other);
        let top = self.y.max(other.y);
        let bottom = self.bottom().min(other.bottom());
        let ih = bottom.saturating_sub(top);
        u64::from(iw) * u64::from(ih)
    }

    /// Intersection area over union area.
    pub fn iou(&self, other: &PixelBox) -> f64 {
        let inter = self.intersection_area(other);
        if inter == 0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        inter as f64 / union.max(1) as f64
    }

    /// Intersection area over the smaller of the two areas.
    pub fn containment(&self, other: &PixelBox) -> f64 {
        let inter = self.intersection_area(other);
        if inter == 0 {
            return 0.0;
        }
        inter as f64 / self.area().min(other.area()).max(1) as f64
    }

    /// Smallest box covering both boxes, clipped to the page.
    pub fn union(&self, other: &PixelBox, page: PageSize) -> PixelBox {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Self::from_corners(
            i64::from(x0),
            i64::from(y0),
            i64::from(x1),
            i64::from(y1),
            page,
        )
    }

    /// Grows the box by `pad_x`/`pad_y` on every side, clipped to the page.
    pub fn padded(&self, pad_x: u32, pad_y: u32, page: PageSize) -> PixelBox {
        Self::clipped(
            i64::from(self.x) - i64::from(pad_x),
            i64::from(self.y) - i64::from(pad_y),
            i64::from(self.width) + 2 * i64::from(pad_x),
            i64::from(self.height) + 2 * i64::from(pad_y),
            page,
        )
    }

    /// Returns true if any side lies within `margin` (a page fraction) of the
    /// matching page border.
    pub fn touches_border(&self, page: PageSize, margin: f64) -> bool {
        let (w, h) = (f64::from(page.width), f64::from(page.height));
        f64::from(self.x) <= margin * w
            || f64::from(self.y) <= margin * h
            || f64::from(self.right()) >= (1.0 - margin) * w
            || f64::from(self.bottom()) >= (1.0 - margin) * h
    }

    /// Returns true if the left or right side lies within `margin` of the
    /// matching vertical page border.
    pub fn touches_side(&self, page: PageSize, margin: f64) -> bool {
        let w = f64::from(page.width);
        f64::from(self.x) <= margin * w || f64::from(self.right()) >= (1.0 - margin) * w
    }

    /// Returns true if both vertical sides keep more than `margin` away from
    /// the left and right page borders.
    pub fn is_horizontally_interior(&self, page: PageSize, margin: f64) -> bool {
        let w = f64::from(page.width);
        f64::from(self.x) > margin * w && f64::from(self.right()) < (1.0 - margin) * w
    }

    /// Converts to an imageproc rectangle for drawing.
    pub fn to_rect(&self) -> Rect {
        Rect::at(self.x as i32, self.y as i32).of_size(self.width.max(1), self.height.max(1))
    }
}
