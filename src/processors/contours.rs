//! Blob extraction from binary masks.
//!
//! [`external_boxes`] bounds the outermost contours of a mask, and
//! [`component_areas`] measures 8-connected foreground components.

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::region_labelling::{Connectivity, connected_components};
use itertools::{Itertools, MinMaxResult};

use crate::processors::geometry::{PageSize, PixelBox};

/// Bounding boxes of the top-level outer contours of `mask` whose area is at
/// least `min_area` square pixels.
///
/// Contours nested inside holes of other blobs are ignored, so a ring and
/// everything drawn inside it produce a single box. Boxes are returned in
/// contour discovery order (raster order of each contour's first pixel).
pub fn external_boxes(mask: &GrayImage, min_area: f64) -> Vec<PixelBox> {
    let page = PageSize::new(mask.width(), mask.height());
    if page.is_empty() {
        return Vec::new();
    }

    find_contours::<u32>(mask)
        .into_iter()
        .filter(|contour| contour.parent.is_none() && contour.border_type == BorderType::Outer)
        .filter_map(|contour| {
            let xs = contour.points.iter().map(|p| p.x).minmax();
            let ys = contour.points.iter().map(|p| p.y).minmax();
            let (x0, x1) = span(xs)?;
            let (y0, y1) = span(ys)?;
            Some(PixelBox::from_corners(
                i64::from(x0),
                i64::from(y0),
                i64::from(x1) + 1,
                i64::from(y1) + 1,
                page,
            ))
        })
        .filter(|bbox| bbox.area() as f64 >= min_area)
        .collect()
}

fn span(result: MinMaxResult<u32>) -> Option<(u32, u32)> {
    match result {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
    }
}

/// Pixel areas of the 8-connected foreground components of `mask`, in label order.
pub fn component_areas(mask: &GrayImage) -> Vec<u64> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let count = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;

    let mut areas = vec![0u64; count];
    for label in labels.pixels().map(|p| p[0]) {
        if label > 0 {
            areas[label as usize - 1] += 1;
        }
    }
    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    const WHITE: Luma<u8> = Luma([255]);

    #[test]
    fn test_external_boxes_ignore_nested_blobs() {
        let mut mask = GrayImage::new(200, 200);
        draw_hollow_rect_mut(&mut mask, Rect::at(20, 30).of_size(100, 80), WHITE);
        draw_filled_rect_mut(&mut mask, Rect::at(50, 60).of_size(10, 10), WHITE);
        draw_filled_rect_mut(&mut mask, Rect::at(150, 150).of_size(20, 30), WHITE);

        let mut boxes = external_boxes(&mask, 0.0);
        boxes.sort_by_key(|b| (b.y, b.x));
        assert_eq!(
            boxes,
            vec![PixelBox::new(20, 30, 100, 80), PixelBox::new(150, 150, 20, 30)]
        );
    }

    #[test]
    fn test_external_boxes_min_area() {
        let mut mask = GrayImage::new(100, 100);
        draw_filled_rect_mut(&mut mask, Rect::at(5, 5).of_size(4, 4), WHITE);
        draw_filled_rect_mut(&mut mask, Rect::at(40, 40).of_size(20, 20), WHITE);
        let boxes = external_boxes(&mask, 100.0);
        assert_eq!(boxes, vec![PixelBox::new(40, 40, 20, 20)]);
    }

    #[test]
    fn test_single_pixel_blob() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(9, 9, WHITE);
        assert_eq!(external_boxes(&mask, 1.0), vec![PixelBox::new(9, 9, 1, 1)]);
    }

    #[test]
    fn test_component_areas() {
        let mut mask = GrayImage::new(60, 60);
        draw_filled_rect_mut(&mut mask, Rect::at(0, 0).of_size(5, 5), WHITE);
        draw_filled_rect_mut(&mut mask, Rect::at(20, 20).of_size(10, 3), WHITE);
        // diagonal neighbour joins the second component under 8-connectivity
        mask.put_pixel(30, 23, WHITE);

        let mut areas = component_areas(&mask);
        areas.sort_unstable();
        assert_eq!(areas, vec![25, 31]);
        assert!(component_areas(&GrayImage::new(8, 8)).is_empty());
    }
}
