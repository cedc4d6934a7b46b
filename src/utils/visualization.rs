//! Overlay of detected diagram boxes for debugging.
//!
//! The overlay is a copy of the page with every selected box outlined, which
//! makes it easy to see why a figure was cropped too tightly or missed.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::domain::ScoredBox;

const BBOX_COLOR: Rgb<u8> = Rgb([0, 200, 0]);

/// Outline thickness in pixels, drawn inwards from the box edge.
const BBOX_THICKNESS: u32 = 3;

/// Draws `boxes` on a copy of `image`.
///
/// The outline is drawn inside each box so that boxes touching the page
/// border stay fully visible.
pub fn draw_detections(image: &RgbImage, boxes: &[ScoredBox]) -> RgbImage {
    let mut overlay = image.clone();
    for item in boxes {
        let rect = item.bbox.to_rect();
        for inset in 0..BBOX_THICKNESS {
            if rect.width() <= 2 * inset || rect.height() <= 2 * inset {
                break;
            }
            let inner = Rect::at(rect.left() + inset as i32, rect.top() + inset as i32)
                .of_size(rect.width() - 2 * inset, rect.height() - 2 * inset);
            draw_hollow_rect_mut(&mut overlay, inner, BBOX_COLOR);
        }
    }
    overlay
}
