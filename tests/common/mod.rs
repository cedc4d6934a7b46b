//! Synthetic pages shared by the integration tests.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use oar_diagram::domain::PixelBox;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// A white page.
pub fn blank_page(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, WHITE)
}

/// Draws a hollow rectangle with a stroke of `stroke` pixels inside its bounds.
pub fn outline(page: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, stroke: u32) {
    let (xi, yi) = (x as i32, y as i32);
    draw_filled_rect_mut(page, Rect::at(xi, yi).of_size(w, stroke), BLACK);
    draw_filled_rect_mut(
        page,
        Rect::at(xi, yi + (h - stroke) as i32).of_size(w, stroke),
        BLACK,
    );
    draw_filled_rect_mut(page, Rect::at(xi, yi).of_size(stroke, h), BLACK);
    draw_filled_rect_mut(
        page,
        Rect::at(xi + (w - stroke) as i32, yi).of_size(stroke, h),
        BLACK,
    );
}

/// Region covered by the figure drawn by [`figure_page`].
pub const FIGURE_REGION: PixelBox = PixelBox {
    x: 120,
    y: 240,
    width: 360,
    height: 320,
};

/// A 600x800 page holding one two-row figure of ten bar outlines.
pub fn figure_page() -> RgbImage {
    let mut page = blank_page(600, 800);
    draw_figure(&mut page, 120, 240);
    page
}

/// Draws the ten-bar figure with its top-left corner at `(x, y)`.
///
/// The figure spans 360x320 pixels.
pub fn draw_figure(page: &mut RgbImage, x: u32, y: u32) {
    for row in 0..2 {
        for col in 0..5 {
            outline(page, x + col * 80, y + row * 180, 40, 140, 3);
        }
    }
}

/// Region covered by the bars drawn by [`filled_block_page`].
pub const FILLED_REGION: PixelBox = PixelBox {
    x: 120,
    y: 240,
    width: 332,
    height: 320,
};

/// A 600x800 page holding ten solid 12x140 bars, laid out like the outlines
/// of [`figure_page`].
///
/// The bars cover about 16% of [`FILLED_REGION`].
pub fn filled_block_page() -> RgbImage {
    let mut page = blank_page(600, 800);
    for row in 0..2 {
        for col in 0..5 {
            let x = FILLED_REGION.x + col * 80;
            let y = FILLED_REGION.y + row * 180;
            draw_filled_rect_mut(
                &mut page,
                Rect::at(x as i32, y as i32).of_size(12, 140),
                BLACK,
            );
        }
    }
    page
}

/// Share of dark pixels of `page` inside `region`.
pub fn dark_ratio(page: &RgbImage, region: &PixelBox) -> f64 {
    let mut dark = 0u64;
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            if page.get_pixel(x, y)[0] < 128 {
                dark += 1;
            }
        }
    }
    dark as f64 / region.area() as f64
}

/// Share of `region` covered by `bbox`.
pub fn coverage(bbox: &PixelBox, region: &PixelBox) -> f64 {
    bbox.intersection_area(region) as f64 / region.area() as f64
}
