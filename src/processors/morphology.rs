//! Binary morphology on `0/255` masks.
//!
//! Masks are plain [`GrayImage`]s where any non-zero pixel is foreground.
//! Elements are decomposed into horizontal spans, and each span is tested in
//! constant time against per-row prefix counts, so the cost is proportional
//! to `pixels x element rows` regardless of element width. Odd square
//! rectangles are routed through imageproc's distance-transform dilation.
//!
//! Pixels outside the image never contribute to a dilation and never block
//! an erosion.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use rayon::prelude::*;

use crate::processors::types::{KernelSpan, StructuringElement};

const FOREGROUND: u8 = 255;

/// Per-row inclusive prefix counts of foreground pixels.
///
/// Row `y` occupies `(width + 1)` entries starting at `y * (width + 1)`;
/// entry `x` holds the number of foreground pixels in columns `0..x`.
struct RowPrefix {
    counts: Vec<u32>,
    stride: usize,
}

impl RowPrefix {
    fn new(mask: &GrayImage) -> Self {
        let width = mask.width() as usize;
        let stride = width + 1;
        let mut counts = vec![0u32; stride * mask.height() as usize];
        let raw: &[u8] = mask.as_raw();

        counts
            .par_chunks_mut(stride)
            .zip(raw.par_chunks(width.max(1)))
            .for_each(|(prefix, row)| {
                for (x, &value) in row.iter().enumerate() {
                    prefix[x + 1] = prefix[x] + u32::from(value > 0);
                }
            });

        Self { counts, stride }
    }

    /// Foreground pixels in row `y`, columns `lo..=hi`.
    #[inline]
    fn count(&self, y: usize, lo: usize, hi: usize) -> u32 {
        let base = y * self.stride;
        self.counts[base + hi + 1] - self.counts[base + lo]
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Operation {
    Dilate,
    Erode,
}

fn apply_spans(mask: &GrayImage, spans: &[KernelSpan], operation: Operation) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let prefix = RowPrefix::new(mask);
    let (w, h) = (i64::from(width), i64::from(height));
    let buffer: &mut [u8] = &mut out;

    buffer
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for (x, pixel) in row.iter_mut().enumerate() {
                let x = x as i64;
                let hit = match operation {
                    Operation::Dilate => spans.iter().any(|span| {
                        let sy = y + span.dy;
                        let lo = (x + span.dx_start).max(0);
                        let hi = (x + span.dx_end).min(w - 1);
                        sy >= 0
                            && sy < h
                            && lo <= hi
                            && prefix.count(sy as usize, lo as usize, hi as usize) > 0
                    }),
                    Operation::Erode => spans.iter().all(|span| {
                        let sy = y + span.dy;
                        let lo = (x + span.dx_start).max(0);
                        let hi = (x + span.dx_end).min(w - 1);
                        if sy < 0 || sy >= h || lo > hi {
                            return true;
                        }
                        prefix.count(sy as usize, lo as usize, hi as usize)
                            == (hi - lo + 1) as u32
                    }),
                };
                if hit {
                    *pixel = FOREGROUND;
                }
            }
        });

    out
}

/// Dilates `mask` by `element`, repeated `iterations` times.
pub fn dilate(mask: &GrayImage, element: &StructuringElement, iterations: u32) -> GrayImage {
    if iterations == 0 {
        return mask.clone();
    }

    if let Some(radius) = element.square_radius()
        && let Ok(k) = u8::try_from(radius * iterations)
    {
        return morphology::dilate(mask, Norm::LInf, k);
    }

    let spans = element.spans();
    let mut current = apply_spans(mask, &spans, Operation::Dilate);
    for _ in 1..iterations {
        current = apply_spans(&current, &spans, Operation::Dilate);
    }
    current
}

/// Erodes `mask` by `element` once.
pub fn erode(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    apply_spans(mask, &element.spans(), Operation::Erode)
}

/// Morphological closing: dilation followed by erosion with the same element.
pub fn close(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    erode(&dilate(mask, element, 1), element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn mask_with(width: u32, height: u32, points: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in points {
            mask.put_pixel(x, y, Luma([FOREGROUND]));
        }
        mask
    }

    fn foreground(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p[0] > 0).count()
    }

    #[test]
    fn test_rect_dilation_of_single_pixel() {
        let mask = mask_with(40, 40, &[(20, 20)]);
        let dilated = dilate(&mask, &StructuringElement::rect(15, 9), 1);
        assert_eq!(foreground(&dilated), 15 * 9);
        assert_eq!(dilated.get_pixel(13, 16)[0], FOREGROUND);
        assert_eq!(dilated.get_pixel(27, 24)[0], FOREGROUND);
        assert_eq!(dilated.get_pixel(28, 20)[0], 0);
        assert_eq!(dilated.get_pixel(20, 25)[0], 0);
    }

    #[test]
    fn test_square_fast_path_matches_span_scan() {
        let mask = mask_with(50, 50, &[(10, 10), (30, 35), (0, 49)]);
        let element = StructuringElement::rect(7, 7);
        let fast = dilate(&mask, &element, 2);
        let spans = element.spans();
        let slow = apply_spans(
            &apply_spans(&mask, &spans, Operation::Dilate),
            &spans,
            Operation::Dilate,
        );
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_dilation_clips_at_border() {
        let mask = mask_with(10, 10, &[(0, 0)]);
        let dilated = dilate(&mask, &StructuringElement::rect(5, 5), 1);
        assert_eq!(foreground(&dilated), 9);
    }

    #[test]
    fn test_close_bridges_small_gap() {
        // two horizontal strokes separated by a 4px gap
        let mut points = Vec::new();
        for x in 5..20 {
            points.push((x, 20));
        }
        for x in 24..40 {
            points.push((x, 20));
        }
        let mask = mask_with(60, 40, &points);
        let closed = close(&mask, &StructuringElement::ellipse(9, 5));
        for x in 5..40 {
            assert_eq!(closed.get_pixel(x, 20)[0], FOREGROUND, "gap at x={x}");
        }
    }

    #[test]
    fn test_erode_removes_thin_lines() {
        let mut points = Vec::new();
        for x in 0..30 {
            points.push((x, 10));
        }
        let mask = mask_with(30, 20, &points);
        let eroded = erode(&mask, &StructuringElement::rect(3, 3));
        assert_eq!(foreground(&eroded), 0);
    }

    #[test]
    fn test_empty_mask_stays_empty() {
        let mask = GrayImage::new(64, 48);
        let element = StructuringElement::ellipse(17, 13);
        assert_eq!(foreground(&close(&mask, &element)), 0);
        assert_eq!(foreground(&dilate(&mask, &element, 2)), 0);
    }
}
