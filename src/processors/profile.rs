//! One-dimensional ink density profiles.
//!
//! Helpers for projecting a binary mask onto its rows or columns and for
//! post-processing the resulting signals: Gaussian smoothing, percentiles,
//! and run-length manipulation of boolean masks.

use image::GrayImage;
use itertools::Itertools;
use rayon::prelude::*;

/// Foreground pixel count of every row in `y0..y1`, restricted to columns `x0..x1`.
pub fn row_counts(mask: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<u32> {
    let width = mask.width() as usize;
    if width == 0 || y1 <= y0 || x1 <= x0 {
        return Vec::new();
    }
    let raw: &[u8] = mask.as_raw();
    raw.par_chunks(width)
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .map(|row| {
            row[x0 as usize..x1 as usize]
                .iter()
                .filter(|&&v| v > 0)
                .count() as u32
        })
        .collect()
}

/// Foreground pixel count of every column in `x0..x1`, restricted to rows `y0..y1`.
pub fn column_counts(mask: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<u32> {
    let width = mask.width() as usize;
    if width == 0 || y1 <= y0 || x1 <= x0 {
        return Vec::new();
    }
    let raw: &[u8] = mask.as_raw();
    let mut counts = vec![0u32; (x1 - x0) as usize];
    for row in raw.chunks(width).skip(y0 as usize).take((y1 - y0) as usize) {
        for (count, &v) in counts.iter_mut().zip(&row[x0 as usize..x1 as usize]) {
            *count += u32::from(v > 0);
        }
    }
    counts
}

/// Smooths `signal` with a normalized Gaussian of standard deviation `sigma`.
///
/// The kernel spans `8 * sigma + 1` taps (rounded to an odd count) and the
/// signal is extended by mirroring around its end samples without repeating
/// them (`dcb|abcd|cba`).
pub fn gaussian_smooth(signal: &[f64], sigma: f64) -> Vec<f64> {
    let n = signal.len();
    if n == 0 || sigma <= 0.0 {
        return signal.to_vec();
    }

    let ksize = ((sigma * 8.0 + 1.0).round() as usize) | 1;
    let half = (ksize / 2) as i64;
    let scale = -0.5 / (sigma * sigma);
    let mut kernel: Vec<f64> = (-half..=half)
        .map(|i| ((i * i) as f64 * scale).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);

    (0..n as i64)
        .map(|i| {
            kernel
                .iter()
                .zip(-half..=half)
                .map(|(k, offset)| k * signal[reflect_101(i + offset, n)])
                .sum()
        })
        .collect()
}

fn reflect_101(index: i64, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as i64 - 1;
    let period = 2 * last;
    let mut i = index.rem_euclid(period);
    if i > last {
        i = period - i;
    }
    i as usize
}

/// The `q`-th percentile (`0..=100`) of `values` using linear interpolation
/// between the two closest ranks. Returns 0 for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted: Vec<f64> = values.iter().copied().sorted_by(f64::total_cmp).collect();
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Flips runs of `false` no longer than `max_len` to `true` when both
/// neighbours of the run are `true`. Runs touching either end are kept.
pub fn fill_short_false_runs(mask: &[bool], max_len: usize) -> Vec<bool> {
    let mut out = mask.to_vec();
    for (start, end) in false_runs(mask) {
        if start > 0 && end < mask.len() && end - start <= max_len {
            out[start..end].fill(true);
        }
    }
    out
}

/// Half-open index ranges of the maximal runs of `true` in `mask`.
pub fn true_runs(mask: &[bool]) -> Vec<(usize, usize)> {
    runs_of(mask, true)
}

fn false_runs(mask: &[bool]) -> Vec<(usize, usize)> {
    runs_of(mask, false)
}

fn runs_of(mask: &[bool], value: bool) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < mask.len() {
        if mask[i] != value {
            i += 1;
            continue;
        }
        let start = i;
        while i < mask.len() && mask[i] == value {
            i += 1;
        }
        runs.push((start, i));
    }
    runs
}

/// Arithmetic mean and population standard deviation. Both are 0 for an empty slice.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
