//! Built-in gradient Hough circle finder.
//!
//! Pipeline: Gaussian blur, Canny edges, then every edge pixel votes along its
//! gradient direction for centers at each radius in range. The accumulator is
//! smoothed so votes scattered by rounding collect into one peak. Peaks above
//! `circle_threshold` become centers; each center's radius is the most common
//! edge distance around it. Candidates come back strongest first. A peak is
//! dropped when it lies within `min_radius / 2` of a stronger one, or inside a
//! stronger circle.

#[cfg(test)]
#[path = "vision_test.rs"]
mod vision_test;

use std::f32::consts::TAU;

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::detect::{Circle, CircleFinder, HoughParams};
use crate::error::DetectError;

/// Blur sigma roughly matching a 5x5 Gaussian kernel.
const BLUR_SIGMA: f32 = 1.1;

/// Sigma of the accumulator smoothing pass.
const ACCUM_SIGMA: f32 = 1.0;

/// Edge pixels with a weaker Sobel response than this cast no votes.
const MIN_GRADIENT: f32 = 1.0;

/// Gradient Hough circle finder backed by `imageproc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoughCircleFinder;

impl CircleFinder for HoughCircleFinder {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn find_circles(&self, image: &GrayImage, params: &HoughParams) -> Result<Vec<Circle>, DetectError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectError::Backend(format!("empty image ({width}x{height})")));
        }
        let min_r = params.min_radius.max(1);
        let max_r = params.max_radius.max(min_r);

        let blurred = gaussian_blur_f32(image, BLUR_SIGMA);
        let high = params.edge_threshold as f32;
        let edges = canny(&blurred, high / 2.0, high);
        let gx = horizontal_sobel(&blurred);
        let gy = vertical_sobel(&blurred);

        let edge_points: Vec<(u32, u32)> = edges
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 0)
            .map(|(x, y, _)| (x, y))
            .collect();

        let mut acc = Accumulator::new(width, height);
        for &(x, y) in &edge_points {
            let dx = f32::from(gx.get_pixel(x, y).0[0]);
            let dy = f32::from(gy.get_pixel(x, y).0[0]);
            let mag = dx.hypot(dy);
            if mag < MIN_GRADIENT {
                continue;
            }
            let (ux, uy) = (dx / mag, dy / mag);
            for r in min_r..=max_r {
                let r = r as f32;
                acc.vote(x, y, ux * r, uy * r);
                acc.vote(x, y, -ux * r, -uy * r);
            }
        }

        let peaks = acc.smoothed().peaks(params.circle_threshold as f32);
        let min_dist = (f64::from(min_r) * 0.5).max(1.0);
        let circles = select_circles(&peaks, &edge_points, min_r, max_r, min_dist);

        tracing::debug!(edges = edge_points.len(), peaks = peaks.len(), circles = circles.len(), "hough pass complete");
        Ok(circles)
    }
}

/// Walk `peaks` strongest first and keep those that are not duplicates of a kept circle.
///
/// A peak is a duplicate when it is closer than `min_dist` to a kept center or
/// falls inside a kept circle. Peaks with no edge support in range are skipped.
fn select_circles(peaks: &[(f64, f64)], edges: &[(u32, u32)], min_r: u32, max_r: u32, min_dist: f64) -> Vec<Circle> {
    let mut kept: Vec<Circle> = Vec::new();
    for &(x, y) in peaks {
        let duplicate = kept.iter().any(|k| (k.x - x).hypot(k.y - y) < min_dist.max(k.radius));
        if duplicate {
            continue;
        }
        if let Some(radius) = best_radius(edges, x, y, min_r, max_r) {
            kept.push(Circle { x, y, radius });
        }
    }
    kept
}

#[derive(Clone)]
struct Accumulator {
    width: u32,
    height: u32,
    votes: Vec<f32>,
}

impl Accumulator {
    fn new(width: u32, height: u32) -> Self {
        Self { width, height, votes: vec![0.0; width as usize * height as usize] }
    }

    /// Deposit one vote at `(x + dx, y + dy)`, split bilinearly over the four nearest cells.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn vote(&mut self, x: u32, y: u32, dx: f32, dy: f32) {
        let (vx, vy) = (x as f32 + dx, y as f32 + dy);
        if vx < 0.0 || vy < 0.0 || vx > (self.width - 1) as f32 || vy > (self.height - 1) as f32 {
            return;
        }
        let (x0, y0) = (vx.floor() as u32, vy.floor() as u32);
        let (fx, fy) = (vx - x0 as f32, vy - y0 as f32);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        self.add(x0, y0, (1.0 - fx) * (1.0 - fy));
        self.add(x1, y0, fx * (1.0 - fy));
        self.add(x0, y1, (1.0 - fx) * fy);
        self.add(x1, y1, fx * fy);
    }

    fn add(&mut self, x: u32, y: u32, weight: f32) {
        let index = y as usize * self.width as usize + x as usize;
        self.votes[index] += weight;
    }

    fn get(&self, x: u32, y: u32) -> f32 {
        self.votes[y as usize * self.width as usize + x as usize]
    }

    /// Gaussian-smoothed copy, rescaled so a vote at the center of a cell still counts as one.
    fn smoothed(&self) -> Self {
        let Some(buffer) = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(self.width, self.height, self.votes.clone())
        else {
            tracing::warn!(width = self.width, height = self.height, "accumulator smoothing skipped");
            return self.clone();
        };
        let scale = TAU * ACCUM_SIGMA * ACCUM_SIGMA;
        let votes = gaussian_blur_f32(&buffer, ACCUM_SIGMA).into_raw().into_iter().map(|v| v * scale).collect();
        Self { width: self.width, height: self.height, votes }
    }

    /// Local maxima at or above `threshold`, strongest first, refined to the
    /// weighted centroid of their 3x3 neighborhood.
    fn peaks(&self, threshold: f32) -> Vec<(f64, f64)> {
        let mut candidates = Vec::new();
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                let v = self.get(x, y);
                if v < threshold {
                    continue;
                }
                let is_max = neighborhood(x, y).filter(|&(nx, ny)| (nx, ny) != (x, y)).all(|(nx, ny)| {
                    let n = self.get(nx, ny);
                    // Ties resolve toward the earlier pixel so a flat plateau yields one peak.
                    n < v || (n == v && (ny, nx) > (y, x))
                });
                if is_max {
                    candidates.push((v, x, y));
                }
            }
        }
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| (a.2, a.1).cmp(&(b.2, b.1))));
        candidates.into_iter().map(|(_, x, y)| self.centroid(x, y)).collect()
    }

    fn centroid(&self, x: u32, y: u32) -> (f64, f64) {
        let (mut sum, mut sx, mut sy) = (0.0_f64, 0.0_f64, 0.0_f64);
        for (nx, ny) in neighborhood(x, y) {
            let w = f64::from(self.get(nx, ny));
            sum += w;
            sx += w * f64::from(nx);
            sy += w * f64::from(ny);
        }
        if sum <= 0.0 {
            return (f64::from(x), f64::from(y));
        }
        (sx / sum, sy / sum)
    }
}

/// The 3x3 block centered on `(x, y)`. Callers keep `(x, y)` off the border.
fn neighborhood(x: u32, y: u32) -> impl Iterator<Item = (u32, u32)> {
    (y - 1..=y + 1).flat_map(move |ny| (x - 1..=x + 1).map(move |nx| (nx, ny)))
}

/// Most common edge-pixel distance from `(cx, cy)` within `[min_r, max_r]`.
///
/// Bins are one pixel wide and scored with their neighbors so a rim that
/// straddles two bins is not split. Returns `None` if no edge falls in range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn best_radius(edges: &[(u32, u32)], cx: f64, cy: f64, min_r: u32, max_r: u32) -> Option<f64> {
    let (lo, hi) = (f64::from(min_r), f64::from(max_r));
    let mut hist = vec![0_u32; (max_r - min_r + 1) as usize];
    let mut sums = vec![0.0_f64; hist.len()];
    for &(x, y) in edges {
        let d = (f64::from(x) - cx).hypot(f64::from(y) - cy);
        if d < lo - 0.5 || d > hi + 0.5 {
            continue;
        }
        let bin = ((d - lo).round().max(0.0) as usize).min(hist.len() - 1);
        hist[bin] += 1;
        sums[bin] += d;
    }

    let score = |i: usize| {
        let prev = if i > 0 { hist[i - 1] } else { 0 };
        let next = hist.get(i + 1).copied().unwrap_or(0);
        prev + 2 * hist[i] + next
    };
    let best = (0..hist.len()).filter(|&i| hist[i] > 0).max_by_key(|&i| (score(i), std::cmp::Reverse(i)))?;

    let lo_bin = best.saturating_sub(1);
    let hi_bin = (best + 1).min(hist.len() - 1);
    let count: u32 = hist[lo_bin..=hi_bin].iter().sum();
    let total: f64 = sums[lo_bin..=hi_bin].iter().sum();
    Some(total / f64::from(count))
}
