use anyhow::{bail, Result};
use egotraj_core::frame::{PixelCenter, SkipReason};
use egotraj_core::{PointCoordinates, Real};
use serde::Deserialize;

use crate::point_array::PointArray;

/// Largest accepted fallback window side, in pixels.
pub const MAX_WINDOW_SIZE: usize = 101;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepthSamplerCfg {
    /// Side of the square fallback neighborhood, in pixels. Must be odd.
    pub window_size: usize,
    pub min_range_m: Real,
    pub max_range_m: Real,
}

impl Default for DepthSamplerCfg {
    fn default() -> Self {
        Self {
            window_size: 5,
            min_range_m: 0.0,
            max_range_m: Real::INFINITY,
        }
    }
}

impl DepthSamplerCfg {
    pub fn finalize(self) -> Result<DepthSampler> {
        if self.window_size == 0 || self.window_size % 2 == 0 || self.window_size > MAX_WINDOW_SIZE {
            bail!(
                "depth sampler window must be an odd size in 1..={MAX_WINDOW_SIZE}, got {}",
                self.window_size
            );
        }
        if self.min_range_m.is_nan() || self.max_range_m.is_nan() || self.min_range_m > self.max_range_m {
            bail!(
                "invalid depth range [{}, {}]",
                self.min_range_m,
                self.max_range_m
            );
        }

        log::debug!(
            "depth sampler: {0}x{0} fallback window, range [{1}, {2}] m",
            self.window_size,
            self.min_range_m,
            self.max_range_m
        );

        Ok(DepthSampler {
            half_window: (self.window_size / 2) as i64,
            min_range_m: self.min_range_m,
            max_range_m: self.max_range_m,
        })
    }
}

/// Recovers the camera-frame point behind a pixel from an organized point
/// cloud, averaging over the neighborhood when the pixel itself has no data.
#[derive(Debug, Clone)]
pub struct DepthSampler {
    half_window: i64,
    min_range_m: Real,
    max_range_m: Real,
}

impl Default for DepthSampler {
    fn default() -> Self {
        Self {
            half_window: 2,
            min_range_m: 0.0,
            max_range_m: Real::INFINITY,
        }
    }
}

impl DepthSampler {
    /// NaN/inf, all-zero (no return) and out-of-range samples are invalid.
    pub fn is_valid(&self, point: &PointCoordinates) -> bool {
        if !point.iter().all(|x| x.is_finite()) {
            return false;
        }
        if point.iter().all(|x| *x == 0.0) {
            return false;
        }
        let range = point.norm();
        range >= self.min_range_m && range <= self.max_range_m
    }

    pub fn sample(
        &self,
        points: &PointArray,
        center: PixelCenter,
    ) -> std::result::Result<PointCoordinates, SkipReason> {
        let (row, col) = center.row_col();

        if let Some(point) = points.at_signed(row, col) {
            if self.is_valid(&point) {
                return Ok(point);
            }
        }

        // window clipped to the grid; empty when the pixel is far outside it
        let row_range = clipped(row, self.half_window, points.rows());
        let col_range = clipped(col, self.half_window, points.cols());

        let mut sum = PointCoordinates::zeros();
        let mut count = 0usize;
        for r in row_range {
            for c in col_range.clone() {
                match points.at(r, c) {
                    Some(point) if self.is_valid(&point) => {
                        sum += point;
                        count += 1;
                    }
                    _ => {}
                }
            }
        }

        if count == 0 {
            log::debug!("no valid depth around pixel (row {row}, col {col})");
            return Err(SkipReason::MissingDepth);
        }

        log::debug!(
            "invalid depth at pixel (row {row}, col {col}), averaged {count} neighbors"
        );
        Ok(sum / count as Real)
    }
}

fn clipped(center: i64, half_window: i64, len: usize) -> std::ops::Range<usize> {
    let lo = center.saturating_sub(half_window).max(0);
    let hi = center.saturating_add(half_window).min(len as i64 - 1);
    if lo > hi {
        return 0..0;
    }
    lo as usize..hi as usize + 1
}
