use egotraj_core::{PointCoordinates, Real};
use ndarray::{s, Array3};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PointArrayError {
    #[error("point array needs at least 3 channels, got {0}")]
    TooFewChannels(usize),
    #[error("point array has no pixels ({rows}x{cols})")]
    Empty { rows: usize, cols: usize },
}

/// Dense `(rows, cols, 3)` grid of camera-frame XYZ meters, one per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PointArray {
    data: Array3<Real>,
}

impl PointArray {
    /// Takes the first three channels of `data`; extra channels (color,
    /// confidence) are dropped.
    pub fn new(data: Array3<Real>) -> Result<Self, PointArrayError> {
        let (rows, cols, channels) = data.dim();
        if channels < 3 {
            return Err(PointArrayError::TooFewChannels(channels));
        }
        if rows == 0 || cols == 0 {
            return Err(PointArrayError::Empty { rows, cols });
        }

        let data = if channels == 3 {
            data
        } else {
            data.slice(s![.., .., 0..3]).to_owned()
        };
        Ok(Self { data })
    }

    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> [Real; 3],
    {
        let data = Array3::from_shape_fn((rows, cols, 3), |(r, c, k)| f(r, c)[k]);
        Self { data }
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    pub fn at(&self, row: usize, col: usize) -> Option<PointCoordinates> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        Some(PointCoordinates::new(
            self.data[[row, col, 0]],
            self.data[[row, col, 1]],
            self.data[[row, col, 2]],
        ))
    }

    /// Like [`PointArray::at`] but accepts coordinates left of / above the grid.
    pub fn at_signed(&self, row: i64, col: i64) -> Option<PointCoordinates> {
        if row < 0 || col < 0 {
            return None;
        }
        self.at(row as usize, col as usize)
    }

    pub fn set(&mut self, row: usize, col: usize, point: [Real; 3]) {
        for (k, value) in point.into_iter().enumerate() {
            self.data[[row, col, k]] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_channels_are_dropped() {
        let data = Array3::from_shape_fn((2, 2, 4), |(r, c, k)| (r * 100 + c * 10 + k) as f64);
        let points = PointArray::new(data).unwrap();
        assert_eq!(points.at(1, 1), Some(PointCoordinates::new(110.0, 111.0, 112.0)));
    }

    #[test]
    fn too_few_channels_is_rejected() {
        let data = Array3::<f64>::zeros((2, 2, 2));
        assert_eq!(PointArray::new(data), Err(PointArrayError::TooFewChannels(2)));
    }

    #[test]
    fn lookups_outside_the_grid_are_none() {
        let points = PointArray::from_fn(3, 4, |r, c| [r as f64, c as f64, 1.0]);
        assert_eq!(points.rows(), 3);
        assert_eq!(points.cols(), 4);
        assert!(points.at(3, 0).is_none());
        assert!(points.at_signed(-1, 2).is_none());
        assert_eq!(points.at_signed(2, 3), Some(PointCoordinates::new(2.0, 3.0, 1.0)));
    }
}
