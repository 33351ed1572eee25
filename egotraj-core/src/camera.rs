use serde::Deserialize;

use crate::PointCoordinates;

/// Axis layout of the camera frame the point arrays are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraConvention {
    /// x forward, y right, z down.
    #[default]
    ForwardRightDown,
    /// x forward, y left, z up (ROS body frame).
    ForwardLeftUp,
    /// x right, y down, z forward (OpenCV optical frame).
    RightDownForward,
}

impl CameraConvention {
    /// Unit vector pointing up, in camera coordinates.
    pub fn up_axis(&self) -> PointCoordinates {
        match self {
            CameraConvention::ForwardRightDown => PointCoordinates::new(0.0, 0.0, -1.0),
            CameraConvention::ForwardLeftUp => PointCoordinates::new(0.0, 0.0, 1.0),
            CameraConvention::RightDownForward => PointCoordinates::new(0.0, -1.0, 0.0),
        }
    }
}

pub trait Camera {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn convention(&self) -> CameraConvention;

    fn up_axis(&self) -> PointCoordinates {
        self.convention().up_axis()
    }

    /// Whether pixel `(u, v)` lies inside `[0, cols) x [0, rows)`.
    fn contains(&self, u: f64, v: f64) -> bool {
        u >= 0.0 && v >= 0.0 && u < self.cols() as f64 && v < self.rows() as f64
    }
}
