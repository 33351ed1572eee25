//! Ground frame fixed by the first landmark observation.
//!
//! World axes, expressed in camera coordinates at the reference frame:
//! - +Z: the camera's up axis
//! - +X: the landmark bearing projected onto the plane orthogonal to +Z
//! - +Y: Z x X (left of the bearing)
//!
//! The camera is assumed to keep its orientation relative to the ground for
//! the whole sequence; only its position changes. Heading or pitch changes in
//! the data show up as distortion of the recovered path and are not corrected.

use egotraj_core::{Camera, FrameId, PointCoordinates, Real};
use serde::Deserialize;
use sophus::nalgebra::{Matrix3, Rotation3};

use crate::error::{EstimationError, Result};

/// Horizontal bearings shorter than this cannot define world +X.
const MIN_HORIZONTAL_RANGE_M: Real = 1e-9;

/// Which point of the ground frame sits at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// The vehicle at the reference frame is the origin.
    #[default]
    Reference,
    /// The landmark is the origin; the vehicle starts at `(-d, 0)`.
    Landmark,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceFrame {
    frame_id: FrameId,
    origin_camera_point: PointCoordinates,
    // camera -> world
    rotation: Rotation3<Real>,
}

impl ReferenceFrame {
    pub fn capture<C: Camera>(
        frame_id: FrameId,
        camera_point: PointCoordinates,
        camera: &C,
    ) -> Result<Self> {
        Self::from_up_axis(frame_id, camera_point, camera.up_axis())
    }

    pub fn from_up_axis(
        frame_id: FrameId,
        camera_point: PointCoordinates,
        up: PointCoordinates,
    ) -> Result<Self> {
        let z_axis = up.normalize();
        let horizontal = camera_point - z_axis * camera_point.dot(&z_axis);
        let horizontal_m = horizontal.norm();
        if !(horizontal_m >= MIN_HORIZONTAL_RANGE_M) {
            return Err(EstimationError::DegenerateReference {
                frame_id,
                horizontal_m,
            });
        }

        let x_axis = horizontal / horizontal_m;
        let y_axis = z_axis.cross(&x_axis);
        let matrix = Matrix3::from_rows(&[x_axis.transpose(), y_axis.transpose(), z_axis.transpose()]);

        Ok(Self {
            frame_id,
            origin_camera_point: camera_point,
            rotation: Rotation3::from_matrix_unchecked(matrix),
        })
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    pub fn origin_camera_point(&self) -> &PointCoordinates {
        &self.origin_camera_point
    }

    pub fn rotation(&self) -> &Rotation3<Real> {
        &self.rotation
    }

    /// Rotates a camera-frame vector into world axes.
    pub fn to_world(&self, camera_vector: &PointCoordinates) -> PointCoordinates {
        self.rotation * camera_vector
    }

    /// Vehicle (camera) position in the ground frame, given where the
    /// landmark appears in the camera frame.
    ///
    /// The landmark does not move, so the vehicle's displacement is the
    /// negated, rotated displacement of the landmark's apparent position.
    pub fn ego_position(
        &self,
        camera_point: &PointCoordinates,
        anchor: Anchor,
        project_to_ground: bool,
    ) -> PointCoordinates {
        let relative = match anchor {
            Anchor::Reference => camera_point - self.origin_camera_point,
            Anchor::Landmark => *camera_point,
        };
        let mut position = -self.to_world(&relative);
        if project_to_ground {
            position.z = 0.0;
        }
        position
    }

    /// Landmark position in the ground frame for the given anchoring.
    pub fn landmark_position(&self, anchor: Anchor, project_to_ground: bool) -> PointCoordinates {
        let mut position = match anchor {
            Anchor::Reference => self.to_world(&self.origin_camera_point),
            Anchor::Landmark => PointCoordinates::zeros(),
        };
        if project_to_ground {
            position.z = 0.0;
        }
        position
    }
}
