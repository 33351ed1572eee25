use std::fmt;

use crate::{FrameId, PointCoordinates, Real};

/// Axis-aligned detection box in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: Real,
    pub y_min: Real,
    pub x_max: Real,
    pub y_max: Real,
}

impl BoundingBox {
    pub fn new(x_min: Real, y_min: Real, x_max: Real, y_max: Real) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// The dataset writes `0,0,0,0` for frames without a detection.
    pub fn is_zeroed(&self) -> bool {
        self.x_min == 0.0 && self.y_min == 0.0 && self.x_max == 0.0 && self.y_max == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x_min.is_finite()
            && self.y_min.is_finite()
            && self.x_max.is_finite()
            && self.y_max.is_finite()
    }

    pub fn area(&self) -> Real {
        (self.x_max - self.x_min).max(0.0) * (self.y_max - self.y_min).max(0.0)
    }

    pub fn center(&self) -> PixelCenter {
        PixelCenter {
            u: (self.x_min + self.x_max) / 2.0,
            v: (self.y_min + self.y_max) / 2.0,
        }
    }
}

/// Sub-pixel image location: `u` is the column, `v` the row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelCenter {
    pub u: Real,
    pub v: Real,
}

impl PixelCenter {
    pub fn new(u: Real, v: Real) -> Self {
        Self { u, v }
    }

    /// Integer `(row, col)` the center falls into. Truncates toward zero.
    pub fn row_col(&self) -> (i64, i64) {
        (self.v.trunc() as i64, self.u.trunc() as i64)
    }
}

/// Why a frame did not make it into the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    MissingDetection,
    MalformedDetection,
    MissingDepth,
    MalformedDepth,
}

impl SkipReason {
    pub const ALL: [SkipReason; 4] = [
        SkipReason::MissingDetection,
        SkipReason::MalformedDetection,
        SkipReason::MissingDepth,
        SkipReason::MalformedDepth,
    ];

    pub fn is_detection(&self) -> bool {
        matches!(
            self,
            SkipReason::MissingDetection | SkipReason::MalformedDetection
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkipReason::MissingDetection => "missing detection",
            SkipReason::MalformedDetection => "malformed detection",
            SkipReason::MissingDepth => "missing depth",
            SkipReason::MalformedDepth => "malformed depth",
        };
        f.write_str(name)
    }
}

/// Result of one frame: either the landmark in camera coordinates or the
/// reason the frame was dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Landmark(PointCoordinates),
    Skipped(SkipReason),
}

/// What one frame contributed: the box the detector reported, if any, and
/// how the frame turned out.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameObservation {
    pub frame_id: FrameId,
    pub bbox: Option<BoundingBox>,
    pub outcome: FrameOutcome,
}

impl FrameObservation {
    pub fn valid(frame_id: FrameId, bbox: BoundingBox, camera_point: PointCoordinates) -> Self {
        Self {
            frame_id,
            bbox: Some(bbox),
            outcome: FrameOutcome::Landmark(camera_point),
        }
    }

    pub fn skipped(frame_id: FrameId, bbox: Option<BoundingBox>, reason: SkipReason) -> Self {
        Self {
            frame_id,
            bbox,
            outcome: FrameOutcome::Skipped(reason),
        }
    }

    pub fn camera_point(&self) -> Option<PointCoordinates> {
        match self.outcome {
            FrameOutcome::Landmark(point) => Some(point),
            FrameOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.outcome {
            FrameOutcome::Landmark(_) => None,
            FrameOutcome::Skipped(reason) => Some(reason),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, FrameOutcome::Landmark(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_box_midpoint() {
        let bbox = BoundingBox::new(100.0, 100.0, 120.0, 120.0);
        assert_eq!(bbox.center(), PixelCenter::new(110.0, 110.0));
        assert_eq!(bbox.area(), 400.0);
    }

    #[test]
    fn row_col_truncates() {
        let center = PixelCenter::new(10.9, 4.5);
        assert_eq!(center.row_col(), (4, 10));
    }

    #[test]
    fn inverted_box_has_no_area() {
        let bbox = BoundingBox::new(50.0, 10.0, 40.0, 20.0);
        assert_eq!(bbox.area(), 0.0);
        assert!(!bbox.is_zeroed());
    }

    #[test]
    fn observation_carries_either_a_point_or_a_reason() {
        let bbox = BoundingBox::new(1.0, 1.0, 3.0, 3.0);
        let valid = FrameObservation::valid(4, bbox, PointCoordinates::new(5.0, 0.0, 0.0));
        assert!(valid.is_valid());
        assert_eq!(valid.camera_point(), Some(PointCoordinates::new(5.0, 0.0, 0.0)));
        assert_eq!(valid.skip_reason(), None);

        let skipped = FrameObservation::skipped(5, Some(bbox), SkipReason::MalformedDepth);
        assert!(!skipped.is_valid());
        assert_eq!(skipped.camera_point(), None);
        assert_eq!(skipped.skip_reason(), Some(SkipReason::MalformedDepth));
    }
}
