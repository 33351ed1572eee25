use std::collections::BTreeMap;
use std::fmt;

use egotraj_core::frame::SkipReason;
use egotraj_core::{FrameId, PointCoordinates, Real};

use crate::error::{EstimationError, Result};
use crate::reference_frame::ReferenceFrame;

#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPoint {
    pub frame_id: FrameId,
    pub position_ground: PointCoordinates,
}

/// Entry of [`Trajectory::interpolate_gaps`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySample {
    pub frame_id: FrameId,
    pub position_ground: PointCoordinates,
    pub interpolated: bool,
}

/// Consecutive valid points further apart than the configured warning
/// distance. Reported, never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Jump {
    pub from: FrameId,
    pub to: FrameId,
    pub distance_m: Real,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSummary {
    pub total_frames: usize,
    pub valid_frames: usize,
    pub skipped: BTreeMap<SkipReason, Vec<FrameId>>,
    pub jumps: Vec<Jump>,
}

impl FrameSummary {
    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).map_or(0, Vec::len)
    }

    /// Frames lost to a missing or malformed detection.
    pub fn detection_skips(&self) -> usize {
        SkipReason::ALL
            .iter()
            .filter(|r| r.is_detection())
            .map(|r| self.skipped_count(*r))
            .sum()
    }

    /// Frames lost to a missing or malformed point cloud sample.
    pub fn depth_skips(&self) -> usize {
        SkipReason::ALL
            .iter()
            .filter(|r| !r.is_detection())
            .map(|r| self.skipped_count(*r))
            .sum()
    }
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} frames valid",
            self.valid_frames, self.total_frames
        )?;
        for reason in SkipReason::ALL {
            let count = self.skipped_count(reason);
            if count > 0 {
                write!(f, ", {count} {reason}")?;
            }
        }
        if !self.jumps.is_empty() {
            write!(f, ", {} suspicious jumps", self.jumps.len())?;
        }
        Ok(())
    }
}

/// Vehicle path in the ground frame, one point per valid frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
    reference: ReferenceFrame,
    summary: FrameSummary,
}

impl Trajectory {
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn reference(&self) -> &ReferenceFrame {
        &self.reference
    }

    pub fn summary(&self) -> &FrameSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(frame_id, x_m, y_m)` triples, the bird's-eye view of the path.
    pub fn planar(&self) -> Vec<(FrameId, Real, Real)> {
        self.points
            .iter()
            .map(|p| (p.frame_id, p.position_ground.x, p.position_ground.y))
            .collect()
    }

    pub fn path_length(&self) -> Real {
        self.points
            .windows(2)
            .map(|w| (w[1].position_ground - w[0].position_ground).norm())
            .sum()
    }

    /// Fills frame-id gaps between valid points by linear interpolation.
    ///
    /// This is a separate smoothing step; the trajectory itself never
    /// contains interpolated points.
    pub fn interpolate_gaps(&self) -> Vec<TrajectorySample> {
        let mut samples = Vec::with_capacity(self.points.len());
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                let previous = &self.points[i - 1];
                let span = (point.frame_id - previous.frame_id) as Real;
                for frame_id in (previous.frame_id + 1)..point.frame_id {
                    let t = (frame_id - previous.frame_id) as Real / span;
                    samples.push(TrajectorySample {
                        frame_id,
                        position_ground: previous.position_ground
                            + (point.position_ground - previous.position_ground) * t,
                        interpolated: true,
                    });
                }
            }
            samples.push(TrajectorySample {
                frame_id: point.frame_id,
                position_ground: point.position_ground,
                interpolated: false,
            });
        }
        samples
    }
}

/// Collects per-frame results in frame order.
pub struct TrajectoryAggregator {
    reference: ReferenceFrame,
    points: Vec<TrajectoryPoint>,
    summary: FrameSummary,
    last_frame: Option<FrameId>,
    jump_warning_m: Real,
}

impl TrajectoryAggregator {
    pub fn new(reference: ReferenceFrame, jump_warning_m: Real) -> Self {
        Self {
            reference,
            points: Vec::new(),
            summary: FrameSummary::default(),
            last_frame: None,
            jump_warning_m,
        }
    }

    pub fn reference(&self) -> &ReferenceFrame {
        &self.reference
    }

    pub fn push(&mut self, frame_id: FrameId, position_ground: PointCoordinates) -> Result<()> {
        self.advance(frame_id)?;

        if let Some(previous) = self.points.last() {
            let distance_m = (position_ground - previous.position_ground).norm();
            if distance_m > self.jump_warning_m {
                log::warn!(
                    "vehicle jumped {distance_m:.2} m between frames {} and {frame_id}",
                    previous.frame_id
                );
                self.summary.jumps.push(Jump {
                    from: previous.frame_id,
                    to: frame_id,
                    distance_m,
                });
            }
        }

        self.summary.valid_frames += 1;
        self.points.push(TrajectoryPoint {
            frame_id,
            position_ground,
        });
        Ok(())
    }

    pub fn skip(&mut self, frame_id: FrameId, reason: SkipReason) -> Result<()> {
        self.advance(frame_id)?;
        self.summary.skipped.entry(reason).or_default().push(frame_id);
        Ok(())
    }

    pub fn finish(self) -> Trajectory {
        Trajectory {
            points: self.points,
            reference: self.reference,
            summary: self.summary,
        }
    }

    fn advance(&mut self, frame_id: FrameId) -> Result<()> {
        if let Some(previous) = self.last_frame {
            if frame_id <= previous {
                return Err(EstimationError::OutOfOrder { previous, frame_id });
            }
        }
        self.last_frame = Some(frame_id);
        self.summary.total_frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> ReferenceFrame {
        ReferenceFrame::from_up_axis(
            0,
            PointCoordinates::new(5.0, 0.0, 0.0),
            PointCoordinates::new(0.0, 0.0, -1.0),
        )
        .unwrap()
    }

    fn ground(x: Real, y: Real) -> PointCoordinates {
        PointCoordinates::new(x, y, 0.0)
    }

    #[test]
    fn counts_valid_and_skipped_frames() {
        let mut aggregator = TrajectoryAggregator::new(reference(), 5.0);
        aggregator.skip(0, SkipReason::MissingDetection).unwrap();
        aggregator.push(1, ground(0.0, 0.0)).unwrap();
        aggregator.skip(2, SkipReason::MissingDepth).unwrap();
        aggregator.skip(3, SkipReason::MalformedDetection).unwrap();
        aggregator.push(4, ground(1.0, 0.5)).unwrap();

        let trajectory = aggregator.finish();
        let summary = trajectory.summary();
        assert_eq!(summary.total_frames, 5);
        assert_eq!(summary.valid_frames, 2);
        assert_eq!(summary.detection_skips(), 2);
        assert_eq!(summary.depth_skips(), 1);
        assert_eq!(summary.skipped[&SkipReason::MissingDepth], vec![2]);
        assert_eq!(
            summary.to_string(),
            "2 of 5 frames valid, 1 missing detection, 1 malformed detection, 1 missing depth"
        );
        assert_eq!(trajectory.planar(), vec![(1, 0.0, 0.0), (4, 1.0, 0.5)]);
    }

    #[test]
    fn out_of_order_and_duplicate_frames_are_rejected() {
        let mut aggregator = TrajectoryAggregator::new(reference(), 5.0);
        aggregator.push(3, ground(0.0, 0.0)).unwrap();
        assert_eq!(
            aggregator.push(3, ground(0.0, 0.0)),
            Err(EstimationError::OutOfOrder {
                previous: 3,
                frame_id: 3
            })
        );
        assert!(aggregator.skip(1, SkipReason::MissingDepth).is_err());
        assert_eq!(aggregator.finish().len(), 1);
    }

    #[test]
    fn large_jumps_are_reported_but_kept() {
        let mut aggregator = TrajectoryAggregator::new(reference(), 2.0);
        aggregator.push(0, ground(0.0, 0.0)).unwrap();
        aggregator.push(1, ground(0.5, 0.0)).unwrap();
        aggregator.push(2, ground(30.5, 0.0)).unwrap();

        let trajectory = aggregator.finish();
        assert_eq!(trajectory.len(), 3);
        assert_eq!(
            trajectory.summary().jumps,
            vec![Jump {
                from: 1,
                to: 2,
                distance_m: 30.0
            }]
        );
        assert_relative_eq!(trajectory.path_length(), 30.5, epsilon = 1e-12);
    }

    #[test]
    fn gaps_are_filled_only_on_request() {
        let mut aggregator = TrajectoryAggregator::new(reference(), 10.0);
        aggregator.push(2, ground(0.0, 0.0)).unwrap();
        aggregator.skip(3, SkipReason::MissingDepth).unwrap();
        aggregator.skip(4, SkipReason::MissingDepth).unwrap();
        aggregator.push(5, ground(3.0, -1.5)).unwrap();
        aggregator.push(6, ground(4.0, -1.5)).unwrap();
        let trajectory = aggregator.finish();

        assert_eq!(trajectory.len(), 3);

        let samples = trajectory.interpolate_gaps();
        let ids: Vec<_> = samples.iter().map(|s| s.frame_id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5, 6]);
        assert!(samples[1].interpolated && samples[2].interpolated);
        assert!(!samples[3].interpolated);
        assert_relative_eq!(samples[1].position_ground.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(samples[2].position_ground.y, -1.0, epsilon = 1e-12);
    }
}
