use anyhow::{bail, Result};
use egotraj_core::frame::{BoundingBox, FrameObservation, FrameOutcome, SkipReason};
use egotraj_core::{Dataset, FrameId, Lookup, Real};
use egotraj_sensor::{DepthCamera, DepthSampler, DepthSamplerCfg, PointArray};
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::EstimationError;
use crate::landmark_localizer::localize;
use crate::reference_frame::{Anchor, ReferenceFrame};
use crate::trajectory::{Trajectory, TrajectoryAggregator};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrajectoryEstimatorCfg {
    anchor: Anchor,
    project_to_ground: bool,
    /// Reject detections whose center lies outside the camera image.
    check_image_bounds: bool,
    /// Observe frames on the rayon pool.
    parallel: bool,
    jump_warning_m: Real,
    depth: DepthSamplerCfg,
}

impl Default for TrajectoryEstimatorCfg {
    fn default() -> Self {
        Self {
            anchor: Anchor::Reference,
            project_to_ground: true,
            check_image_bounds: true,
            parallel: true,
            jump_warning_m: 5.0,
            depth: DepthSamplerCfg::default(),
        }
    }
}

impl TrajectoryEstimatorCfg {
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_image_bounds_check(mut self, check_image_bounds: bool) -> Self {
        self.check_image_bounds = check_image_bounds;
        self
    }

    pub fn with_project_to_ground(mut self, project_to_ground: bool) -> Self {
        self.project_to_ground = project_to_ground;
        self
    }

    pub fn with_depth(mut self, depth: DepthSamplerCfg) -> Self {
        self.depth = depth;
        self
    }

    pub fn finalize(self, camera: DepthCamera) -> Result<TrajectoryEstimator> {
        if !(self.jump_warning_m > 0.0) {
            bail!("jump warning distance must be positive, got {}", self.jump_warning_m);
        }
        let sampler = self.depth.finalize()?;

        log::info!(
            "anchor: {:?}, project to ground: {}, image bounds check: {}",
            self.anchor,
            self.project_to_ground,
            self.check_image_bounds
        );
        log::info!("configured");

        Ok(TrajectoryEstimator {
            camera,
            sampler,
            anchor: self.anchor,
            project_to_ground: self.project_to_ground,
            check_image_bounds: self.check_image_bounds,
            parallel: self.parallel,
            jump_warning_m: self.jump_warning_m,
        })
    }
}

/// Turns landmark detections and per-frame point clouds into the vehicle's
/// path in the ground frame.
pub struct TrajectoryEstimator {
    camera: DepthCamera,
    sampler: DepthSampler,
    anchor: Anchor,
    project_to_ground: bool,
    check_image_bounds: bool,
    parallel: bool,
    jump_warning_m: Real,
}

impl TrajectoryEstimator {
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn project_to_ground(&self) -> bool {
        self.project_to_ground
    }

    /// Compute the trajectory from both collaborators. Frames are the ones
    /// the bounding box source lists.
    pub fn compute<B, P>(&self, boxes: &B, points: &P) -> Result<Trajectory, EstimationError>
    where
        B: Dataset<BoundingBox>,
        P: Dataset<PointArray>,
    {
        let observations = self.observe_all(boxes, points);
        self.aggregate(observations)
    }

    /// Localize the landmark and sample its camera-frame position for every
    /// frame, sorted by frame id.
    pub fn observe_all<B, P>(&self, boxes: &B, points: &P) -> Vec<FrameObservation>
    where
        B: Dataset<BoundingBox>,
        P: Dataset<PointArray>,
    {
        let frame_ids = boxes.frame_ids();
        log::debug!("observing {} frames", frame_ids.len());

        let mut observations: Vec<_> = if self.parallel {
            frame_ids
                .par_iter()
                .map(|frame_id| self.observe(*frame_id, boxes, points))
                .collect()
        } else {
            frame_ids
                .iter()
                .map(|frame_id| self.observe(*frame_id, boxes, points))
                .collect()
        };
        observations.sort_by_key(|o| o.frame_id);
        observations
    }

    pub fn observe<B, P>(&self, frame_id: FrameId, boxes: &B, points: &P) -> FrameObservation
    where
        B: Dataset<BoundingBox>,
        P: Dataset<PointArray>,
    {
        let bbox = match boxes
            .get(frame_id)
            .into_result(SkipReason::MissingDetection, SkipReason::MalformedDetection)
        {
            Ok(bbox) => bbox,
            Err(reason) => return skipped(frame_id, None, reason),
        };

        let bounds = self.check_image_bounds.then_some(&self.camera);
        let center = match localize(Some(&bbox), bounds) {
            Ok(center) => center,
            Err(reason) => return skipped(frame_id, Some(bbox), reason),
        };

        let cloud = match points.get(frame_id) {
            Lookup::Present(cloud) => cloud,
            Lookup::Absent => return skipped(frame_id, Some(bbox), SkipReason::MissingDepth),
            Lookup::Malformed(why) => {
                log::warn!("point cloud of frame {frame_id} is unusable: {why}");
                return skipped(frame_id, Some(bbox), SkipReason::MalformedDepth);
            }
        };

        match self.sampler.sample(&cloud, center) {
            Ok(point) => {
                log::debug!(
                    "frame {frame_id}: landmark at ({:.2}, {:.2}, {:.2})",
                    point.x,
                    point.y,
                    point.z
                );
                FrameObservation::valid(frame_id, bbox, point)
            }
            Err(reason) => skipped(frame_id, Some(bbox), reason),
        }
    }

    /// Fix the reference frame on the first valid observation and express
    /// every valid observation in it.
    pub fn aggregate(
        &self,
        mut observations: Vec<FrameObservation>,
    ) -> Result<Trajectory, EstimationError> {
        observations.sort_by_key(|o| o.frame_id);

        let Some((frame_id, landmark)) = observations
            .iter()
            .find_map(|o| o.camera_point().map(|p| (o.frame_id, p)))
        else {
            log::error!(
                "no reference landmark observation found in {} frames",
                observations.len()
            );
            return Err(EstimationError::NoReference {
                frames: observations.len(),
            });
        };

        let reference = ReferenceFrame::capture(frame_id, landmark, &self.camera)?;
        log::info!(
            "reference frame {frame_id}: landmark at ({:.2}, {:.2}, {:.2}) in camera frame",
            landmark.x,
            landmark.y,
            landmark.z
        );

        let mut aggregator = TrajectoryAggregator::new(reference.clone(), self.jump_warning_m);
        for observation in &observations {
            match observation.outcome {
                FrameOutcome::Landmark(point) => {
                    let position =
                        reference.ego_position(&point, self.anchor, self.project_to_ground);
                    aggregator.push(observation.frame_id, position)?;
                }
                FrameOutcome::Skipped(reason) => {
                    aggregator.skip(observation.frame_id, reason)?;
                }
            }
        }

        let trajectory = aggregator.finish();
        log::info!("{}", trajectory.summary());
        Ok(trajectory)
    }
}

fn skipped(frame_id: FrameId, bbox: Option<BoundingBox>, reason: SkipReason) -> FrameObservation {
    log::debug!("frame {frame_id} skipped: {reason}");
    FrameObservation::skipped(frame_id, bbox, reason)
}
