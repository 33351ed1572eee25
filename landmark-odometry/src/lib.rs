//! Ego-vehicle odometry from a single fixed landmark.
//!
//! Per frame: detection box -> pixel center -> camera-frame landmark point.
//! The first valid frame fixes the ground frame; every later frame's landmark
//! point is turned into the vehicle position relative to it.

pub mod error;
pub mod estimator;
pub mod landmark_localizer;
pub mod reference_frame;
pub mod trajectory;

pub use error::EstimationError;
pub use estimator::{TrajectoryEstimator, TrajectoryEstimatorCfg};
pub use landmark_localizer::localize;
pub use reference_frame::{Anchor, ReferenceFrame};
pub use trajectory::{FrameSummary, Jump, Trajectory, TrajectoryAggregator, TrajectoryPoint, TrajectorySample};
