mod dataset;
pub use dataset::*;
mod camera;
pub use camera::*;
pub mod frame;

use sophus::nalgebra::Vector3;

pub type Real = f64;
pub type FrameId = u64;
/// XYZ in meters, either in a camera frame or in the ground frame.
pub type PointCoordinates = Vector3<Real>;
