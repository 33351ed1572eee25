pub mod depth_camera;
pub mod depth_sampler;
pub mod point_array;

pub use depth_camera::DepthCamera;
pub use depth_sampler::{DepthSampler, DepthSamplerCfg};
pub use point_array::{PointArray, PointArrayError};
