use egotraj_core::CameraConvention;
use sophus::image::ImageSize;

/// Camera that delivers an organized point cloud: one camera-frame XYZ per
/// pixel, in the axis layout given by `convention`.
#[derive(Clone, Debug)]
pub struct DepthCamera {
    pub image_size: ImageSize,

    // axis layout of the point arrays (constant during operation)
    convention: CameraConvention,
}

impl egotraj_core::Camera for DepthCamera {
    fn cols(&self) -> usize {
        self.image_size.width
    }

    fn rows(&self) -> usize {
        self.image_size.height
    }

    fn convention(&self) -> CameraConvention {
        self.convention
    }
}

impl DepthCamera {
    pub fn new(image_size: ImageSize) -> Self {
        Self {
            image_size,

            convention: CameraConvention::default(),
        }
    }

    pub fn with_convention(mut self, convention: CameraConvention) -> Self {
        self.convention = convention;
        self
    }
}
