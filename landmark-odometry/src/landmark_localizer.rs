use egotraj_core::frame::{BoundingBox, PixelCenter, SkipReason};
use egotraj_core::Camera;

/// Pixel the landmark sits at: the center of its detection box.
///
/// Zeroed, non-finite or empty boxes count as "no detection", as do boxes
/// whose center falls outside the image when `bounds` is given.
pub fn localize<C: Camera>(
    bbox: Option<&BoundingBox>,
    bounds: Option<&C>,
) -> Result<PixelCenter, SkipReason> {
    let Some(bbox) = bbox else {
        return Err(SkipReason::MissingDetection);
    };

    if bbox.is_zeroed() || !bbox.is_finite() || bbox.area() <= 0.0 {
        return Err(SkipReason::MissingDetection);
    }

    let center = bbox.center();
    if let Some(camera) = bounds {
        if !camera.contains(center.u, center.v) {
            return Err(SkipReason::MissingDetection);
        }
    }

    Ok(center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egotraj_sensor::DepthCamera;
    use sophus::image::ImageSize;

    fn camera() -> DepthCamera {
        DepthCamera::new(ImageSize::new(640, 480))
    }

    #[test]
    fn center_of_valid_box() {
        let bbox = BoundingBox::new(90.0, 100.0, 110.0, 120.0);
        assert_eq!(
            localize(Some(&bbox), Some(&camera())),
            Ok(PixelCenter::new(100.0, 110.0))
        );
    }

    #[test]
    fn degenerate_boxes_are_missing_detections() {
        let cases = [
            BoundingBox::new(0.0, 0.0, 0.0, 0.0),
            BoundingBox::new(10.0, 10.0, 10.0, 30.0),
            BoundingBox::new(40.0, 10.0, 20.0, 30.0),
            BoundingBox::new(f64::NAN, 10.0, 20.0, 30.0),
        ];
        for bbox in cases {
            assert_eq!(
                localize(Some(&bbox), Some(&camera())),
                Err(SkipReason::MissingDetection),
                "{bbox:?}"
            );
        }
        assert_eq!(
            localize::<DepthCamera>(None, None),
            Err(SkipReason::MissingDetection)
        );
    }

    #[test]
    fn center_outside_the_image_is_rejected_only_with_bounds() {
        let bbox = BoundingBox::new(630.0, 470.0, 660.0, 500.0);
        assert_eq!(
            localize(Some(&bbox), Some(&camera())),
            Err(SkipReason::MissingDetection)
        );
        assert_eq!(
            localize::<DepthCamera>(Some(&bbox), None),
            Ok(PixelCenter::new(645.0, 485.0))
        );
    }
}
