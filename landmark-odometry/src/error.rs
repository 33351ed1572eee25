use egotraj_core::FrameId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("no reference landmark observation found in {frames} frames; the ground frame cannot be established")]
    NoReference { frames: usize },

    #[error("landmark at reference frame {frame_id} is straight above or below the camera ({horizontal_m:.3e} m horizontal); no heading can be fixed")]
    DegenerateReference { frame_id: FrameId, horizontal_m: f64 },

    #[error("frame {frame_id} arrived after frame {previous}; frames must be aggregated in increasing order")]
    OutOfOrder { previous: FrameId, frame_id: FrameId },
}

pub type Result<T> = std::result::Result<T, EstimationError>;
