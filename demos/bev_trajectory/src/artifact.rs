use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use egotraj_core::{FrameId, Real};
use landmark_odometry::{Trajectory, TrajectorySample};
use serde::Serialize;

#[derive(Serialize)]
struct TrajectoryRow {
    frame_id: FrameId,
    x_m: Real,
    y_m: Real,
}

#[derive(Serialize)]
struct FilledRow {
    frame_id: FrameId,
    x_m: Real,
    y_m: Real,
    interpolated: bool,
}

/// Writes `frame_id,x_m,y_m`, one row per valid frame in frame order.
pub fn write_trajectory<W: io::Write>(writer: W, trajectory: &Trajectory) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for (frame_id, x_m, y_m) in trajectory.planar() {
        writer.serialize(TrajectoryRow { frame_id, x_m, y_m })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_filled<W: io::Write>(writer: W, samples: &[TrajectorySample]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for sample in samples {
        writer.serialize(FilledRow {
            frame_id: sample.frame_id,
            x_m: sample.position_ground.x,
            y_m: sample.position_ground.y,
            interpolated: sample.interpolated,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_trajectory(path: &Path, trajectory: &Trajectory) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_trajectory(file, trajectory)
        .with_context(|| format!("failed to write trajectory to {}", path.display()))?;
    log::info!("trajectory written to {}", path.display());
    Ok(())
}

pub fn save_filled(path: &Path, trajectory: &Trajectory) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_filled(file, &trajectory.interpolate_gaps())
        .with_context(|| format!("failed to write gap-filled trajectory to {}", path.display()))?;
    log::info!("gap-filled trajectory written to {}", path.display());
    Ok(())
}
