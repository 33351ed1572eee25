//! Bird's-eye view recording of the estimated path.
//!
//! Entity layout:
//!     ground/landmark      - traffic light position (static)
//!     ground/path          - full path as one line strip (static)
//!     ground/start, end    - first and last positions (static)
//!     ground/ego           - vehicle position on the `frame` timeline
//!     ground/trail         - path travelled so far on the `frame` timeline
//!     plots/distance_m     - distance from the landmark per frame

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use egotraj_core::PointCoordinates;
use landmark_odometry::Trajectory;
use rerun::RecordingStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RerunMode {
    Off,
    /// Stream to a newly spawned viewer.
    Spawn,
    /// Write an `.rrd` file into the output directory.
    Save,
}

fn planar(point: &PointCoordinates) -> [f32; 2] {
    [point.x as f32, point.y as f32]
}

pub fn record(
    trajectory: &Trajectory,
    landmark: &PointCoordinates,
    mode: RerunMode,
    rrd_path: &Path,
) -> Result<()> {
    let builder = rerun::RecordingStreamBuilder::new("bev_trajectory");
    let rec = match mode {
        RerunMode::Off => return Ok(()),
        RerunMode::Spawn => builder.spawn().context("failed to spawn rerun viewer")?,
        RerunMode::Save => builder
            .save(rrd_path)
            .with_context(|| format!("failed to create {}", rrd_path.display()))?,
    };

    log_static(&rec, trajectory, landmark)?;
    log_frames(&rec, trajectory, landmark)?;
    rec.flush_blocking();

    if mode == RerunMode::Save {
        log::info!("recording written to {}", rrd_path.display());
    }
    Ok(())
}

fn log_static(
    rec: &RecordingStream,
    trajectory: &Trajectory,
    landmark: &PointCoordinates,
) -> Result<()> {
    rec.log_static(
        "ground/landmark",
        &rerun::Points2D::new([planar(landmark)])
            .with_colors([rerun::Color::from_rgb(255, 210, 0)])
            .with_radii([0.6])
            .with_labels(["traffic light"]),
    )?;

    let path: Vec<[f32; 2]> = trajectory
        .points()
        .iter()
        .map(|p| planar(&p.position_ground))
        .collect();
    rec.log_static(
        "ground/path",
        &rerun::LineStrips2D::new([rerun::components::LineStrip2D::from_iter(path)])
            .with_colors([rerun::Color::from_rgb(40, 90, 220)]),
    )?;

    if let (Some(first), Some(last)) = (trajectory.points().first(), trajectory.points().last()) {
        rec.log_static(
            "ground/start",
            &rerun::Points2D::new([planar(&first.position_ground)])
                .with_colors([rerun::Color::from_rgb(0, 180, 0)])
                .with_radii([0.4])
                .with_labels(["start"]),
        )?;
        rec.log_static(
            "ground/end",
            &rerun::Points2D::new([planar(&last.position_ground)])
                .with_colors([rerun::Color::from_rgb(220, 0, 0)])
                .with_radii([0.4])
                .with_labels(["end"]),
        )?;
    }
    Ok(())
}

fn log_frames(
    rec: &RecordingStream,
    trajectory: &Trajectory,
    landmark: &PointCoordinates,
) -> Result<()> {
    let mut trail = Vec::with_capacity(trajectory.len());
    for point in trajectory.points() {
        rec.set_time_sequence("frame", point.frame_id as i64);

        let position = planar(&point.position_ground);
        trail.push(position);
        rec.log("ground/ego", &rerun::Points2D::new([position]).with_radii([0.3]))?;
        rec.log(
            "ground/trail",
            &rerun::LineStrips2D::new([rerun::components::LineStrip2D::from_iter(
                trail.iter().copied(),
            )]),
        )?;

        let offset = point.position_ground - landmark;
        rec.log(
            "plots/distance_m",
            &rerun::Scalar::new(offset.x.hypot(offset.y)),
        )?;
    }
    Ok(())
}
