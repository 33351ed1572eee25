mod artifact;
mod config;
mod visualize;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use egotraj_core::{Dataset, Lookup};
use egotraj_dataset_reader::SequenceReader;
use egotraj_sensor::DepthCamera;
use landmark_odometry::Anchor;
use sophus::image::ImageSize;

use crate::config::AppConfig;
use crate::visualize::RerunMode;

/// Bird's-eye view trajectory of the ego vehicle, estimated from a fixed
/// traffic light seen by a depth camera.
#[derive(Parser, Debug)]
#[command(name = "bev_trajectory", version)]
struct Args {
    /// Dataset directory holding `bbox_light.csv` and `xyz/`.
    dataset: Option<PathBuf>,
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Directory the artifacts are written to.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = RerunMode::Save)]
    rerun: RerunMode,
    /// Put the traffic light at the origin instead of the first position.
    #[arg(long)]
    landmark_origin: bool,
    /// Observe frames on a single thread.
    #[arg(long)]
    sequential: bool,
    /// Log filter, e.g. `debug` or `landmark_odometry=trace`. Defaults to
    /// `RUST_LOG`, then `info`.
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(filter: Option<&str>) {
    let mut builder = match filter {
        Some(filter) => {
            let mut builder = env_logger::Builder::new();
            builder.parse_filters(filter);
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")),
    };
    builder.init();
}

fn configure(args: &Args) -> Result<AppConfig> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(dataset) = &args.dataset {
        config.dataset = dataset.clone();
    }
    if let Some(output) = &args.output {
        config.output.dir = output.clone();
    }
    if args.landmark_origin {
        config.estimator = config.estimator.with_anchor(Anchor::Landmark);
    }
    if args.sequential {
        config.estimator = config.estimator.with_parallel(false);
    }
    Ok(config)
}

/// Configured image size, else the shape of the first readable point array.
fn image_size(config: &AppConfig, reader: &SequenceReader) -> Option<ImageSize> {
    if let (Some(width), Some(height)) = (config.camera.width, config.camera.height) {
        return Some(ImageSize::new(width, height));
    }
    let points = reader.get_point_arrays();
    points.frame_ids().into_iter().find_map(|frame_id| match points.get(frame_id) {
        Lookup::Present(cloud) => Some(ImageSize::new(cloud.cols(), cloud.rows())),
        _ => None,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let config = configure(&args)?;
    log::info!("dataset: {}", config.dataset.display());

    let mut reader = SequenceReader::new(&config.dataset);
    let bbox_path = config.bbox_path();
    reader.load_bounding_boxes_from(&bbox_path)?;
    log::info!("found {} RGB frames", reader.count_rgb_frames());
    log::info!("found {} XYZ frames", reader.count_xyz_frames());

    let mut estimator_cfg = config.estimator.clone();
    let image_size = match image_size(&config, &reader) {
        Some(size) => {
            log::info!("image size: {}x{}", size.width, size.height);
            size
        }
        None => {
            log::warn!("image size unknown, detections are not checked against image bounds");
            estimator_cfg = estimator_cfg.with_image_bounds_check(false);
            ImageSize::new(0, 0)
        }
    };
    let camera = DepthCamera::new(image_size).with_convention(config.camera.convention);
    let estimator = estimator_cfg.finalize(camera)?;

    let boxes = reader
        .get_bounding_boxes()
        .context("bounding boxes were not loaded")?;
    let trajectory = estimator.compute(boxes, reader.get_point_arrays())?;

    let summary = trajectory.summary();
    log::info!("total valid frames: {}", summary.valid_frames);
    log::info!("trajectory length: {} points", trajectory.len());
    if let (Some(first), Some(last)) = (trajectory.points().first(), trajectory.points().last()) {
        log::info!(
            "start position: ({:.2}, {:.2})",
            first.position_ground.x,
            first.position_ground.y
        );
        log::info!(
            "end position: ({:.2}, {:.2})",
            last.position_ground.x,
            last.position_ground.y
        );
    }
    log::info!("distance travelled: {:.2} m", trajectory.path_length());

    let output = &config.output;
    std::fs::create_dir_all(&output.dir)
        .with_context(|| format!("failed to create {}", output.dir.display()))?;
    artifact::save_trajectory(&output.dir.join(&output.trajectory_csv), &trajectory)?;
    if let Some(filled) = &output.filled_csv {
        artifact::save_filled(&output.dir.join(filled), &trajectory)?;
    }

    let landmark = trajectory
        .reference()
        .landmark_position(estimator.anchor(), estimator.project_to_ground());
    visualize::record(
        &trajectory,
        &landmark,
        args.rerun,
        &output.dir.join(&output.recording),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("run.toml");
        std::fs::write(&config_path, "dataset = \"from_file\"\n[output]\ndir = \"file_out\"\n").unwrap();

        let args = Args::parse_from([
            "bev_trajectory",
            "from_cli",
            "--config",
            config_path.to_str().unwrap(),
            "--rerun",
            "off",
        ]);
        let config = configure(&args).unwrap();
        assert_eq!(config.dataset, PathBuf::from("from_cli"));
        assert_eq!(config.output.dir, PathBuf::from("file_out"));
        assert_eq!(args.rerun, RerunMode::Off);
    }

    #[test]
    fn configured_image_size_wins() {
        let config = AppConfig::parse("[camera]\nwidth = 640\nheight = 480\n").unwrap();
        let reader = SequenceReader::new("does/not/exist");
        let size = image_size(&config, &reader).unwrap();
        assert_eq!((size.width, size.height), (640, 480));
    }

    #[test]
    fn image_size_is_unknown_without_config_or_data() {
        let reader = SequenceReader::new("does/not/exist");
        assert!(image_size(&AppConfig::default(), &reader).is_none());
    }
}
