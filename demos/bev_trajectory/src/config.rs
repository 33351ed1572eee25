use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use egotraj_core::CameraConvention;
use landmark_odometry::TrajectoryEstimatorCfg;
use serde::Deserialize;

/// Settings of one run, read from an optional TOML file.
///
/// ```toml
/// dataset = "dataset"
///
/// [camera]
/// width = 1920
/// height = 1200
/// convention = "forward_right_down"
///
/// [estimator]
/// anchor = "reference"
/// jump_warning_m = 5.0
///
/// [estimator.depth]
/// window_size = 5
///
/// [output]
/// dir = "out"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub dataset: PathBuf,
    /// Bounding box CSV; `<dataset>/bbox_light.csv` when unset.
    pub bbox_file: Option<PathBuf>,
    pub camera: CameraCfg,
    pub estimator: TrajectoryEstimatorCfg,
    pub output: OutputCfg,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("dataset"),
            bbox_file: None,
            camera: CameraCfg::default(),
            estimator: TrajectoryEstimatorCfg::default(),
            output: OutputCfg::default(),
        }
    }
}

/// Image size used for the bounds check. Taken from the first point array
/// when not given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraCfg {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub convention: CameraConvention,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputCfg {
    pub dir: PathBuf,
    pub trajectory_csv: String,
    /// Also write gap-filled positions with an `interpolated` column.
    pub filled_csv: Option<String>,
    pub recording: String,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            trajectory_csv: "trajectory.csv".to_owned(),
            filled_csv: None,
            recording: "trajectory.rrd".to_owned(),
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn bbox_path(&self) -> PathBuf {
        self.bbox_file
            .clone()
            .unwrap_or_else(|| self.dataset.join(egotraj_dataset_reader::SequenceReader::BBOX_FILE))
    }
}
