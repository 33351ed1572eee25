use std::fs::File;
use std::path::{Path, PathBuf};

use egotraj_core::{Dataset, FrameId, Lookup};
use egotraj_sensor::{PointArray, PointArrayError};
use ndarray::{Array3, Ix3, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};
use thiserror::Error;

/// Array names tried in order before falling back to the first array.
const PREFERRED_ARRAYS: [&str; 2] = ["xyz", "points"];

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("npz error: {0}")]
    Npz(#[from] ReadNpzError),
    #[error("npz archive contains no arrays")]
    EmptyArchive,
    #[error("bad point array: {0}")]
    Shape(#[from] PointArrayError),
}

/// Per-frame organized point clouds stored as `depth{frame_id:06}.npz`.
#[derive(Debug, Clone)]
pub struct NpzPointArrays {
    dir: PathBuf,
}

impl NpzPointArrays {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, frame_id: FrameId) -> PathBuf {
        self.dir.join(file_name(frame_id))
    }
}

impl Dataset<PointArray> for NpzPointArrays {
    fn get(&self, frame_id: FrameId) -> Lookup<PointArray> {
        let path = self.path_for(frame_id);
        if !path.is_file() {
            log::debug!("no point array for frame {frame_id} at {}", path.display());
            return Lookup::Absent;
        }

        match load_point_array(&path) {
            Ok(points) => Lookup::Present(points),
            Err(e) => {
                log::warn!("failed to load {}: {e}", path.display());
                Lookup::Malformed(e.to_string())
            }
        }
    }

    fn frame_ids(&self) -> Vec<FrameId> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut frame_ids: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| parse_file_name(&e.file_name().to_string_lossy()))
            .collect();
        frame_ids.sort_unstable();
        frame_ids
    }
}

pub fn file_name(frame_id: FrameId) -> String {
    format!("depth{frame_id:06}.npz")
}

fn parse_file_name(name: &str) -> Option<FrameId> {
    name.strip_prefix("depth")?
        .strip_suffix(".npz")?
        .parse()
        .ok()
}

/// Reads the point cloud of one `.npz` archive, widening `f32` data to `f64`.
pub fn load_point_array(path: &Path) -> Result<PointArray, ReaderError> {
    let mut npz = NpzReader::new(File::open(path)?)?;
    let names = npz.names()?;
    let name = pick_array(&names).ok_or(ReaderError::EmptyArchive)?;

    let data: Array3<f64> = match npz.by_name::<OwnedRepr<f64>, Ix3>(&name) {
        Ok(data) => data,
        Err(f64_err) => match npz.by_name::<OwnedRepr<f32>, Ix3>(&name) {
            Ok(data) => data.mapv(f64::from),
            Err(_) => return Err(f64_err.into()),
        },
    };

    Ok(PointArray::new(data)?)
}

fn pick_array(names: &[String]) -> Option<String> {
    let stem = |name: &String| name.strip_suffix(".npy").unwrap_or(name).to_string();
    PREFERRED_ARRAYS
        .iter()
        .find_map(|preferred| names.iter().find(|name| stem(*name) == *preferred))
        .or_else(|| names.first())
        .cloned()
}
