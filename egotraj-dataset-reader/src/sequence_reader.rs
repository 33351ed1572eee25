use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::bbox_reader::BoundingBoxCsv;
use crate::npz_reader::NpzPointArrays;

/// One recorded drive:
///
/// ```text
/// <root>/bbox_light.csv   landmark box per frame
/// <root>/xyz/depthNNNNNN.npz  organized point cloud per frame
/// <root>/rgb/*.png        camera frames (only counted)
/// ```
pub struct SequenceReader {
    dataset_path: PathBuf,
    boxes: Option<BoundingBoxCsv>,
    points: NpzPointArrays,
}

impl SequenceReader {
    pub const BBOX_FILE: &'static str = "bbox_light.csv";
    pub const XYZ_DIR: &'static str = "xyz";
    pub const RGB_DIR: &'static str = "rgb";

    pub fn new<P: AsRef<Path>>(dataset_path: P) -> Self {
        let dataset_path = dataset_path.as_ref().to_path_buf();
        SequenceReader {
            points: NpzPointArrays::new(dataset_path.join(Self::XYZ_DIR)),
            dataset_path,
            boxes: None,
        }
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn load_bounding_boxes(&mut self) -> Result<&BoundingBoxCsv> {
        self.load_bounding_boxes_from(self.dataset_path.join(Self::BBOX_FILE))
    }

    /// Same as [`SequenceReader::load_bounding_boxes`] for a CSV stored
    /// outside the dataset directory.
    pub fn load_bounding_boxes_from<P: AsRef<Path>>(&mut self, path: P) -> Result<&BoundingBoxCsv> {
        let boxes = BoundingBoxCsv::from_path(path.as_ref())
            .context("Failed to load landmark bounding boxes")?;
        Ok(&*self.boxes.insert(boxes))
    }

    pub fn get_bounding_boxes(&self) -> Option<&BoundingBoxCsv> {
        self.boxes.as_ref()
    }

    pub fn get_point_arrays(&self) -> &NpzPointArrays {
        &self.points
    }

    /// Number of `.png` frames under `rgb/`, zero if the directory is missing.
    pub fn count_rgb_frames(&self) -> usize {
        count_files_with_extension(&self.dataset_path.join(Self::RGB_DIR), "png")
    }

    /// Number of `.npz` clouds under `xyz/`.
    pub fn count_xyz_frames(&self) -> usize {
        count_files_with_extension(&self.dataset_path.join(Self::XYZ_DIR), "npz")
    }
}

fn count_files_with_extension(dir: &Path, extension: &str) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.path()
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
                })
                .count()
        })
        .unwrap_or(0)
}
