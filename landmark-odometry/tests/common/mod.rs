//! In-memory collaborators and synthetic scenes for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use egotraj_core::frame::BoundingBox;
use egotraj_core::{Dataset, FrameId, Lookup, PointCoordinates};
use egotraj_sensor::{DepthCamera, PointArray};
use sophus::image::ImageSize;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 48;

pub struct MemoryDataset<I> {
    entries: BTreeMap<FrameId, Lookup<I>>,
}

impl<I> Default for MemoryDataset<I> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<I: Clone + Send + Sync> MemoryDataset<I> {
    pub fn insert(&mut self, frame_id: FrameId, entry: Lookup<I>) {
        self.entries.insert(frame_id, entry);
    }
}

impl<I: Clone + Send + Sync> Dataset<I> for MemoryDataset<I> {
    fn get(&self, frame_id: FrameId) -> Lookup<I> {
        self.entries.get(&frame_id).cloned().unwrap_or(Lookup::Absent)
    }

    fn frame_ids(&self) -> Vec<FrameId> {
        match (self.entries.keys().next(), self.entries.keys().next_back()) {
            (Some(first), Some(last)) => (*first..=*last).collect(),
            _ => Vec::new(),
        }
    }
}

pub type Boxes = MemoryDataset<BoundingBox>;
pub type Clouds = MemoryDataset<PointArray>;

pub fn camera() -> DepthCamera {
    DepthCamera::new(ImageSize::new(WIDTH, HEIGHT))
}

/// 2x2 box whose center is pixel `(u, v)`.
pub fn box_around(u: usize, v: usize) -> BoundingBox {
    BoundingBox::new(u as f64 - 1.0, v as f64 - 1.0, u as f64 + 1.0, v as f64 + 1.0)
}

/// Cloud with no returns except `point` at `(row, col)`.
pub fn cloud_with(row: usize, col: usize, point: PointCoordinates) -> PointArray {
    let mut cloud = PointArray::from_fn(HEIGHT, WIDTH, |_, _| [0.0, 0.0, 0.0]);
    cloud.set(row, col, [point.x, point.y, point.z]);
    cloud
}

/// Frame `frame_id` sees the landmark at `camera_point`, detected at pixel
/// `(u, v)`.
pub fn observe(
    boxes: &mut Boxes,
    clouds: &mut Clouds,
    frame_id: FrameId,
    (u, v): (usize, usize),
    camera_point: PointCoordinates,
) {
    boxes.insert(frame_id, Lookup::Present(box_around(u, v)));
    clouds.insert(frame_id, Lookup::Present(cloud_with(v, u, camera_point)));
}

/// Landmark position as seen by a forward-right-down camera at `position`
/// whose axes are aligned with a forward-left-up world.
pub fn seen_from(position: PointCoordinates, landmark: PointCoordinates) -> PointCoordinates {
    let d = landmark - position;
    PointCoordinates::new(d.x, -d.y, -d.z)
}
