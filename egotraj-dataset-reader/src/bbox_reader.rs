use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use egotraj_core::frame::BoundingBox;
use egotraj_core::{Dataset, FrameId, Lookup};

const FRAME_COLUMNS: [&str; 2] = ["frame_id", "frame"];
/// Frame ids further apart than this point at a typo, not a recording.
pub const MAX_FRAME_SPAN: FrameId = 10_000_000;
const COORD_COLUMNS: [(&str, &str); 4] = [
    ("x_min", "x1"),
    ("y_min", "y1"),
    ("x_max", "x2"),
    ("y_max", "y2"),
];

/// Landmark detections, one CSV row per frame.
///
/// Frame ids come from a `frame_id` column when there is one and from the
/// data row index otherwise. Frames between the first and the last row that
/// have no row of their own read as [`Lookup::Absent`].
///
/// A row with unreadable coordinates is kept as [`Lookup::Malformed`] under
/// its frame id. A row whose frame id itself cannot be read belongs to no
/// frame; it is logged and dropped, so its frame reads as absent.
#[derive(Debug, Default)]
pub struct BoundingBoxCsv {
    entries: BTreeMap<FrameId, Lookup<BoundingBox>>,
}

impl BoundingBoxCsv {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let frame_column = find_column(&headers, &FRAME_COLUMNS);
        let mut coord_columns = [0usize; 4];
        for (slot, (name, alias)) in coord_columns.iter_mut().zip(COORD_COLUMNS) {
            *slot = match find_column(&headers, &[name, alias]) {
                Some(index) => index,
                None => bail!("bounding box CSV has no `{name}` (or `{alias}`) column"),
            };
        }

        let mut entries = BTreeMap::new();
        for (row_index, rec) in rdr.byte_records().enumerate() {
            let row_index = row_index as FrameId;
            let rec = match (rec, frame_column) {
                (Ok(rec), _) => rec,
                (Err(e), None) => {
                    log::warn!("bounding box row {row_index}: {e}");
                    insert_entry(&mut entries, row_index, Lookup::Malformed(e.to_string()));
                    continue;
                }
                (Err(e), Some(_)) => {
                    log::warn!("dropping bounding box row {row_index}: {e}");
                    continue;
                }
            };

            let frame_id = match frame_column {
                Some(column) => match field(&rec, column, "frame_id").and_then(parse_frame_id) {
                    Ok(frame_id) => frame_id,
                    Err(why) => {
                        log::warn!("dropping bounding box row {row_index}: {why}");
                        continue;
                    }
                },
                None => row_index,
            };

            let entry = match parse_box(&rec, &coord_columns) {
                Ok(bbox) => Lookup::Present(bbox),
                Err(why) => {
                    log::warn!("bounding box for frame {frame_id} is malformed: {why}");
                    Lookup::Malformed(why)
                }
            };
            insert_entry(&mut entries, frame_id, entry);
        }

        if let (Some(first), Some(last)) = (entries.keys().next(), entries.keys().next_back()) {
            if last - first >= MAX_FRAME_SPAN {
                bail!(
                    "frame ids run from {first} to {last}, more than {MAX_FRAME_SPAN} frames apart"
                );
            }
        }

        log::info!("loaded {} bounding box rows", entries.len());
        Ok(Self { entries })
    }
}

impl Dataset<BoundingBox> for BoundingBoxCsv {
    fn get(&self, frame_id: FrameId) -> Lookup<BoundingBox> {
        self.entries.get(&frame_id).cloned().unwrap_or(Lookup::Absent)
    }

    fn frame_ids(&self) -> Vec<FrameId> {
        match (self.entries.keys().next(), self.entries.keys().next_back()) {
            (Some(first), Some(last)) => (*first..=*last).collect(),
            _ => Vec::new(),
        }
    }
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|name| h.eq_ignore_ascii_case(name)))
}

fn parse_frame_id(field: &str) -> Result<FrameId, String> {
    if let Ok(frame_id) = field.parse::<FrameId>() {
        return Ok(frame_id);
    }
    // pandas round-trips integer columns with NaNs as floats
    match field.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 => Ok(value as FrameId),
        _ => Err(format!("{field:?} is not a frame id")),
    }
}

fn field<'r>(rec: &'r ByteRecord, column: usize, name: &str) -> Result<&'r str, String> {
    let bytes = rec.get(column).ok_or_else(|| format!("missing `{name}`"))?;
    std::str::from_utf8(bytes).map_err(|_| format!("`{name}` is not valid UTF-8"))
}

fn parse_box(rec: &ByteRecord, columns: &[usize; 4]) -> Result<BoundingBox, String> {
    let mut coords = [0.0f64; 4];
    for ((value, column), (name, _)) in coords.iter_mut().zip(columns).zip(COORD_COLUMNS) {
        let text = field(rec, *column, name)?;
        *value = text
            .parse()
            .map_err(|_| format!("`{name}` = {text:?} is not numeric"))?;
    }
    Ok(BoundingBox::new(coords[0], coords[1], coords[2], coords[3]))
}

fn insert_entry(
    entries: &mut BTreeMap<FrameId, Lookup<BoundingBox>>,
    frame_id: FrameId,
    entry: Lookup<BoundingBox>,
) {
    if entries.contains_key(&frame_id) {
        log::warn!("duplicate bounding box row for frame {frame_id}, keeping the first");
        return;
    }
    entries.insert(frame_id, entry);
}
