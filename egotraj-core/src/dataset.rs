use std::iter::Iterator;

use crate::FrameId;

/// Result of asking a collaborator for the data of one frame.
///
/// Missing files, missing rows and rows that fail schema validation are all
/// ordinary outcomes of a lookup, never errors that abort a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<I> {
    Present(I),
    Absent,
    Malformed(String),
}

impl<I> Lookup<I> {
    pub fn present(self) -> Option<I> {
        match self {
            Lookup::Present(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    /// Collapses the lookup, using `absent` or `malformed` as the error.
    pub fn into_result<E>(self, absent: E, malformed: E) -> Result<I, E> {
        match self {
            Lookup::Present(item) => Ok(item),
            Lookup::Absent => Err(absent),
            Lookup::Malformed(_) => Err(malformed),
        }
    }
}

pub struct DatasetIterator<'a, I> {
    current: usize,
    frame_ids: Vec<FrameId>,
    dataset: &'a dyn Dataset<I>,
}

impl<'a, I> DatasetIterator<'a, I> {
    pub fn new<D>(dataset: &'a D) -> Self
    where
        D: Dataset<I>,
    {
        DatasetIterator {
            current: 0,
            frame_ids: dataset.frame_ids(),
            dataset,
        }
    }
}

impl<'a, I> Iterator for DatasetIterator<'a, I> {
    type Item = (FrameId, Lookup<I>);

    fn next(&mut self) -> Option<Self::Item> {
        let frame_id = *self.frame_ids.get(self.current)?;
        self.current += 1;
        Some((frame_id, self.dataset.get(frame_id)))
    }
}

/// Per-frame input collaborator ("read X for frame N").
pub trait Dataset<I>: Send + Sync {
    fn get(&self, frame_id: FrameId) -> Lookup<I>;

    /// Frame ids this source knows about, ascending.
    fn frame_ids(&self) -> Vec<FrameId>;

    fn len(&self) -> usize {
        self.frame_ids().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> DatasetIterator<'_, I>
    where
        Self: Sized,
    {
        DatasetIterator::new(self)
    }
}
