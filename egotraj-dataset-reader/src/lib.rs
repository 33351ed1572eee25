pub mod bbox_reader;
pub mod npz_reader;
pub mod sequence_reader;

pub use bbox_reader::BoundingBoxCsv;
pub use npz_reader::{NpzPointArrays, ReaderError};
pub use sequence_reader::SequenceReader;
