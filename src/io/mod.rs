//! Reading and writing encoded structures on disk

pub mod compression;
pub mod file;

pub use compression::{CompressionAlgorithm, CompressionStats};
pub use file::{write_index, IndexFile};
