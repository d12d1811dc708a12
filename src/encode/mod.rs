//! Builders that accumulate sequences and serialize them
//!
//! ```text
//! put(seq) ──→ UniquePool (compact copy, dedup) ──→ encode(order)
//!                                                    ├─ SizeStats    (lengths)
//!                                                    ├─ ContentStats (values)
//!                                                    └─ WordWriter   (padded regions)
//! ```
//!
//! Encoding does not consume the builder; the same builder encodes to
//! byte-identical output for the same byte order every time.

pub mod index;
pub mod listing;
pub mod mapping;
pub mod pool;

pub use index::IndexBuilder;
pub use listing::ListingBuilder;
pub use mapping::MappingBuilder;
pub use pool::UniquePool;

use crate::error::Result;
use crate::sequence::ByteOrder;

/// Serialization into the binary layout
pub trait Encode {
    /// Encode into a fresh buffer using `order` for every word and table
    fn encode(&self, order: ByteOrder) -> Result<Vec<u8>>;

    /// Encode in the byte order of the running platform
    fn encode_native(&self) -> Result<Vec<u8>> {
        self.encode(ByteOrder::native())
    }
}
