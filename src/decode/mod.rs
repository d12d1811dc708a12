//! Zero-copy views over encoded structures
//!
//! ```text
//! &'a [u8] / Bytes ──→ WordReader ──→ header, counts
//!                                   ├─→ OffsetTable (validated)
//!                                   └─→ Items: sizes + packed values
//!                                          └─→ item(i) = values.section(..)
//! ```
//!
//! Parsing validates the whole buffer before a view is returned; a failed
//! parse never yields a partial object. Views are immutable afterwards and
//! can be shared across threads.

mod reader;
mod table;

pub mod index;
pub mod listing;
pub mod mapping;

pub use index::IndexView;
pub use listing::ListingView;
pub use mapping::MappingView;

use crate::error::{Error, Result};
use crate::format::Format;

/// Any decoded structure, as found by header sniffing
pub enum Decoded<'a> {
    Mapping(MappingView<'a>),
    Listing(ListingView<'a>),
    Index(IndexView<'a>),
}

impl<'a> Decoded<'a> {
    pub fn format(&self) -> Format {
        match self {
            Decoded::Mapping(_) => Format::Mapping,
            Decoded::Listing(_) => Format::Listing,
            Decoded::Index(_) => Format::Index,
        }
    }
}

/// Detect the format and byte order of `bytes` and parse it
pub fn decode_any(bytes: &[u8]) -> Result<Decoded<'_>> {
    let (format, order) = Format::detect(bytes)
        .ok_or_else(|| Error::InvalidHeader("buffer does not start with a known header".to_string()))?;
    Ok(match format {
        Format::Mapping => Decoded::Mapping(MappingView::decode(bytes, order)?),
        Format::Listing => Decoded::Listing(ListingView::decode(bytes, order)?),
        Format::Index => Decoded::Index(IndexView::decode(bytes, order)?),
    })
}
