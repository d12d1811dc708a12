//! Wire format constants and layout helpers
//!
//! Every structure starts with a 32-bit header word whose fixed bits
//! identify it (magic under a mask) and whose low bits carry 2-bit type
//! codes for the regions that follow:
//!
//! ```text
//! Mapping  0xF00D1000 | keyContent<<8 | keySize<<6 | rangeSize<<4 | valueContent<<2 | valueSize
//! Listing  0xF00D2000 | content<<2 | size
//! Index    0xF00DBA5E
//! ```
//!
//! All regions are padded with zero bytes to a multiple of four, so every
//! structure is a whole number of 32-bit words.

pub mod stats;
pub mod writer;

pub use stats::{ContentStats, SizeStats};
pub use writer::WordWriter;

use crate::error::{Error, Result};
use crate::sequence::{ByteOrder, Width};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const MAPPING_MAGIC: u32 = 0xF00D_1000;
pub const MAPPING_MASK: u32 = 0xFFFF_FC00;
pub const LISTING_MAGIC: u32 = 0xF00D_2000;
pub const LISTING_MASK: u32 = 0xFFFF_FFF0;
pub const INDEX_MAGIC: u32 = 0xF00D_BA5E;
pub const INDEX_MASK: u32 = 0xFFFF_FFFF;

/// Largest count, length or offset the format can express
pub const MAX_COUNT: u32 = 0x3FFF_FFFF;

/// Largest bucket mask of a hashed mapping
pub const MAX_RANGE_MASK: u32 = 0x1FFF_FFFF;

/// Round `len` up to the next multiple of four
#[inline]
pub const fn byte_align(len: usize) -> usize {
    (len + 3) & !3
}

/// Bucket mask for a hashed mapping with `count` entries: the smallest
/// `2^k - 1` (k >= 1) with `2^k >= count`, limited to 29 bits
pub fn range_mask_for(count: usize) -> u32 {
    let mut result: usize = 2;
    while result < count {
        result <<= 1;
    }
    ((result - 1) as u32) & MAX_RANGE_MASK
}

/// Kind of an encoded structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Mapping,
    Listing,
    Index,
}

impl Format {
    pub const fn magic(self) -> u32 {
        match self {
            Format::Mapping => MAPPING_MAGIC,
            Format::Listing => LISTING_MAGIC,
            Format::Index => INDEX_MAGIC,
        }
    }

    pub const fn mask(self) -> u32 {
        match self {
            Format::Mapping => MAPPING_MASK,
            Format::Listing => LISTING_MASK,
            Format::Index => INDEX_MASK,
        }
    }

    /// Whether a header word carries this format's magic
    pub const fn matches(self, header: u32) -> bool {
        header & self.mask() == self.magic()
    }

    /// Format of a header word, if any
    pub fn from_header(header: u32) -> Option<Self> {
        [Format::Index, Format::Listing, Format::Mapping]
            .into_iter()
            .find(|format| format.matches(header))
    }

    /// Detect the format and byte order of an encoded buffer
    ///
    /// The native order is tried first, so a buffer that happens to match
    /// in both orders resolves to the native one.
    pub fn detect(bytes: &[u8]) -> Option<(Format, ByteOrder)> {
        let native = ByteOrder::native();
        for order in [native, native.swapped()] {
            if let Some(format) = order.read_u32(bytes, 0).and_then(Format::from_header) {
                return Some((format, order));
            }
        }
        warn!(len = bytes.len(), "Buffer does not start with a known header");
        None
    }

    /// Like [`Format::detect`], but only accepts `self`
    pub fn detect_order(self, bytes: &[u8]) -> Result<ByteOrder> {
        match Format::detect(bytes) {
            Some((format, order)) if format == self => Ok(order),
            Some((format, _)) => Err(Error::InvalidHeader(format!(
                "expected {} header, found {}",
                self, format
            ))),
            None => Err(Error::InvalidHeader(format!("no {} header", self))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Mapping => write!(f, "mapping"),
            Format::Listing => write!(f, "listing"),
            Format::Index => write!(f, "index"),
        }
    }
}

/// Decoded type codes of a listing header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingHeader {
    pub content: Width,
    /// `None` when all items share one length
    pub size: Option<Width>,
}

impl ListingHeader {
    pub fn to_word(self) -> u32 {
        LISTING_MAGIC | self.content.code() << 2 | size_code(self.size)
    }

    pub fn from_word(header: u32) -> Result<Self> {
        if !Format::Listing.matches(header) {
            return Err(Error::InvalidHeader(format!("{:#010X} is not a listing header", header)));
        }
        Ok(Self {
            content: content_width(header >> 2)?,
            size: Width::from_code(header & 3),
        })
    }
}

/// Decoded type codes of a mapping header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingHeader {
    pub key_content: Width,
    pub key_size: Option<Width>,
    /// `None` for sorted mappings, which carry no bucket table
    pub range_size: Option<Width>,
    pub value_content: Width,
    pub value_size: Option<Width>,
}

impl MappingHeader {
    pub fn to_word(self) -> u32 {
        MAPPING_MAGIC
            | self.key_content.code() << 8
            | size_code(self.key_size) << 6
            | size_code(self.range_size) << 4
            | self.value_content.code() << 2
            | size_code(self.value_size)
    }

    pub fn from_word(header: u32) -> Result<Self> {
        if !Format::Mapping.matches(header) {
            return Err(Error::InvalidHeader(format!("{:#010X} is not a mapping header", header)));
        }
        Ok(Self {
            key_content: content_width(header >> 8)?,
            key_size: Width::from_code((header >> 6) & 3),
            range_size: Width::from_code((header >> 4) & 3),
            value_content: content_width(header >> 2)?,
            value_size: Width::from_code(header & 3),
        })
    }
}

fn size_code(width: Option<Width>) -> u32 {
    width.map_or(0, Width::code)
}

fn content_width(bits: u32) -> Result<Width> {
    Width::from_code(bits & 3)
        .ok_or_else(|| Error::InvalidHeader("content type 0 is not allowed".to_string()))
}

/// Check a count against [`MAX_COUNT`] at encode time
pub(crate) fn check_count(what: &str, count: usize) -> Result<u32> {
    if count > MAX_COUNT as usize {
        return Err(Error::Value(format!(
            "{} {} exceeds the limit of {}",
            what, count, MAX_COUNT
        )));
    }
    Ok(count as u32)
}
