//! Optional compression of stored index files
//!
//! Encoded structures are only zero-copy while uncompressed; a compressed
//! file is inflated into a heap buffer on open.

use crate::error::{Error, Result};
use crate::format::Format;
use crate::sequence::ByteOrder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// First bytes of a zstd frame
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compression algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    #[default]
    None,
    Zstd,
}

impl CompressionAlgorithm {
    /// Algorithm a stored buffer was written with, judged by its first bytes
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&ZSTD_MAGIC) {
            CompressionAlgorithm::Zstd
        } else {
            CompressionAlgorithm::None
        }
    }
}

/// Storage form of an encoded structure
///
/// The buffer must start with a known header; its format and byte order are
/// recorded in the returned stats. Out-of-range zstd levels are clamped.
pub fn compress(
    encoded: &[u8],
    algorithm: CompressionAlgorithm,
    level: i32,
) -> Result<(Vec<u8>, CompressionStats)> {
    let (format, order) = Format::detect(encoded).ok_or_else(|| {
        Error::Value("refusing to store a buffer without a known header".to_string())
    })?;
    let stored = match algorithm {
        CompressionAlgorithm::None => encoded.to_vec(),
        CompressionAlgorithm::Zstd => zstd::bulk::compress(encoded, clamp_level(level))
            .map_err(|e| Error::Compression(format!("Failed to compress {}: {}", format, e)))?,
    };

    let stats = CompressionStats {
        format,
        order,
        algorithm,
        encoded_size: encoded.len(),
        stored_size: stored.len(),
    };
    debug!(
        format = %format,
        order = %order,
        encoded = stats.encoded_size,
        stored = stats.stored_size,
        "Prepared encoded structure for storage"
    );
    Ok((stored, stats))
}

fn clamp_level(level: i32) -> i32 {
    let range = zstd::compression_level_range();
    if range.contains(&level) {
        return level;
    }
    let clamped = level.clamp(*range.start(), *range.end());
    warn!(level, clamped, "zstd level out of range");
    clamped
}

/// Inflate a zstd frame and check that it holds an encoded structure
pub fn decompress(stored: &[u8]) -> Result<Vec<u8>> {
    let data = zstd::stream::decode_all(stored)
        .map_err(|e| Error::Compression(format!("Failed to decompress: {}", e)))?;
    if Format::detect(&data).is_none() {
        return Err(Error::InvalidHeader(
            "compressed payload does not start with a known header".to_string(),
        ));
    }
    Ok(data)
}

/// What [`compress`] stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionStats {
    pub format: Format,
    pub order: ByteOrder,
    pub algorithm: CompressionAlgorithm,
    /// Length of the encoded structure
    pub encoded_size: usize,
    /// Length written to storage
    pub stored_size: usize,
}

impl CompressionStats {
    /// Stored size relative to the encoded size
    pub fn ratio(&self) -> f64 {
        if self.encoded_size == 0 {
            return 1.0;
        }
        self.stored_size as f64 / self.encoded_size as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{Encode, IndexBuilder, ListingBuilder, MappingBuilder};
    use crate::model::MappingMode;
    use crate::sequence::NumericSequence;

    fn encoded_index(order: ByteOrder) -> Result<Vec<u8>> {
        let mut mapping = MappingBuilder::new(MappingMode::Hashed);
        let mut listing = ListingBuilder::new();
        for i in 0..200 {
            mapping.put(&NumericSequence::from([i, i + 1]), &NumericSequence::from([i % 3]))?;
            listing.put(&NumericSequence::from([i % 10, i % 7]))?;
        }
        let mut index = IndexBuilder::new();
        index.put_mapping(mapping)?;
        index.put_listing(listing)?;
        index.encode(order)
    }

    #[test]
    fn test_store_uncompressed() -> Result<()> {
        let encoded = encoded_index(ByteOrder::Big)?;
        let (stored, stats) = compress(&encoded, CompressionAlgorithm::None, 3)?;
        assert_eq!(stored, encoded);
        assert_eq!(CompressionAlgorithm::detect(&stored), CompressionAlgorithm::None);
        assert_eq!((stats.format, stats.order), (Format::Index, ByteOrder::Big));
        assert_eq!(stats.ratio(), 1.0);
        Ok(())
    }

    #[test]
    fn test_zstd_keeps_header_detectable() -> Result<()> {
        let encoded = encoded_index(ByteOrder::Little)?;
        let (stored, stats) = compress(&encoded, CompressionAlgorithm::Zstd, 3)?;
        assert_eq!(CompressionAlgorithm::detect(&stored), CompressionAlgorithm::Zstd);
        assert_eq!(Format::detect(&stored), None);
        assert_eq!(stats.stored_size, stored.len());
        assert!(stats.ratio() < 1.0);

        let inflated = decompress(&stored)?;
        assert_eq!(inflated, encoded);
        assert_eq!(Format::detect(&inflated), Some((Format::Index, ByteOrder::Little)));
        Ok(())
    }

    #[test]
    fn test_level_is_clamped() -> Result<()> {
        let encoded = encoded_index(ByteOrder::Big)?;
        let (stored, _) = compress(&encoded, CompressionAlgorithm::Zstd, 1000)?;
        assert_eq!(decompress(&stored)?, encoded);
        Ok(())
    }

    #[test]
    fn test_rejects_foreign_payloads() -> Result<()> {
        assert!(matches!(
            compress(&[1, 2, 3, 4], CompressionAlgorithm::Zstd, 3),
            Err(Error::Value(_))
        ));

        let foreign = zstd::bulk::compress(b"not an index", 3)?;
        assert!(matches!(decompress(&foreign), Err(Error::InvalidHeader(_))));
        Ok(())
    }
}
