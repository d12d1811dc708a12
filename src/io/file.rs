//! Index files on disk
//!
//! ```text
//! IndexFile::open(path)
//!   ├─→ zstd frame?  decompress ──→ Heap(Bytes)
//!   ├─→ empty file                ──→ Heap(Bytes)
//!   └─→ otherwise    mmap         ──→ Mapped(Mmap)
//!
//! file.index() ──→ IndexView<'_>   (borrows the file, cannot outlive it)
//! ```

use super::compression::{compress, decompress, CompressionAlgorithm, CompressionStats};
use crate::config::CodecConfig;
use crate::decode::{decode_any, Decoded, IndexView};
use crate::error::Result;
use crate::format::Format;
use crate::sequence::ByteOrder;
use bytes::Bytes;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Unique suffix for temporary files written by this process
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

enum Backing {
    Mapped(memmap2::Mmap),
    Heap(Bytes),
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            Backing::Mapped(mmap) => mmap.as_ref(),
            Backing::Heap(bytes) => bytes.as_ref(),
        }
    }
}

/// Holder of an encoded buffer read from disk or memory
///
/// Views parsed from the holder borrow it, so the mapping stays alive for as
/// long as any sequence read from it.
pub struct IndexFile {
    path: Option<PathBuf>,
    backing: Backing,
    compression: CompressionAlgorithm,
}

impl IndexFile {
    /// Open a file, memory-mapping it unless it is compressed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();

        let mut magic = [0u8; 4];
        let head = if len >= 4 {
            use std::io::Read;
            (&file).read_exact(&mut magic)?;
            &magic[..]
        } else {
            &[][..]
        };
        let compression = CompressionAlgorithm::detect(head);

        let backing = match compression {
            CompressionAlgorithm::Zstd => {
                let raw = std::fs::read(path)?;
                let data = decompress(&raw)?;
                debug!(
                    path = %path.display(),
                    compressed = raw.len(),
                    inflated = data.len(),
                    "Inflated compressed index file"
                );
                Backing::Heap(Bytes::from(data))
            }
            CompressionAlgorithm::None if len == 0 => Backing::Heap(Bytes::new()),
            CompressionAlgorithm::None => {
                // SAFETY: index files are written once (temp file + rename) and
                // never modified in place while mapped.
                let mmap = unsafe { memmap2::Mmap::map(&file)? };
                Backing::Mapped(mmap)
            }
        };

        info!(
            path = %path.display(),
            bytes = backing.bytes().len(),
            mapped = matches!(backing, Backing::Mapped(_)),
            "Opened index file"
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            backing,
            compression,
        })
    }

    /// Hold an in-memory buffer, inflating it if it is a zstd frame
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        let compression = CompressionAlgorithm::detect(&bytes);
        let bytes = match compression {
            CompressionAlgorithm::Zstd => Bytes::from(decompress(&bytes)?),
            CompressionAlgorithm::None => bytes,
        };
        Ok(Self {
            path: None,
            backing: Backing::Heap(bytes),
            compression,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        self.backing.bytes()
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    /// Compression the file was stored with
    pub fn compression(&self) -> CompressionAlgorithm {
        self.compression
    }

    /// Format and byte order of the held buffer
    pub fn detect(&self) -> Option<(Format, ByteOrder)> {
        Format::detect(self.bytes())
    }

    /// Parse the buffer as an index
    pub fn index(&self) -> Result<IndexView<'_>> {
        IndexView::from_bytes(self.bytes())
    }

    /// Parse the buffer as whatever structure its header announces
    pub fn decode(&self) -> Result<Decoded<'_>> {
        decode_any(self.bytes())
    }
}

/// Write an encoded structure to `path`, compressing it as configured
///
/// The data goes to a temporary file next to `path` that is synced and
/// then renamed over the target, so readers never see a partial file.
pub fn write_index<P: AsRef<Path>>(path: P, bytes: &[u8], config: &CodecConfig) -> Result<CompressionStats> {
    let path = path.as_ref();
    let (data, stats) = compress(bytes, config.compression, config.compression_level)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(format!(
        "tmp.{}.{}",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let result = (|| -> Result<()> {
        use std::io::Write;
        let mut file = File::create(&tmp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result?;

    info!(
        path = %path.display(),
        format = %stats.format,
        bytes = stats.stored_size,
        compression = ?stats.algorithm,
        "Wrote index file"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::encode::{Encode, IndexBuilder, ListingBuilder};
    use crate::sequence::NumericSequence;

    fn test_dir(name: &str) -> Result<PathBuf> {
        let dir = std::env::temp_dir().join(format!("iam_file_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn sample_index() -> Result<Vec<u8>> {
        let mut listing = ListingBuilder::new();
        listing.put(&NumericSequence::from([1, 2, 3]))?;
        let mut index = IndexBuilder::new();
        index.put_listing(listing)?;
        index.encode(ByteOrder::native())
    }

    #[test]
    fn test_open_mapped() -> Result<()> {
        let dir = test_dir("mapped")?;
        let path = dir.join("plain.iam");
        write_index(&path, &sample_index()?, &CodecConfig::default())?;

        let file = IndexFile::open(&path)?;
        assert!(file.is_mapped());
        assert_eq!(file.compression(), CompressionAlgorithm::None);
        let index = file.index()?;
        assert_eq!(index.listing(0).item(0).to_vec(), vec![1, 2, 3]);

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_open_compressed() -> Result<()> {
        let dir = test_dir("zstd")?;
        let path = dir.join("packed.iam.zst");
        let config = CodecConfig {
            compression: CompressionAlgorithm::Zstd,
            ..CodecConfig::default()
        };
        write_index(&path, &sample_index()?, &config)?;

        let file = IndexFile::open(&path)?;
        assert!(!file.is_mapped());
        assert_eq!(file.compression(), CompressionAlgorithm::Zstd);
        assert_eq!(file.detect().map(|(format, _)| format), Some(Format::Index));
        assert_eq!(file.index()?.listing_count(), 1);

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_empty_file_is_rejected_on_parse() -> Result<()> {
        let dir = test_dir("empty")?;
        let path = dir.join("empty.iam");
        std::fs::write(&path, b"")?;

        let file = IndexFile::open(&path)?;
        assert!(file.bytes().is_empty());
        assert!(file.index().is_err());

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_write_rejects_unknown_buffer() {
        let path = std::env::temp_dir().join(format!("iam_file_bad_{}.iam", std::process::id()));
        let err = write_index(&path, &[1, 2, 3, 4], &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Value(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_from_bytes() -> Result<()> {
        let file = IndexFile::from_bytes(sample_index()?)?;
        assert!(file.path().is_none());
        assert!(matches!(file.decode()?, Decoded::Index(_)));
        Ok(())
    }
}
