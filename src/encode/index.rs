//! Index assembly
//!
//! An index bundles mappings and listings. Fragments are either builders,
//! encoded on demand in the requested byte order, or pre-encoded buffers.
//! A pre-encoded buffer fixes the byte order of the whole index: it is
//! detected when the buffer is added and every later fragment, as well as
//! the final `encode`, must use the same order.
//!
//! Large indexes encode their builder fragments on the rayon pool; the
//! output is collected in fragment order, so it does not depend on
//! scheduling.

use super::{Encode, ListingBuilder, MappingBuilder};
use crate::config::CodecConfig;
use crate::decode::{ListingView, MappingView};
use crate::error::{Error, Result};
use crate::format::{check_count, Format, WordWriter, INDEX_MAGIC};
use crate::model::{Index, Listing, Mapping};
use crate::sequence::ByteOrder;
use bytes::Bytes;
use rayon::prelude::*;
use tracing::{debug, info};

/// Fragment count above which builder fragments are encoded in parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

enum Fragment<B, V> {
    Builder(B),
    Encoded { bytes: Bytes, view: V },
}

impl<B: Encode, V> Fragment<B, V> {
    fn encode(&self, order: ByteOrder) -> Result<Bytes> {
        match self {
            Fragment::Builder(builder) => builder.encode(order).map(Bytes::from),
            Fragment::Encoded { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

type MappingFragment = Fragment<MappingBuilder, MappingView<'static>>;
type ListingFragment = Fragment<ListingBuilder, ListingView<'static>>;

/// Accumulates the mappings and listings of an index
pub struct IndexBuilder {
    mappings: Vec<MappingFragment>,
    listings: Vec<ListingFragment>,
    order: Option<ByteOrder>,
    parallel_threshold: usize,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_PARALLEL_THRESHOLD)
    }

    /// Create a builder that encodes in parallel above `parallel_threshold`
    /// fragments
    pub fn with_options(parallel_threshold: usize) -> Self {
        Self {
            mappings: Vec::new(),
            listings: Vec::new(),
            order: None,
            parallel_threshold,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::with_options(config.parallel_threshold)
    }

    /// Byte order fixed by pre-encoded fragments, if any
    pub fn order(&self) -> Option<ByteOrder> {
        self.order
    }

    fn pin_order(&mut self, order: ByteOrder) -> Result<()> {
        match self.order {
            Some(pinned) if pinned != order => Err(Error::Value(format!(
                "fragment is {}, index already holds {} fragments",
                order, pinned
            ))),
            _ => {
                self.order = Some(order);
                Ok(())
            }
        }
    }

    /// Add a mapping builder and return its position
    pub fn put_mapping(&mut self, mapping: MappingBuilder) -> Result<usize> {
        let index = self.mappings.len();
        check_count("mapping count", index + 1)?;
        self.mappings.push(Fragment::Builder(mapping));
        Ok(index)
    }

    /// Add a listing builder and return its position
    pub fn put_listing(&mut self, listing: ListingBuilder) -> Result<usize> {
        let index = self.listings.len();
        check_count("listing count", index + 1)?;
        self.listings.push(Fragment::Builder(listing));
        Ok(index)
    }

    /// Add an encoded mapping and return its position
    ///
    /// The buffer is validated by decoding it; its byte order must match the
    /// order of fragments added before.
    pub fn put_mapping_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let order = Format::Mapping.detect_order(bytes)?;
        let bytes = Bytes::copy_from_slice(bytes);
        let view = MappingView::decode_shared(bytes.clone(), order)?;
        self.pin_order(order)?;
        let index = self.mappings.len();
        check_count("mapping count", index + 1)?;
        self.mappings.push(Fragment::Encoded { bytes, view });
        Ok(index)
    }

    /// Add an encoded listing and return its position
    ///
    /// The buffer is validated by decoding it; its byte order must match the
    /// order of fragments added before.
    pub fn put_listing_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let order = Format::Listing.detect_order(bytes)?;
        let bytes = Bytes::copy_from_slice(bytes);
        let view = ListingView::decode_shared(bytes.clone(), order)?;
        self.pin_order(order)?;
        let index = self.listings.len();
        check_count("listing count", index + 1)?;
        self.listings.push(Fragment::Encoded { bytes, view });
        Ok(index)
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
        self.listings.clear();
        self.order = None;
    }

    fn encode_all<B, V>(&self, fragments: &[Fragment<B, V>], order: ByteOrder) -> Result<Vec<Bytes>>
    where
        B: Encode + Sync,
        V: Sync,
    {
        if fragments.len() > self.parallel_threshold {
            debug!(fragments = fragments.len(), "Encoding fragments in parallel");
            fragments.par_iter().map(|fragment| fragment.encode(order)).collect()
        } else {
            fragments.iter().map(|fragment| fragment.encode(order)).collect()
        }
    }
}

impl Encode for IndexBuilder {
    fn encode(&self, order: ByteOrder) -> Result<Vec<u8>> {
        if let Some(pinned) = self.order {
            if pinned != order {
                return Err(Error::Value(format!(
                    "cannot encode {} index from {} fragments",
                    order, pinned
                )));
            }
        }
        let mappings = self.encode_all(&self.mappings, order)?;
        let listings = self.encode_all(&self.listings, order)?;

        let mapping_words = words(&mappings);
        let listing_words = words(&listings);
        let header_words = 3 + mappings.len() + 1 + listings.len() + 1;
        let total_words = header_words + mapping_words.last().copied().unwrap_or(0) as usize
            + listing_words.last().copied().unwrap_or(0) as usize;
        check_count("index size in words", total_words)?;

        let mut out = WordWriter::with_capacity(order, total_words * 4);
        out.put_u32(INDEX_MAGIC);
        out.put_u32(mappings.len() as u32);
        out.put_u32(listings.len() as u32);
        for offset in mapping_words.iter().chain(listing_words.iter()) {
            out.put_u32(*offset);
        }
        for fragment in mappings.iter().chain(listings.iter()) {
            out.put_bytes(fragment);
        }

        info!(
            mappings = mappings.len(),
            listings = listings.len(),
            bytes = out.len(),
            order = %order,
            "Encoded index"
        );
        Ok(out.into_bytes())
    }
}

/// Cumulative word offsets of encoded fragments, starting at 0
fn words(fragments: &[Bytes]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(fragments.len() + 1);
    let mut total = 0u64;
    offsets.push(0);
    for fragment in fragments {
        total += (fragment.len() / 4) as u64;
        offsets.push(total.min(u32::MAX as u64) as u32);
    }
    offsets
}

impl Index for IndexBuilder {
    fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    fn listing_count(&self) -> usize {
        self.listings.len()
    }

    fn mapping(&self, index: usize) -> &dyn Mapping {
        match self.mappings.get(index) {
            Some(Fragment::Builder(builder)) => builder,
            Some(Fragment::Encoded { view, .. }) => view,
            None => &crate::model::EMPTY,
        }
    }

    fn listing(&self, index: usize) -> &dyn Listing {
        match self.listings.get(index) {
            Some(Fragment::Builder(builder)) => builder,
            Some(Fragment::Encoded { view, .. }) => view,
            None => &crate::model::EMPTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::IndexView;
    use crate::model::MappingMode;
    use crate::sequence::NumericSequence;

    fn listing_of(values: &[&[i32]]) -> Result<ListingBuilder> {
        let mut listing = ListingBuilder::new();
        for item in values {
            listing.put(&NumericSequence::from(*item))?;
        }
        Ok(listing)
    }

    #[test]
    fn test_pre_encoded_fragments_pin_order() -> Result<()> {
        let bytes = listing_of(&[&[1, 2]])?.encode(ByteOrder::Big)?;
        let other = listing_of(&[&[3]])?.encode(ByteOrder::Little)?;

        let mut index = IndexBuilder::new();
        assert_eq!(index.put_listing_bytes(&bytes)?, 0);
        assert_eq!(index.order(), Some(ByteOrder::Big));

        assert!(matches!(index.put_listing_bytes(&other), Err(Error::Value(_))));
        assert_eq!(index.listing_count(), 1);
        assert!(matches!(index.encode(ByteOrder::Little), Err(Error::Value(_))));

        let encoded = index.encode(ByteOrder::Big)?;
        let view = IndexView::decode(&encoded, ByteOrder::Big)?;
        assert_eq!(view.listing(0).item(0).to_vec(), vec![1, 2]);

        index.clear();
        assert_eq!(index.order(), None);
        Ok(())
    }

    #[test]
    fn test_pre_encoded_fragment_is_validated() -> Result<()> {
        let mut bytes = listing_of(&[&[1, 2]])?.encode(ByteOrder::Big)?;
        bytes.truncate(bytes.len() - 4);
        let mut index = IndexBuilder::new();
        let err = index.put_listing_bytes(&bytes).unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(index.order(), None);
        Ok(())
    }

    #[test]
    fn test_index_reads_through_fragments() -> Result<()> {
        let mut mapping = MappingBuilder::new(MappingMode::Hashed);
        mapping.put(&NumericSequence::from([1]), &NumericSequence::from([2]))?;
        let encoded = mapping.encode(ByteOrder::native())?;

        let mut index = IndexBuilder::new();
        index.put_mapping(mapping)?;
        index.put_mapping_bytes(&encoded)?;

        for position in 0..2 {
            let found = index.mapping(position).get(&NumericSequence::from([1]));
            assert_eq!(found.map(|v| v.to_vec()), Some(vec![2]));
        }
        assert_eq!(index.mapping(2).entry_count(), 0);
        assert_eq!(index.listing(0).item_count(), 0);
        Ok(())
    }

    #[test]
    fn test_parallel_matches_sequential() -> Result<()> {
        let build = |threshold: usize| -> Result<Vec<u8>> {
            let mut index = IndexBuilder::with_options(threshold);
            for i in 0..20 {
                index.put_listing(listing_of(&[&[i, i + 1], &[-i]])?)?;
                let mut mapping = MappingBuilder::new(MappingMode::Sorted);
                mapping.put(&NumericSequence::from([i]), &NumericSequence::from([i * 300]))?;
                index.put_mapping(mapping)?;
            }
            index.encode(ByteOrder::Big)
        };
        assert_eq!(build(0)?, build(usize::MAX)?);
        Ok(())
    }
}
