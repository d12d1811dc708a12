use super::reader::WordReader;
use super::table::OffsetTable;
use super::listing::EMPTY_LISTING;
use super::mapping::EMPTY_MAPPING;
use super::{ListingView, MappingView};
use crate::error::{Error, Result};
use crate::format::{Format, INDEX_MAGIC, MAX_COUNT};
use crate::model::{Index, Listing, Mapping};
use crate::sequence::storage::Storage;
use crate::sequence::{ByteOrder, Width};
use bytes::Bytes;
use tracing::debug;

/// Zero-copy view over an encoded index
///
/// Every fragment is parsed up front, so a successfully decoded index only
/// hands out valid mappings and listings. Offsets in the index header count
/// 32-bit words.
#[derive(Clone)]
pub struct IndexView<'a> {
    mappings: Vec<MappingView<'a>>,
    listings: Vec<ListingView<'a>>,
    order: ByteOrder,
}

impl<'a> IndexView<'a> {
    /// Parse an index written in `order`
    pub fn decode(bytes: &'a [u8], order: ByteOrder) -> Result<Self> {
        Self::parse(Storage::Borrowed(bytes), order)
    }

    /// Parse an index, detecting its byte order from the header
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let order = Format::Index.detect_order(bytes)?;
        Self::decode(bytes, order)
    }

    pub(crate) fn parse(data: Storage<'a>, order: ByteOrder) -> Result<Self> {
        let mut reader = WordReader::new(data, order);
        let header = reader.read_u32()?;
        if header != INDEX_MAGIC {
            return Err(Error::InvalidHeader(format!("{:#010X} is not an index header", header)));
        }
        let mapping_count = read_count(&mut reader, "mapping count")?;
        let listing_count = read_count(&mut reader, "listing count")?;

        let mapping_offsets = OffsetTable::read(&mut reader, Width::W32, mapping_count + 1)?;
        let listing_offsets = OffsetTable::read(&mut reader, Width::W32, listing_count + 1)?;
        let mapping_data = take_words(&mut reader, mapping_offsets.last())?;
        let listing_data = take_words(&mut reader, listing_offsets.last())?;
        reader.finish()?;

        let mappings = (0..mapping_count)
            .map(|i| MappingView::parse(fragment(&mapping_data, &mapping_offsets, i), order))
            .collect::<Result<Vec<_>>>()?;
        let listings = (0..listing_count)
            .map(|i| ListingView::parse(fragment(&listing_data, &listing_offsets, i), order))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            mappings = mapping_count,
            listings = listing_count,
            order = %order,
            "Decoded index"
        );
        Ok(Self {
            mappings,
            listings,
            order,
        })
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    /// Mapping `index`, or an empty mapping for an invalid position
    pub fn mapping(&self, index: usize) -> &MappingView<'a> {
        self.mappings.get(index).unwrap_or(&EMPTY_MAPPING)
    }

    /// Listing `index`, or an empty listing for an invalid position
    pub fn listing(&self, index: usize) -> &ListingView<'a> {
        self.listings.get(index).unwrap_or(&EMPTY_LISTING)
    }

    pub fn mappings(&self) -> &[MappingView<'a>] {
        &self.mappings
    }

    pub fn listings(&self) -> &[ListingView<'a>] {
        &self.listings
    }

    /// Copy into a view that owns its bytes
    pub fn into_owned(self) -> IndexView<'static> {
        IndexView {
            mappings: self.mappings.into_iter().map(MappingView::into_owned).collect(),
            listings: self.listings.into_iter().map(ListingView::into_owned).collect(),
            order: self.order,
        }
    }
}

impl IndexView<'static> {
    /// Parse an index held in a shared buffer; the view keeps it alive
    pub fn decode_shared(bytes: Bytes, order: ByteOrder) -> Result<Self> {
        Self::parse(Storage::Shared(bytes), order)
    }
}

impl Index for IndexView<'_> {
    fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    fn listing_count(&self) -> usize {
        self.listings.len()
    }

    fn mapping(&self, index: usize) -> &dyn Mapping {
        IndexView::mapping(self, index)
    }

    fn listing(&self, index: usize) -> &dyn Listing {
        IndexView::listing(self, index)
    }
}

fn read_count(reader: &mut WordReader<'_>, what: &str) -> Result<usize> {
    let count = reader.read_u32()?;
    if count > MAX_COUNT {
        return Err(Error::InvalidValue(format!("{} {}", what, count)));
    }
    Ok(count as usize)
}

fn take_words<'a>(reader: &mut WordReader<'a>, words: u32) -> Result<Storage<'a>> {
    if words > MAX_COUNT {
        return Err(Error::InvalidValue(format!("fragment data of {} words", words)));
    }
    reader.take(words as usize * 4)
}

fn fragment<'a>(data: &Storage<'a>, offsets: &OffsetTable<'_>, index: usize) -> Storage<'a> {
    let start = offsets.get(index) as usize * 4;
    let end = offsets.get(index + 1) as usize * 4;
    data.slice(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{Encode, IndexBuilder, ListingBuilder, MappingBuilder};
    use crate::model::MappingMode;
    use crate::sequence::NumericSequence;

    #[test]
    fn test_empty_index() -> Result<()> {
        let bytes = IndexBuilder::new().encode(ByteOrder::Big)?;
        assert_eq!(
            bytes,
            vec![0xF0, 0x0D, 0xBA, 0x5E, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        let view = IndexView::decode(&bytes, ByteOrder::Big)?;
        assert_eq!(view.mapping_count(), 0);
        assert_eq!(view.listing_count(), 0);
        assert_eq!(view.mapping(0).entry_count(), 0);
        assert_eq!(view.listing(5).item_count(), 0);
        Ok(())
    }

    #[test]
    fn test_offsets_count_words() -> Result<()> {
        let mut listing = ListingBuilder::new();
        listing.put(&NumericSequence::from([1, 2, 3]))?;
        let listing_len = listing.encode(ByteOrder::Big)?.len();

        let mut index = IndexBuilder::new();
        index.put_listing(listing)?;
        let bytes = index.encode(ByteOrder::Big)?;

        // header, counts, mapping offsets [0], listing offsets [0, n]
        let end = ByteOrder::Big.read_u32(&bytes, 20);
        assert_eq!(end, Some((listing_len / 4) as u32));
        assert_eq!(bytes.len(), 24 + listing_len);
        Ok(())
    }

    #[test]
    fn test_index_round_trip() -> Result<()> {
        let mut mapping = MappingBuilder::new(MappingMode::Sorted);
        mapping.put(&NumericSequence::from([5]), &NumericSequence::from([50, 51]))?;
        let mut listing = ListingBuilder::new();
        listing.put(&NumericSequence::from([-1, -2]))?;

        let mut index = IndexBuilder::new();
        assert_eq!(index.put_mapping(mapping)?, 0);
        assert_eq!(index.put_listing(listing)?, 0);
        let bytes = index.encode(ByteOrder::Little)?;

        let view = IndexView::from_bytes(&bytes)?;
        assert_eq!(view.order(), ByteOrder::Little);
        let found = view.mapping(0).get(&NumericSequence::from([5]));
        assert_eq!(found.map(|v| v.to_vec()), Some(vec![50, 51]));
        assert_eq!(view.listing(0).item(0).to_vec(), vec![-1, -2]);

        let dynamic: &dyn Index = &view;
        assert_eq!(dynamic.listing(0).item_count(), 1);
        assert_eq!(dynamic.mapping(1).entry_count(), 0);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_fragment() -> Result<()> {
        let mut index = IndexBuilder::new();
        index.put_listing(ListingBuilder::new())?;
        let mut bytes = index.encode(ByteOrder::Big)?;
        // corrupt the listing header inside the index
        bytes[24] = 0;
        assert!(matches!(
            IndexView::decode(&bytes, ByteOrder::Big),
            Err(Error::InvalidHeader(_))
        ));
        Ok(())
    }

    #[test]
    fn test_rejects_wrong_magic() {
        let bytes = [0xF0, 0x0D, 0xBA, 0x5F, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            IndexView::decode(&bytes, ByteOrder::Big),
            Err(Error::InvalidHeader(_))
        ));
    }
}
