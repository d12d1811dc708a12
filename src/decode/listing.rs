use super::reader::WordReader;
use super::table::Items;
use crate::error::{Error, Result};
use crate::format::{Format, ListingHeader, MAX_COUNT};
use crate::model::Listing;
use crate::sequence::storage::Storage;
use crate::sequence::{ByteOrder, NumericSequence, Width};
use bytes::Bytes;

/// Zero-copy view over an encoded listing
#[derive(Debug, Clone)]
pub struct ListingView<'a> {
    items: Items<'a>,
    order: ByteOrder,
}

/// Listing without items, handed out for invalid positions
pub(crate) static EMPTY_LISTING: ListingView<'static> = ListingView {
    items: Items::EMPTY,
    order: ByteOrder::native(),
};

impl<'a> ListingView<'a> {
    /// Parse a listing written in `order`
    pub fn decode(bytes: &'a [u8], order: ByteOrder) -> Result<Self> {
        Self::parse(Storage::Borrowed(bytes), order)
    }

    /// Parse a listing, detecting its byte order from the header
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let order = Format::Listing.detect_order(bytes)?;
        Self::decode(bytes, order)
    }

    pub(crate) fn parse(data: Storage<'a>, order: ByteOrder) -> Result<Self> {
        let mut reader = WordReader::new(data, order);
        let header = ListingHeader::from_word(reader.read_u32()?)?;
        let count = reader.read_u32()?;
        if count > MAX_COUNT {
            return Err(Error::InvalidValue(format!("item count {}", count)));
        }
        let items = Items::read(&mut reader, count as usize, header.size, header.content)?;
        reader.finish()?;
        Ok(Self { items, order })
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Item `index` as a view into the buffer, empty for an invalid position
    pub fn item(&self, index: usize) -> NumericSequence<'a> {
        self.items.get(index)
    }

    pub fn item_count(&self) -> usize {
        self.items.count()
    }

    /// Width of the packed values
    pub fn content_width(&self) -> Width {
        self.items.content()
    }

    /// Width of the offset table, `None` when all items share one length
    pub fn size_width(&self) -> Option<Width> {
        self.items.size_width()
    }

    pub fn iter(&self) -> impl Iterator<Item = NumericSequence<'a>> + '_ {
        (0..self.item_count()).map(move |index| self.item(index))
    }

    /// Copy into a view that owns its bytes
    pub fn into_owned(self) -> ListingView<'static> {
        ListingView {
            items: self.items.into_owned(),
            order: self.order,
        }
    }
}

impl ListingView<'static> {
    /// Parse a listing held in a shared buffer; the view keeps it alive
    pub fn decode_shared(bytes: Bytes, order: ByteOrder) -> Result<Self> {
        Self::parse(Storage::Shared(bytes), order)
    }
}

impl Listing for ListingView<'_> {
    fn item_count(&self) -> usize {
        self.items.count()
    }

    fn item(&self, index: usize) -> NumericSequence<'_> {
        self.items.get(index)
    }

    fn item_len(&self, index: usize) -> usize {
        self.items.len_of(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{Encode, ListingBuilder};

    #[test]
    fn test_empty_listing() -> Result<()> {
        let bytes = ListingBuilder::new().encode(ByteOrder::Big)?;
        let view = ListingView::decode(&bytes, ByteOrder::Big)?;
        assert_eq!(view.item_count(), 0);
        assert!(view.item(0).is_empty());
        assert_eq!(view.item_at(0, 0), 0);
        Ok(())
    }

    #[test]
    fn test_items_borrow_the_buffer() -> Result<()> {
        let mut builder = ListingBuilder::new();
        builder.put(&NumericSequence::from([1, 2, 3]))?;
        builder.put(&NumericSequence::from([-70000]))?;
        builder.put(&NumericSequence::from(Vec::<i32>::new()))?;
        let bytes = builder.encode(ByteOrder::Little)?;

        let view = ListingView::from_bytes(&bytes)?;
        assert_eq!(view.order(), ByteOrder::Little);
        assert_eq!(view.content_width(), Width::W32);
        assert_eq!(view.item(0).to_vec(), vec![1, 2, 3]);
        assert_eq!(view.item(1).to_vec(), vec![-70000]);
        assert!(view.item(2).is_empty());
        assert_eq!(view.item_len(0), 3);
        assert_eq!(view.find(&NumericSequence::from([-70000])), Some(1));
        assert_eq!(view.iter().count(), 3);
        Ok(())
    }

    #[test]
    fn test_rejects_trailing_bytes() -> Result<()> {
        let mut bytes = ListingBuilder::new().encode(ByteOrder::Big)?;
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        let err = ListingView::decode(&bytes, ByteOrder::Big).err();
        assert!(matches!(err, Some(Error::InvalidLength(_))));
        Ok(())
    }

    #[test]
    fn test_rejects_truncation() -> Result<()> {
        let mut builder = ListingBuilder::new();
        builder.put(&NumericSequence::from([1, 2]))?;
        let bytes = builder.encode(ByteOrder::Big)?;
        for len in 0..bytes.len() {
            let err = ListingView::decode(&bytes[..len], ByteOrder::Big).err();
            assert!(err.map_or(false, |e| e.is_format_error()), "accepted {} bytes", len);
        }
        Ok(())
    }

    #[test]
    fn test_shared_buffer() -> Result<()> {
        let mut builder = ListingBuilder::new();
        builder.put(&NumericSequence::from([42, 43]))?;
        let bytes = Bytes::from(builder.encode(ByteOrder::Big)?);

        let view = ListingView::decode_shared(bytes, ByteOrder::Big)?;
        drop(builder);
        assert_eq!(view.item(0).to_vec(), vec![42, 43]);
        Ok(())
    }
}
