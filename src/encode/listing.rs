use super::{Encode, UniquePool};
use crate::error::Result;
use crate::format::{check_count, ContentStats, ListingHeader, SizeStats, WordWriter};
use crate::model::Listing;
use crate::sequence::{ByteOrder, NumericSequence};
use tracing::debug;

/// Accumulates the items of a listing
///
/// Equal items share one position unless they are added with
/// [`ListingBuilder::put_with`] and `reuse = false`.
#[derive(Default, Clone)]
pub struct ListingBuilder {
    items: UniquePool,
}

impl ListingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `item` and return its position, reusing an equal item
    pub fn put(&mut self, item: &NumericSequence<'_>) -> Result<usize> {
        self.items.put(item)
    }

    /// Add `item`; with `reuse = false` it always gets a new position
    pub fn put_with(&mut self, item: &NumericSequence<'_>, reuse: bool) -> Result<usize> {
        if reuse {
            self.items.put(item)
        } else {
            self.items.push(item)
        }
    }

    /// Item at `index`, or the empty sequence for an invalid position
    pub fn get(&self, index: usize) -> NumericSequence<'_> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Listing for ListingBuilder {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn item(&self, index: usize) -> NumericSequence<'_> {
        self.items.get(index)
    }

    fn find(&self, item: &NumericSequence<'_>) -> Option<usize> {
        self.items.position(item)
    }
}

impl Encode for ListingBuilder {
    fn encode(&self, order: ByteOrder) -> Result<Vec<u8>> {
        let items: Vec<&NumericSequence<'_>> = self.items.items().iter().collect();
        encode_listing(&items, order)
    }
}

/// Serialize `items` in the given order as one listing
pub fn encode_listing(items: &[&NumericSequence<'_>], order: ByteOrder) -> Result<Vec<u8>> {
    let count = check_count("item count", items.len())?;
    let sizes = SizeStats::new(items)?;
    let content = ContentStats::new(items);
    let header = ListingHeader {
        content: content.width,
        size: sizes.size_type(),
    };

    let capacity = 8 + sizes.byte_len() + content.byte_len();
    let mut out = WordWriter::with_capacity(order, capacity);
    out.put_u32(header.to_word());
    out.put_u32(count);
    sizes.write(&mut out);
    content.write(&mut out, items);

    debug!(
        items = count,
        size_type = ?header.size,
        content_type = ?header.content,
        bytes = out.len(),
        "Encoded listing"
    );
    Ok(out.into_bytes())
}
