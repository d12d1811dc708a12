use super::reader::WordReader;
use super::table::{Items, OffsetTable};
use crate::error::{Error, Result};
use crate::format::{Format, MappingHeader, MAX_COUNT, MAX_RANGE_MASK};
use crate::model::{Mapping, MappingMode};
use crate::sequence::storage::Storage;
use crate::sequence::{ByteOrder, NumericSequence, Width};
use bytes::Bytes;
use std::cmp::Ordering;

/// Bucket table of a hashed mapping
#[derive(Clone)]
struct Buckets<'a> {
    mask: u32,
    offsets: OffsetTable<'a>,
}

/// Zero-copy view over an encoded mapping
#[derive(Clone)]
pub struct MappingView<'a> {
    count: usize,
    buckets: Option<Buckets<'a>>,
    keys: Items<'a>,
    values: Items<'a>,
    order: ByteOrder,
}

/// Mapping without entries, handed out for invalid positions
pub(crate) static EMPTY_MAPPING: MappingView<'static> = MappingView {
    count: 0,
    buckets: None,
    keys: Items::EMPTY,
    values: Items::EMPTY,
    order: ByteOrder::native(),
};

impl<'a> MappingView<'a> {
    /// Parse a mapping written in `order`
    pub fn decode(bytes: &'a [u8], order: ByteOrder) -> Result<Self> {
        Self::parse(Storage::Borrowed(bytes), order)
    }

    /// Parse a mapping, detecting its byte order from the header
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let order = Format::Mapping.detect_order(bytes)?;
        Self::decode(bytes, order)
    }

    pub(crate) fn parse(data: Storage<'a>, order: ByteOrder) -> Result<Self> {
        let mut reader = WordReader::new(data, order);
        let header = MappingHeader::from_word(reader.read_u32()?)?;
        let count = reader.read_u32()?;
        if count > MAX_COUNT {
            return Err(Error::InvalidValue(format!("entry count {}", count)));
        }

        let buckets = match header.range_size {
            None => None,
            Some(width) => {
                let mask = reader.read_u32()?;
                if mask < 1 || mask > MAX_RANGE_MASK || (mask.wrapping_add(1) & mask) != 0 {
                    return Err(Error::InvalidValue(format!("range mask {:#X}", mask)));
                }
                let offsets = OffsetTable::read(&mut reader, width, mask as usize + 2)?;
                if offsets.last() != count {
                    return Err(Error::InvalidOffset(format!(
                        "bucket table ends at {}, mapping has {} entries",
                        offsets.last(),
                        count
                    )));
                }
                Some(Buckets { mask, offsets })
            }
        };

        let count = count as usize;
        let keys = Items::read(&mut reader, count, header.key_size, header.key_content)?;
        let values = Items::read(&mut reader, count, header.value_size, header.value_content)?;
        reader.finish()?;

        Ok(Self {
            count,
            buckets,
            keys,
            values,
            order,
        })
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn entry_count(&self) -> usize {
        self.count
    }

    pub fn mode(&self) -> MappingMode {
        match self.buckets {
            Some(_) => MappingMode::Hashed,
            None => MappingMode::Sorted,
        }
    }

    /// Bucket mask of a hashed mapping
    pub fn range_mask(&self) -> Option<u32> {
        self.buckets.as_ref().map(|buckets| buckets.mask)
    }

    /// Key of entry `index` as a view into the buffer
    pub fn key(&self, index: usize) -> NumericSequence<'a> {
        self.keys.get(index)
    }

    /// Value of entry `index` as a view into the buffer
    pub fn value(&self, index: usize) -> NumericSequence<'a> {
        self.values.get(index)
    }

    pub fn key_width(&self) -> Width {
        self.keys.content()
    }

    pub fn value_width(&self) -> Width {
        self.values.content()
    }

    /// Position of an entry with an equal key
    pub fn find(&self, key: &NumericSequence<'_>) -> Option<usize> {
        match &self.buckets {
            Some(buckets) => {
                let bucket = (key.hash_code() as u32 & buckets.mask) as usize;
                let start = buckets.offsets.get(bucket) as usize;
                let end = buckets.offsets.get(bucket + 1) as usize;
                (start..end).find(|&index| self.keys.get(index).equals(key))
            }
            None => {
                let (mut low, mut high) = (0, self.count);
                while low < high {
                    let mid = low + (high - low) / 2;
                    match self.keys.get(mid).compare(key) {
                        Ordering::Less => low = mid + 1,
                        Ordering::Greater => high = mid,
                        Ordering::Equal => return Some(mid),
                    }
                }
                None
            }
        }
    }

    pub fn get(&self, key: &NumericSequence<'_>) -> Option<NumericSequence<'a>> {
        self.find(key).map(|index| self.value(index))
    }

    /// Copy into a view that owns its bytes
    pub fn into_owned(self) -> MappingView<'static> {
        MappingView {
            count: self.count,
            buckets: self.buckets.map(|buckets| Buckets {
                mask: buckets.mask,
                offsets: buckets.offsets.into_owned(),
            }),
            keys: self.keys.into_owned(),
            values: self.values.into_owned(),
            order: self.order,
        }
    }
}

impl MappingView<'static> {
    /// Parse a mapping held in a shared buffer; the view keeps it alive
    pub fn decode_shared(bytes: Bytes, order: ByteOrder) -> Result<Self> {
        Self::parse(Storage::Shared(bytes), order)
    }
}

impl Mapping for MappingView<'_> {
    fn entry_count(&self) -> usize {
        self.count
    }

    fn mode(&self) -> MappingMode {
        MappingView::mode(self)
    }

    fn key(&self, index: usize) -> NumericSequence<'_> {
        self.keys.get(index)
    }

    fn value(&self, index: usize) -> NumericSequence<'_> {
        self.values.get(index)
    }

    fn find(&self, key: &NumericSequence<'_>) -> Option<usize> {
        MappingView::find(self, key)
    }

    fn key_len(&self, index: usize) -> usize {
        self.keys.len_of(index)
    }

    fn value_len(&self, index: usize) -> usize {
        self.values.len_of(index)
    }
}
