//! Offset tables and item regions
//!
//! A batch of sequences is stored as its lengths (one shared length or a
//! cumulative offset table) followed by the packed values of all items.
//! [`Items`] holds both and turns a position into a section of the values.

use super::reader::WordReader;
use crate::error::{Error, Result};
use crate::format::{byte_align, MAX_COUNT};
use crate::sequence::storage::Storage;
use crate::sequence::{ByteOrder, NumericSequence, Width};

/// Validated table of unsigned offsets
#[derive(Debug, Clone)]
pub(crate) struct OffsetTable<'a> {
    data: Storage<'a>,
    order: ByteOrder,
    width: Width,
    len: usize,
}

impl<'a> OffsetTable<'a> {
    /// Read `len` entries at `width` (plus padding) and check that they start
    /// at 0 and never decrease
    pub(crate) fn read(reader: &mut WordReader<'a>, width: Width, len: usize) -> Result<Self> {
        let byte_len = len
            .checked_mul(width.bytes())
            .map(byte_align)
            .ok_or_else(|| Error::InvalidValue(format!("offset table of {} entries", len)))?;
        let region = reader.take(byte_len)?;
        let table = Self {
            data: region.slice(0, len * width.bytes()),
            order: reader.order(),
            width,
            len,
        };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        if self.len > 0 && self.get(0) != 0 {
            return Err(Error::InvalidOffset(format!(
                "offset table starts at {}",
                self.get(0)
            )));
        }
        for i in 1..self.len {
            if self.get(i) < self.get(i - 1) {
                return Err(Error::InvalidOffset(format!(
                    "offset {} at position {} is below its predecessor {}",
                    self.get(i),
                    i,
                    self.get(i - 1)
                )));
            }
        }
        Ok(())
    }

    /// Entry `index`; callers stay below `len`
    #[inline]
    pub(crate) fn get(&self, index: usize) -> u32 {
        let bytes: &[u8] = &self.data;
        match self.width {
            Width::W8 => bytes[index] as u32,
            Width::W16 => {
                let p = index * 2;
                self.order.u16_from([bytes[p], bytes[p + 1]]) as u32
            }
            Width::W32 => {
                let p = index * 4;
                self.order.u32_from([bytes[p], bytes[p + 1], bytes[p + 2], bytes[p + 3]])
            }
        }
    }

    pub(crate) fn last(&self) -> u32 {
        match self.len {
            0 => 0,
            len => self.get(len - 1),
        }
    }

    pub(crate) fn into_owned(self) -> OffsetTable<'static> {
        OffsetTable {
            data: self.data.into_owned(),
            order: self.order,
            width: self.width,
            len: self.len,
        }
    }
}

/// Lengths of a batch
#[derive(Debug, Clone)]
pub(crate) enum SizeLayout<'a> {
    Uniform(u32),
    Offsets(OffsetTable<'a>),
}

/// The items of a listing, or the keys or values of a mapping
#[derive(Debug, Clone)]
pub(crate) struct Items<'a> {
    count: usize,
    sizes: SizeLayout<'a>,
    values: NumericSequence<'a>,
    content: Width,
}

impl<'a> Items<'a> {
    pub(crate) const EMPTY: Items<'static> = Items {
        count: 0,
        sizes: SizeLayout::Uniform(0),
        values: NumericSequence::Empty,
        content: Width::W8,
    };

    /// Read the size region (`size = None` for a shared length) and the
    /// value region of `count` items
    pub(crate) fn read(
        reader: &mut WordReader<'a>,
        count: usize,
        size: Option<Width>,
        content: Width,
    ) -> Result<Self> {
        let (sizes, total) = match size {
            None => {
                let length = reader.read_u32()?;
                let total = (length as u64) * (count as u64);
                (SizeLayout::Uniform(length), total)
            }
            Some(width) => {
                let table = OffsetTable::read(reader, width, count + 1)?;
                let total = table.last() as u64;
                (SizeLayout::Offsets(table), total)
            }
        };
        if total > MAX_COUNT as u64 {
            return Err(Error::InvalidValue(format!(
                "{} values exceed the limit of {}",
                total, MAX_COUNT
            )));
        }

        let value_len = total as usize * content.bytes();
        let region = reader.take(byte_align(value_len))?;
        let values = NumericSequence::packed(region.slice(0, value_len), reader.order(), content);
        Ok(Self {
            count,
            sizes,
            values,
            content,
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn content(&self) -> Width {
        self.content
    }

    /// Width of the offset table, `None` for a shared length
    pub(crate) fn size_width(&self) -> Option<Width> {
        match &self.sizes {
            SizeLayout::Uniform(_) => None,
            SizeLayout::Offsets(table) => Some(table.width),
        }
    }

    /// Start and length of item `index` within the value region
    #[inline]
    fn span(&self, index: usize) -> (usize, usize) {
        match &self.sizes {
            SizeLayout::Uniform(length) => {
                let length = *length as usize;
                (index * length, length)
            }
            SizeLayout::Offsets(table) => {
                let start = table.get(index);
                (start as usize, (table.get(index + 1) - start) as usize)
            }
        }
    }

    /// Item `index` as a zero-copy section, empty for an invalid position
    pub(crate) fn get(&self, index: usize) -> NumericSequence<'a> {
        if index >= self.count {
            return NumericSequence::Empty;
        }
        let (start, len) = self.span(index);
        self.values.section(start, len)
    }

    pub(crate) fn len_of(&self, index: usize) -> usize {
        if index >= self.count {
            return 0;
        }
        self.span(index).1
    }

    pub(crate) fn into_owned(self) -> Items<'static> {
        Items {
            count: self.count,
            sizes: match self.sizes {
                SizeLayout::Uniform(length) => SizeLayout::Uniform(length),
                SizeLayout::Offsets(table) => SizeLayout::Offsets(table.into_owned()),
            },
            values: self.values.into_owned(),
            content: self.content,
        }
    }
}
