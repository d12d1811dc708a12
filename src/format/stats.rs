//! Encode-time analysis of a batch of sequences
//!
//! [`SizeStats`] decides how the item lengths are stored: one shared length
//! when every item has the same length, otherwise a cumulative offset table
//! at the narrowest unsigned width that holds the total. [`ContentStats`]
//! picks the narrowest signed width holding every value of the batch.

use super::{byte_align, check_count, WordWriter};
use crate::error::Result;
use crate::sequence::{NumericSequence, Width};

/// How the lengths of a batch are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeStats {
    /// All items share this length
    Uniform(u32),
    /// `count + 1` cumulative offsets starting at 0
    Offsets { width: Width, offsets: Vec<u32> },
}

impl SizeStats {
    pub fn new(items: &[&NumericSequence<'_>]) -> Result<Self> {
        let first = items.first().map_or(0, |item| item.len());
        if items.iter().all(|item| item.len() == first) {
            check_count("total length", first.saturating_mul(items.len()))?;
            return Ok(SizeStats::Uniform(first as u32));
        }

        let mut offsets = Vec::with_capacity(items.len() + 1);
        let mut total = 0usize;
        offsets.push(0);
        for item in items {
            total += item.len();
            offsets.push(check_count("total length", total)?);
        }
        Ok(SizeStats::Offsets {
            width: Width::for_unsigned(total as u32),
            offsets,
        })
    }

    /// 2-bit size type for the header (0 for uniform lengths)
    pub fn size_type(&self) -> Option<Width> {
        match self {
            SizeStats::Uniform(_) => None,
            SizeStats::Offsets { width, .. } => Some(*width),
        }
    }

    /// Encoded size in bytes, padding included
    pub fn byte_len(&self) -> usize {
        match self {
            SizeStats::Uniform(_) => 4,
            SizeStats::Offsets { width, offsets } => byte_align(offsets.len() * width.bytes()),
        }
    }

    pub fn write(&self, out: &mut WordWriter) {
        match self {
            SizeStats::Uniform(length) => out.put_u32(*length),
            SizeStats::Offsets { width, offsets } => out.put_table(*width, offsets.iter().copied()),
        }
    }
}

/// Value width of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentStats {
    pub width: Width,
    /// Number of values over all items
    pub total: usize,
}

impl ContentStats {
    pub fn new(items: &[&NumericSequence<'_>]) -> Self {
        let (mut min, mut max, mut total) = (0i32, 0i32, 0usize);
        for item in items {
            total += item.len();
            for value in item.iter() {
                min = min.min(value);
                max = max.max(value);
            }
        }
        Self {
            width: Width::for_range(min, max),
            total,
        }
    }

    /// Encoded size in bytes, padding included
    pub fn byte_len(&self) -> usize {
        byte_align(self.total * self.width.bytes())
    }

    pub fn write(&self, out: &mut WordWriter, items: &[&NumericSequence<'_>]) {
        out.put_values(self.width, items.iter().flat_map(|item| item.iter()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_lengths() -> Result<()> {
        let a = NumericSequence::from([1, 2]);
        let b = NumericSequence::from([3, 4]);
        let stats = SizeStats::new(&[&a, &b])?;
        assert_eq!(stats, SizeStats::Uniform(2));
        assert_eq!(stats.size_type(), None);
        assert_eq!(stats.byte_len(), 4);

        assert_eq!(SizeStats::new(&[])?, SizeStats::Uniform(0));
        Ok(())
    }

    #[test]
    fn test_offset_table() -> Result<()> {
        let a = NumericSequence::from([1]);
        let b = NumericSequence::from([2, 3, 4]);
        let stats = SizeStats::new(&[&a, &b])?;
        assert_eq!(
            stats,
            SizeStats::Offsets { width: Width::W8, offsets: vec![0, 1, 4] }
        );
        assert_eq!(stats.byte_len(), 4);

        let long = NumericSequence::from(vec![0; 300]);
        let stats = SizeStats::new(&[&a, &long])?;
        assert_eq!(stats.size_type(), Some(Width::W16));
        assert_eq!(stats.byte_len(), 8);
        Ok(())
    }

    #[test]
    fn test_content_width() {
        let small = NumericSequence::from([1, -1]);
        let wide = NumericSequence::from([-40000]);
        assert_eq!(ContentStats::new(&[&small]).width, Width::W8);

        let stats = ContentStats::new(&[&small, &wide]);
        assert_eq!(stats.width, Width::W32);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.byte_len(), 12);

        let empty = ContentStats::new(&[]);
        assert_eq!(empty.width, Width::W8);
        assert_eq!(empty.byte_len(), 0);
    }
}
