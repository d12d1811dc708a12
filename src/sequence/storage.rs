//! Byte-level backing for numeric sequences
//!
//! A packed run of integers is a byte region plus the byte order it was
//! written in. The region is either borrowed from a caller-owned buffer
//! (memory-mapped file, decoded blob) or shared through a reference-counted
//! [`Bytes`] handle, so slicing never copies.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Byte order of an encoded structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    /// Byte order of the running platform
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    /// The opposite byte order
    pub const fn swapped(self) -> Self {
        match self {
            ByteOrder::Big => ByteOrder::Little,
            ByteOrder::Little => ByteOrder::Big,
        }
    }

    #[inline]
    pub(crate) fn u16_from(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        }
    }

    #[inline]
    pub(crate) fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        }
    }

    #[inline]
    pub(crate) fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        }
    }

    #[inline]
    pub(crate) fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        }
    }

    /// Read the 32-bit word at `pos`, or `None` if the slice is too short
    pub fn read_u32(self, bytes: &[u8], pos: usize) -> Option<u32> {
        let end = pos.checked_add(4)?;
        let word = bytes.get(pos..end)?;
        Some(self.u32_from([word[0], word[1], word[2], word[3]]))
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteOrder::Big => write!(f, "big-endian"),
            ByteOrder::Little => write!(f, "little-endian"),
        }
    }
}

/// Element width of a packed region
///
/// The 2-bit type codes of the wire format map onto these widths:
/// `1 => 8 bit`, `2 => 16 bit`, `3 => 32 bit`. Code `0` has no width and
/// means "absent" (no range table) or "homogeneous" (single stored length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
}

impl Width {
    /// Width for a 2-bit type code
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Width::W8),
            2 => Some(Width::W16),
            3 => Some(Width::W32),
            _ => None,
        }
    }

    /// 2-bit type code of this width
    pub const fn code(self) -> u32 {
        match self {
            Width::W8 => 1,
            Width::W16 => 2,
            Width::W32 => 3,
        }
    }

    /// Bytes per element
    pub const fn bytes(self) -> usize {
        match self {
            Width::W8 => 1,
            Width::W16 => 2,
            Width::W32 => 4,
        }
    }

    /// Smallest width whose unsigned range holds `value`
    pub const fn for_unsigned(value: u32) -> Self {
        if value <= 0xFF {
            Width::W8
        } else if value <= 0xFFFF {
            Width::W16
        } else {
            Width::W32
        }
    }

    /// Smallest width whose signed range holds `value`
    pub const fn for_signed(value: i32) -> Self {
        if value >= i8::MIN as i32 && value <= i8::MAX as i32 {
            Width::W8
        } else if value >= i16::MIN as i32 && value <= i16::MAX as i32 {
            Width::W16
        } else {
            Width::W32
        }
    }

    /// Smallest width whose signed range holds both bounds
    pub fn for_range(min: i32, max: i32) -> Self {
        Width::for_signed(min).max(Width::for_signed(max))
    }
}

/// Borrowed or shared byte region
#[derive(Debug, Clone)]
pub(crate) enum Storage<'a> {
    Borrowed(&'a [u8]),
    Shared(Bytes),
}

impl<'a> Storage<'a> {
    /// Zero-copy sub-region `[start, end)`; callers check the bounds
    pub(crate) fn slice(&self, start: usize, end: usize) -> Storage<'a> {
        match self {
            Storage::Borrowed(bytes) => Storage::Borrowed(&bytes[start..end]),
            Storage::Shared(bytes) => Storage::Shared(bytes.slice(start..end)),
        }
    }

    /// Detach from any borrowed buffer
    pub(crate) fn into_owned(self) -> Storage<'static> {
        match self {
            Storage::Borrowed(bytes) => Storage::Shared(Bytes::copy_from_slice(bytes)),
            Storage::Shared(bytes) => Storage::Shared(bytes),
        }
    }
}

impl Deref for Storage<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Storage::Borrowed(bytes) => bytes,
            Storage::Shared(bytes) => bytes.as_ref(),
        }
    }
}

/// A contiguous run of fixed-width signed integers
///
/// The element width is carried by the enclosing `NumericSequence`
/// variant; `Packed` only knows its bytes and their order.
#[derive(Clone)]
pub struct Packed<'a> {
    pub(crate) data: Storage<'a>,
    pub(crate) order: ByteOrder,
}

impl<'a> Packed<'a> {
    pub(crate) fn new(data: Storage<'a>, order: ByteOrder) -> Self {
        Self { data, order }
    }

    /// Pack values in native order at the given width (values are truncated
    /// to the width, callers pick a width that holds them)
    pub(crate) fn from_values(values: impl Iterator<Item = i32>, width: Width) -> Packed<'static> {
        let order = ByteOrder::native();
        let mut buf = Vec::with_capacity(values.size_hint().0 * width.bytes());
        for value in values {
            match width {
                Width::W8 => buf.push(value as u8),
                Width::W16 => buf.extend_from_slice(&order.u16_bytes(value as u16)),
                Width::W32 => buf.extend_from_slice(&order.u32_bytes(value as u32)),
            }
        }
        Packed::new(Storage::Shared(Bytes::from(buf)), order)
    }

    /// Raw bytes of the region
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte order of the region
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    #[inline]
    pub(crate) fn read(&self, width: Width, index: usize) -> i32 {
        let bytes: &[u8] = &self.data;
        match width {
            Width::W8 => bytes[index] as i8 as i32,
            Width::W16 => {
                let p = index * 2;
                self.order.u16_from([bytes[p], bytes[p + 1]]) as i16 as i32
            }
            Width::W32 => {
                let p = index * 4;
                self.order
                    .u32_from([bytes[p], bytes[p + 1], bytes[p + 2], bytes[p + 3]]) as i32
            }
        }
    }

    pub(crate) fn section(&self, width: Width, offset: usize, length: usize) -> Packed<'a> {
        let w = width.bytes();
        Packed::new(self.data.slice(offset * w, (offset + length) * w), self.order)
    }

    pub(crate) fn into_owned(self) -> Packed<'static> {
        Packed::new(self.data.into_owned(), self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_selection() {
        assert_eq!(Width::for_unsigned(0), Width::W8);
        assert_eq!(Width::for_unsigned(255), Width::W8);
        assert_eq!(Width::for_unsigned(256), Width::W16);
        assert_eq!(Width::for_unsigned(65535), Width::W16);
        assert_eq!(Width::for_unsigned(65536), Width::W32);

        assert_eq!(Width::for_signed(-128), Width::W8);
        assert_eq!(Width::for_signed(127), Width::W8);
        assert_eq!(Width::for_signed(128), Width::W16);
        assert_eq!(Width::for_signed(-32769), Width::W32);
        assert_eq!(Width::for_range(-5, 300), Width::W16);
    }

    #[test]
    fn test_width_codes() {
        for width in [Width::W8, Width::W16, Width::W32] {
            assert_eq!(Width::from_code(width.code()), Some(width));
        }
        assert_eq!(Width::from_code(0), None);
        assert_eq!(Width::from_code(4), None);
    }

    #[test]
    fn test_byte_order_words() {
        let bytes = [0xF0, 0x0D, 0xBA, 0x5E];
        assert_eq!(ByteOrder::Big.read_u32(&bytes, 0), Some(0xF00DBA5E));
        assert_eq!(ByteOrder::Little.read_u32(&bytes, 0), Some(0x5EBA0DF0));
        assert_eq!(ByteOrder::Big.read_u32(&bytes, 1), None);
        assert_eq!(ByteOrder::Big.swapped(), ByteOrder::Little);
    }

    #[test]
    fn test_packed_read_both_orders() {
        let be = Packed::new(Storage::Borrowed(&[0xFF, 0xFE, 0x01, 0x2C]), ByteOrder::Big);
        assert_eq!(be.read(Width::W16, 0), -2);
        assert_eq!(be.read(Width::W16, 1), 300);

        let le = Packed::new(Storage::Borrowed(&[0xFE, 0xFF, 0x2C, 0x01]), ByteOrder::Little);
        assert_eq!(le.read(Width::W16, 0), -2);
        assert_eq!(le.read(Width::W16, 1), 300);
        assert_eq!(le.read(Width::W8, 0), -2);
    }

    #[test]
    fn test_packed_from_values() {
        let packed = Packed::from_values([300, -5].into_iter(), Width::W32);
        assert_eq!(packed.bytes().len(), 8);
        assert_eq!(packed.read(Width::W32, 0), 300);
        assert_eq!(packed.read(Width::W32, 1), -5);

        let section = packed.section(Width::W32, 1, 1);
        assert_eq!(section.read(Width::W32, 0), -5);
    }
}
