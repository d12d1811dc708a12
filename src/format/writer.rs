use super::byte_align;
use crate::sequence::{ByteOrder, Width};

/// Append-only buffer that writes words and padded tables in one byte order
pub struct WordWriter {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl WordWriter {
    pub fn with_capacity(order: ByteOrder, capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            order,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&self.order.u32_bytes(value));
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.pad();
    }

    /// Unsigned table entries at `width`, zero padded to a word boundary
    pub fn put_table(&mut self, width: Width, values: impl Iterator<Item = u32>) {
        for value in values {
            self.put_element(width, value);
        }
        self.pad();
    }

    /// Signed values at `width`, zero padded to a word boundary
    pub fn put_values(&mut self, width: Width, values: impl Iterator<Item = i32>) {
        for value in values {
            self.put_element(width, value as u32);
        }
        self.pad();
    }

    #[inline]
    fn put_element(&mut self, width: Width, value: u32) {
        match width {
            Width::W8 => self.buf.push(value as u8),
            Width::W16 => self.buf.extend_from_slice(&self.order.u16_bytes(value as u16)),
            Width::W32 => self.put_u32(value),
        }
    }

    fn pad(&mut self) {
        self.buf.resize(byte_align(self.buf.len()), 0);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
