use crate::error::{Error, Result};
use crate::sequence::storage::Storage;
use crate::sequence::ByteOrder;

/// Forward cursor over an encoded structure
///
/// Every read is bounds checked; running past the end is an
/// `InvalidLength` error, and so is leaving bytes unread at [`finish`].
///
/// [`finish`]: WordReader::finish
pub(crate) struct WordReader<'a> {
    data: Storage<'a>,
    order: ByteOrder,
    pos: usize,
}

impl<'a> WordReader<'a> {
    pub(crate) fn new(data: Storage<'a>, order: ByteOrder) -> Self {
        Self { data, order, pos: 0 }
    }

    pub(crate) fn order(&self) -> ByteOrder {
        self.order
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let word = self.order.read_u32(&self.data, self.pos).ok_or_else(|| {
            Error::InvalidLength(format!(
                "expected a word at byte {}, buffer has {} bytes",
                self.pos,
                self.data.len()
            ))
        })?;
        self.pos += 4;
        Ok(word)
    }

    /// Next `len` bytes as a shared sub-region
    pub(crate) fn take(&mut self, len: usize) -> Result<Storage<'a>> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::InvalidLength(format!(
                    "expected {} bytes at byte {}, buffer has {} bytes",
                    len,
                    self.pos,
                    self.data.len()
                ))
            })?;
        let region = self.data.slice(self.pos, end);
        self.pos = end;
        Ok(region)
    }

    /// Check that the whole buffer was consumed
    pub(crate) fn finish(self) -> Result<()> {
        if self.pos != self.data.len() {
            return Err(Error::InvalidLength(format!(
                "structure ends at byte {}, buffer has {} bytes",
                self.pos,
                self.data.len()
            )));
        }
        Ok(())
    }
}
