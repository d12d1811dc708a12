use super::{Encode, UniquePool};
use crate::error::Result;
use crate::format::{check_count, range_mask_for, ContentStats, MappingHeader, SizeStats, WordWriter};
use crate::model::{Mapping, MappingMode};
use crate::sequence::{ByteOrder, NumericSequence, Width};
use tracing::debug;

/// Accumulates the entries of a mapping
///
/// Keys are unique: putting an existing key replaces its value and keeps its
/// position. Positions on the builder follow insertion order; the encoded
/// mapping reorders entries by hash bucket or by key, depending on the mode.
#[derive(Default, Clone)]
pub struct MappingBuilder {
    keys: UniquePool,
    values: Vec<NumericSequence<'static>>,
    mode: MappingMode,
}

impl MappingBuilder {
    pub fn new(mode: MappingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set `key` to `value` and return the entry's position
    pub fn put(&mut self, key: &NumericSequence<'_>, value: &NumericSequence<'_>) -> Result<usize> {
        check_count("value length", value.len())?;
        if let Some(index) = self.keys.position(key) {
            self.values[index] = value.compact();
            return Ok(index);
        }
        let index = self.keys.push(key)?;
        self.values.push(value.compact());
        Ok(index)
    }

    pub fn set_mode(&mut self, mode: MappingMode) {
        self.mode = mode;
    }

    /// Value stored under `key`
    pub fn get(&self, key: &NumericSequence<'_>) -> Option<&NumericSequence<'static>> {
        self.keys.position(key).map(|index| &self.values[index])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /// Entry positions in encoded order, plus the bucket table for hashed mode
    fn layout(&self) -> (Vec<usize>, Option<(u32, Vec<u32>)>) {
        let keys = self.keys.items();
        let mut order: Vec<usize> = (0..keys.len()).collect();
        match self.mode {
            MappingMode::Sorted => {
                order.sort_by(|&a, &b| keys[a].compare(&keys[b]));
                (order, None)
            }
            MappingMode::Hashed => {
                let mask = range_mask_for(keys.len());
                let buckets: Vec<usize> = keys
                    .iter()
                    .map(|key| (key.hash_code() as u32 & mask) as usize)
                    .collect();
                order.sort_by_key(|&index| buckets[index]);

                let mut range = vec![0u32; mask as usize + 2];
                for &bucket in &buckets {
                    range[bucket + 1] += 1;
                }
                for i in 1..range.len() {
                    range[i] += range[i - 1];
                }
                (order, Some((mask, range)))
            }
        }
    }
}

impl Mapping for MappingBuilder {
    fn entry_count(&self) -> usize {
        self.values.len()
    }

    fn mode(&self) -> MappingMode {
        self.mode
    }

    fn key(&self, index: usize) -> NumericSequence<'_> {
        self.keys.get(index)
    }

    fn value(&self, index: usize) -> NumericSequence<'_> {
        self.values.get(index).cloned().unwrap_or_default()
    }

    fn find(&self, key: &NumericSequence<'_>) -> Option<usize> {
        self.keys.position(key)
    }
}

impl Encode for MappingBuilder {
    fn encode(&self, order: ByteOrder) -> Result<Vec<u8>> {
        let count = check_count("entry count", self.values.len())?;
        let (entries, range) = self.layout();
        let keys: Vec<&NumericSequence<'_>> = entries.iter().map(|&i| &self.keys.items()[i]).collect();
        let values: Vec<&NumericSequence<'_>> = entries.iter().map(|&i| &self.values[i]).collect();

        let key_sizes = SizeStats::new(&keys)?;
        let key_content = ContentStats::new(&keys);
        let value_sizes = SizeStats::new(&values)?;
        let value_content = ContentStats::new(&values);
        let range_width = range.as_ref().map(|_| Width::for_unsigned(count));
        let header = MappingHeader {
            key_content: key_content.width,
            key_size: key_sizes.size_type(),
            range_size: range_width,
            value_content: value_content.width,
            value_size: value_sizes.size_type(),
        };

        let capacity = 8
            + range.as_ref().map_or(0, |(_, table)| 4 + table.len() * 4)
            + key_sizes.byte_len()
            + key_content.byte_len()
            + value_sizes.byte_len()
            + value_content.byte_len();
        let mut out = WordWriter::with_capacity(order, capacity);
        out.put_u32(header.to_word());
        out.put_u32(count);
        if let (Some((mask, table)), Some(width)) = (&range, range_width) {
            out.put_u32(*mask);
            out.put_table(width, table.iter().copied());
        }
        key_sizes.write(&mut out);
        key_content.write(&mut out, &keys);
        value_sizes.write(&mut out);
        value_content.write(&mut out, &values);

        debug!(
            entries = count,
            mode = %self.mode,
            range_mask = range.as_ref().map(|(mask, _)| *mask),
            key_content = ?header.key_content,
            value_content = ?header.value_content,
            bytes = out.len(),
            "Encoded mapping"
        );
        Ok(out.into_bytes())
    }
}
