//! Container model shared by builders and decoded views
//!
//! Builders (`encode`) and zero-copy views (`decode`) both implement these
//! traits, so code that only reads a listing or mapping does not care
//! whether it was just assembled in memory or parsed out of a mapped file.

use crate::sequence::NumericSequence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key lookup strategy of a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    /// Entries are grouped by hash bucket; lookup scans one bucket
    #[default]
    Hashed,
    /// Entries are ordered by key; lookup is a binary search
    Sorted,
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingMode::Hashed => write!(f, "hashed"),
            MappingMode::Sorted => write!(f, "sorted"),
        }
    }
}

/// A key/value pair of a mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry<'a> {
    key: NumericSequence<'a>,
    value: NumericSequence<'a>,
}

impl<'a> Entry<'a> {
    pub fn new(key: NumericSequence<'a>, value: NumericSequence<'a>) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &NumericSequence<'a> {
        &self.key
    }

    pub fn value(&self) -> &NumericSequence<'a> {
        &self.value
    }

    pub fn into_parts(self) -> (NumericSequence<'a>, NumericSequence<'a>) {
        (self.key, self.value)
    }
}

/// Ordered collection of sequences addressed by position
pub trait Listing {
    fn item_count(&self) -> usize;

    /// The `index`-th item, or the empty sequence for an invalid position
    fn item(&self, index: usize) -> NumericSequence<'_>;

    fn item_len(&self, index: usize) -> usize {
        self.item(index).len()
    }

    /// Element `at` of item `index`, `0` when either position is invalid
    fn item_at(&self, index: usize, at: usize) -> i32 {
        self.item(index).get(at)
    }

    /// First position holding an item equal to `item`
    fn find(&self, item: &NumericSequence<'_>) -> Option<usize> {
        (0..self.item_count()).find(|&i| self.item(i).equals(item))
    }
}

/// Key/value table addressed by position or searched by key
pub trait Mapping {
    fn entry_count(&self) -> usize;

    fn mode(&self) -> MappingMode;

    /// Key of entry `index`, or the empty sequence for an invalid position
    fn key(&self, index: usize) -> NumericSequence<'_>;

    /// Value of entry `index`, or the empty sequence for an invalid position
    fn value(&self, index: usize) -> NumericSequence<'_>;

    /// Position of an entry whose key equals `key`
    ///
    /// Sorted mappings may hold duplicate keys; the position returned is
    /// then one of the matches, not necessarily the first.
    fn find(&self, key: &NumericSequence<'_>) -> Option<usize>;

    fn key_len(&self, index: usize) -> usize {
        self.key(index).len()
    }

    fn value_len(&self, index: usize) -> usize {
        self.value(index).len()
    }

    fn entry(&self, index: usize) -> Entry<'_> {
        Entry::new(self.key(index), self.value(index))
    }

    /// Value stored under `key`
    fn get(&self, key: &NumericSequence<'_>) -> Option<NumericSequence<'_>> {
        self.find(key).map(|index| self.value(index))
    }
}

/// Bundle of mappings and listings addressed by position
pub trait Index {
    fn mapping_count(&self) -> usize;

    fn listing_count(&self) -> usize;

    /// The `index`-th mapping, or an empty mapping for an invalid position
    fn mapping(&self, index: usize) -> &dyn Mapping;

    /// The `index`-th listing, or an empty listing for an invalid position
    fn listing(&self, index: usize) -> &dyn Listing;
}

/// Listing and mapping without content, returned for invalid positions
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContainer;

pub(crate) static EMPTY: EmptyContainer = EmptyContainer;

impl Listing for EmptyContainer {
    fn item_count(&self) -> usize {
        0
    }

    fn item(&self, _index: usize) -> NumericSequence<'_> {
        NumericSequence::Empty
    }
}

impl Mapping for EmptyContainer {
    fn entry_count(&self) -> usize {
        0
    }

    fn mode(&self) -> MappingMode {
        MappingMode::Hashed
    }

    fn key(&self, _index: usize) -> NumericSequence<'_> {
        NumericSequence::Empty
    }

    fn value(&self, _index: usize) -> NumericSequence<'_> {
        NumericSequence::Empty
    }

    fn find(&self, _key: &NumericSequence<'_>) -> Option<usize> {
        None
    }
}

impl Index for EmptyContainer {
    fn mapping_count(&self) -> usize {
        0
    }

    fn listing_count(&self) -> usize {
        0
    }

    fn mapping(&self, _index: usize) -> &dyn Mapping {
        &EMPTY
    }

    fn listing(&self, _index: usize) -> &dyn Listing {
        &EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_container() {
        let index: &dyn Index = &EMPTY;
        assert_eq!(index.mapping_count(), 0);
        assert_eq!(index.mapping(3).entry_count(), 0);
        assert!(index.listing(0).item(0).is_empty());
        assert_eq!(index.mapping(0).get(&NumericSequence::Single(1)), None);
        assert_eq!(index.listing(0).find(&NumericSequence::Empty), None);
    }

    #[test]
    fn test_mode_serde() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&MappingMode::Sorted)?, "\"sorted\"");
        let mode: MappingMode = serde_json::from_str("\"hashed\"")?;
        assert_eq!(mode, MappingMode::default());
        Ok(())
    }
}
