//! Deduplicating sequence pool
//!
//! Items are stored as compact owned copies in insertion order. A side
//! table groups positions by [`NumericSequence::hash_code`], so a lookup
//! hashes the probe once and only compares it against items of the same
//! hash. Positions are handed out strictly in first-insertion order, so
//! replaying the same puts always yields the same indices.

use crate::error::Result;
use crate::format::check_count;
use crate::sequence::NumericSequence;
use std::collections::HashMap;

#[derive(Default, Clone)]
pub struct UniquePool {
    items: Vec<NumericSequence<'static>>,
    buckets: HashMap<i32, Vec<usize>>,
}

impl UniquePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of an item equal to `item`, if one was inserted
    pub fn position(&self, item: &NumericSequence<'_>) -> Option<usize> {
        self.lookup(item.hash_code(), item)
    }

    fn lookup(&self, hash: i32, item: &NumericSequence<'_>) -> Option<usize> {
        self.buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|&index| self.items[index].equals(item))
    }

    /// Position of an equal item, or of `item` appended as a new one
    pub fn put(&mut self, item: &NumericSequence<'_>) -> Result<usize> {
        let hash = item.hash_code();
        if let Some(index) = self.lookup(hash, item) {
            return Ok(index);
        }
        self.append(hash, item)
    }

    /// Append `item` even if an equal item exists
    ///
    /// Later lookups still resolve to the earliest equal item.
    pub fn push(&mut self, item: &NumericSequence<'_>) -> Result<usize> {
        self.append(item.hash_code(), item)
    }

    fn append(&mut self, hash: i32, item: &NumericSequence<'_>) -> Result<usize> {
        check_count("sequence length", item.len())?;
        let index = self.items.len();
        check_count("item count", index + 1)?;
        self.items.push(item.compact());
        self.buckets.entry(hash).or_default().push(index);
        Ok(index)
    }

    /// Item at `index`, or the empty sequence for an invalid position
    pub fn get(&self, index: usize) -> NumericSequence<'_> {
        self.items.get(index).cloned().unwrap_or_default()
    }

    pub fn items(&self) -> &[NumericSequence<'static>] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.buckets.clear();
    }
}
