//! Numeric sequences
//!
//! [`NumericSequence`] is the immutable view over a run of integers that
//! every other part of the codec passes around. It is a tagged union over
//! its backing representation:
//!
//! ```text
//! NumericSequence
//!   ├─→ Int32 / Int16 / Int8   packed bytes (borrowed or shared) + byte order
//!   ├─→ Single(v)              one value, no storage
//!   ├─→ Empty
//!   ├─→ Concat(left, right)    lazy two-part view
//!   └─→ Section(base, off, n)  lazy window into a Concat
//! ```
//!
//! Views decoded from a buffer borrow it for `'a`, so a sequence can never
//! outlive the bytes it reads from. [`NumericSequence::into_owned`] detaches
//! a view when it has to outlive its buffer.
//!
//! Reads are permissive: `get(i)` on an out-of-range index yields `0`, and
//! an invalid `section` yields the empty sequence.

pub mod compare;
pub mod storage;

pub use storage::{ByteOrder, Packed, Width};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use storage::Storage;

/// Largest element count of a sequence (and of any count in the format)
pub const MAX_LENGTH: usize = 0x3FFF_FFFF;

/// Deepest chain of lazy nodes; a concat that would go deeper is flattened
pub const MAX_DEPTH: usize = 32;

/// Operands up to this length are merged into the neighbouring edge of a
/// concat instead of adding a level
const SHORT_LENGTH: usize = 64;

/// Immutable, zero-copy view over a run of `i32` values
#[derive(Clone)]
pub enum NumericSequence<'a> {
    Int32(Packed<'a>),
    Int8(Packed<'a>),
    Int16(Packed<'a>),
    Single(i32),
    Empty,
    Concat(Arc<Concat<'a>>),
    Section(Arc<Section<'a>>),
}

/// Lazy concatenation of two non-empty sequences
pub struct Concat<'a> {
    left: NumericSequence<'a>,
    right: NumericSequence<'a>,
    length: usize,
    depth: usize,
}

impl<'a> Concat<'a> {
    pub fn left(&self) -> &NumericSequence<'a> {
        &self.left
    }

    pub fn right(&self) -> &NumericSequence<'a> {
        &self.right
    }
}

/// Lazy window `[offset, offset + length)` into a base sequence
pub struct Section<'a> {
    base: NumericSequence<'a>,
    offset: usize,
    length: usize,
    depth: usize,
}

impl<'a> Section<'a> {
    pub fn base(&self) -> &NumericSequence<'a> {
        &self.base
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

// Dropping a long chain must not recurse once per level: uniquely owned
// lazy children are taken apart on an explicit stack.
fn release(mut stack: Vec<NumericSequence<'_>>) {
    while let Some(node) = stack.pop() {
        match node {
            NumericSequence::Concat(concat) => {
                if let Ok(mut concat) = Arc::try_unwrap(concat) {
                    stack.push(std::mem::take(&mut concat.left));
                    stack.push(std::mem::take(&mut concat.right));
                }
            }
            NumericSequence::Section(section) => {
                if let Ok(mut section) = Arc::try_unwrap(section) {
                    stack.push(std::mem::take(&mut section.base));
                }
            }
            _ => {}
        }
    }
}

impl Drop for Concat<'_> {
    fn drop(&mut self) {
        if self.left.depth() > 0 || self.right.depth() > 0 {
            release(vec![std::mem::take(&mut self.left), std::mem::take(&mut self.right)]);
        }
    }
}

impl Drop for Section<'_> {
    fn drop(&mut self) {
        if self.base.depth() > 0 {
            release(vec![std::mem::take(&mut self.base)]);
        }
    }
}

impl<'a> NumericSequence<'a> {
    /// View over packed bytes already validated to hold whole elements
    pub(crate) fn packed(data: Storage<'a>, order: ByteOrder, width: Width) -> Self {
        if data.is_empty() {
            return NumericSequence::Empty;
        }
        let packed = Packed::new(data, order);
        match width {
            Width::W8 => NumericSequence::Int8(packed),
            Width::W16 => NumericSequence::Int16(packed),
            Width::W32 => NumericSequence::Int32(packed),
        }
    }

    /// Zero-copy view over `bytes` holding signed integers of `width` in `order`
    ///
    /// Trailing bytes that do not form a whole element are ignored.
    pub fn from_bytes(bytes: &'a [u8], order: ByteOrder, width: Width) -> Self {
        let usable = bytes.len() - bytes.len() % width.bytes();
        Self::packed(Storage::Borrowed(&bytes[..usable]), order, width)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            NumericSequence::Int32(p) => p.data.len() / 4,
            NumericSequence::Int16(p) => p.data.len() / 2,
            NumericSequence::Int8(p) => p.data.len(),
            NumericSequence::Single(_) => 1,
            NumericSequence::Empty => 0,
            NumericSequence::Concat(c) => c.length,
            NumericSequence::Section(s) => s.length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th element, or `0` if `index` is out of range
    pub fn get(&self, index: usize) -> i32 {
        if index >= self.len() {
            return 0;
        }
        match self {
            NumericSequence::Int32(p) => p.read(Width::W32, index),
            NumericSequence::Int16(p) => p.read(Width::W16, index),
            NumericSequence::Int8(p) => p.read(Width::W8, index),
            NumericSequence::Single(value) => *value,
            NumericSequence::Empty => 0,
            NumericSequence::Concat(c) => {
                let split = c.left.len();
                if index < split {
                    c.left.get(index)
                } else {
                    c.right.get(index - split)
                }
            }
            NumericSequence::Section(s) => s.base.get(s.offset + index),
        }
    }

    /// Native element width in bytes (1, 2 or 4)
    ///
    /// Single reports the smallest width holding its value, Empty reports 1,
    /// Concat the wider of its parts and Section the width of its base.
    pub fn mode(&self) -> u8 {
        match self {
            NumericSequence::Int32(_) => 4,
            NumericSequence::Int16(_) => 2,
            NumericSequence::Int8(_) | NumericSequence::Empty => 1,
            NumericSequence::Single(value) => Width::for_signed(*value).bytes() as u8,
            NumericSequence::Concat(c) => c.left.mode().max(c.right.mode()),
            NumericSequence::Section(s) => s.base.mode(),
        }
    }

    /// Zero-copy view of `length` elements starting at `offset`
    ///
    /// Returns the empty sequence if the region is empty or not fully inside
    /// this sequence.
    pub fn section(&self, offset: usize, length: usize) -> NumericSequence<'a> {
        let total = self.len();
        let end = match offset.checked_add(length) {
            Some(end) if length > 0 && end <= total => end,
            _ => return NumericSequence::Empty,
        };
        if offset == 0 && length == total {
            return self.clone();
        }
        match self {
            NumericSequence::Int32(p) => NumericSequence::Int32(p.section(Width::W32, offset, length)),
            NumericSequence::Int16(p) => NumericSequence::Int16(p.section(Width::W16, offset, length)),
            NumericSequence::Int8(p) => NumericSequence::Int8(p.section(Width::W8, offset, length)),
            // a one-element sequence only has the full section, handled above
            NumericSequence::Single(_) | NumericSequence::Empty => NumericSequence::Empty,
            NumericSequence::Section(s) => s.base.section(s.offset + offset, length),
            NumericSequence::Concat(c) => {
                let split = c.left.len();
                if end <= split {
                    c.left.section(offset, length)
                } else if offset >= split {
                    c.right.section(offset - split, length)
                } else {
                    NumericSequence::Section(Arc::new(Section {
                        base: self.clone(),
                        offset,
                        length,
                        depth: c.depth + 1,
                    }))
                }
            }
        }
    }

    /// Lazy concatenation; an empty operand returns the other one unchanged
    ///
    /// A short operand next to a short edge of an existing concat is merged
    /// into that edge, and a result deeper than [`MAX_DEPTH`] is flattened
    /// into one packed sequence, so lookups stay bounded however the
    /// sequence was built.
    pub fn concat(&self, other: &NumericSequence<'a>) -> NumericSequence<'a> {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let length = self.len() + other.len();
        debug_assert!(length <= MAX_LENGTH, "sequence length {} exceeds limit", length);

        if let NumericSequence::Concat(c) = self {
            if is_short_leaf(&c.right, other) {
                return Self::node(c.left.clone(), c.right.joined(other));
            }
        }
        if let NumericSequence::Concat(c) = other {
            if is_short_leaf(self, &c.left) {
                return Self::node(self.joined(&c.left), c.right.clone());
            }
        }
        if 1 + self.depth().max(other.depth()) > MAX_DEPTH {
            return self.joined(other);
        }
        Self::node(self.clone(), other.clone())
    }

    fn node(left: NumericSequence<'a>, right: NumericSequence<'a>) -> NumericSequence<'a> {
        NumericSequence::Concat(Arc::new(Concat {
            length: left.len() + right.len(),
            depth: 1 + left.depth().max(right.depth()),
            left,
            right,
        }))
    }

    /// Number of lazy nodes between this sequence and its deepest storage
    pub fn depth(&self) -> usize {
        match self {
            NumericSequence::Concat(c) => c.depth,
            NumericSequence::Section(s) => s.depth,
            _ => 0,
        }
    }

    /// Compact copy of `self` followed by `other`
    fn joined(&self, other: &NumericSequence<'_>) -> NumericSequence<'static> {
        let mut values = Vec::with_capacity(self.len() + other.len());
        self.extend_into(&mut values);
        other.extend_into(&mut values);
        compact_values(&values)
    }

    /// Append every element to `out`, walking lazy nodes without recursion
    fn extend_into(&self, out: &mut Vec<i32>) {
        let mut pending = vec![(self, 0, self.len())];
        while let Some((sequence, offset, length)) = pending.pop() {
            if length == 0 {
                continue;
            }
            match sequence {
                NumericSequence::Concat(c) => {
                    let split = c.left.len();
                    let end = offset + length;
                    if end > split {
                        let start = offset.max(split);
                        pending.push((&c.right, start - split, end - start));
                    }
                    if offset < split {
                        pending.push((&c.left, offset, end.min(split) - offset));
                    }
                }
                NumericSequence::Section(s) => pending.push((&s.base, s.offset + offset, length)),
                leaf => out.extend((offset..offset + length).map(|i| leaf.get(i))),
            }
        }
    }

    /// Tightest contiguous copy: Empty, Single, or packed at the smallest
    /// signed width holding every element
    pub fn compact(&self) -> NumericSequence<'static> {
        compact_values(&self.to_vec())
    }

    /// Same structure, detached from any borrowed buffer
    pub fn into_owned(self) -> NumericSequence<'static> {
        match self {
            NumericSequence::Int32(p) => NumericSequence::Int32(p.into_owned()),
            NumericSequence::Int16(p) => NumericSequence::Int16(p.into_owned()),
            NumericSequence::Int8(p) => NumericSequence::Int8(p.into_owned()),
            NumericSequence::Single(value) => NumericSequence::Single(value),
            NumericSequence::Empty => NumericSequence::Empty,
            NumericSequence::Concat(c) => NumericSequence::Concat(Arc::new(Concat {
                left: c.left.clone().into_owned(),
                right: c.right.clone().into_owned(),
                length: c.length,
                depth: c.depth,
            })),
            NumericSequence::Section(s) => NumericSequence::Section(Arc::new(Section {
                base: s.base.clone().into_owned(),
                offset: s.offset,
                length: s.length,
                depth: s.depth,
            })),
        }
    }

    /// FNV-1a style fold: `h = 0x811C9DC5; h = (h * 0x01000193) ^ e`
    pub fn hash_code(&self) -> i32 {
        compare::hash(self)
    }

    /// Lexicographic signed comparison; a strict prefix sorts first
    pub fn compare(&self, other: &NumericSequence<'_>) -> Ordering {
        compare::compare(self, other)
    }

    /// Element-wise equality, independent of backing width
    pub fn equals(&self, other: &NumericSequence<'_>) -> bool {
        compare::equals(self, other)
    }

    pub fn iter(&self) -> Iter<'_, 'a> {
        Iter {
            sequence: self,
            front: 0,
            back: self.len(),
        }
    }

    pub fn to_vec(&self) -> Vec<i32> {
        let mut values = Vec::with_capacity(self.len());
        self.extend_into(&mut values);
        values
    }
}

fn is_short_leaf(edge: &NumericSequence<'_>, operand: &NumericSequence<'_>) -> bool {
    edge.depth() == 0 && operand.depth() == 0 && edge.len() + operand.len() <= SHORT_LENGTH
}

fn compact_values(values: &[i32]) -> NumericSequence<'static> {
    match values {
        [] => NumericSequence::Empty,
        [value] => NumericSequence::Single(*value),
        _ => {
            let (min, max) = values
                .iter()
                .fold((0, 0), |(min, max), &v| (v.min(min), v.max(max)));
            let width = Width::for_range(min, max);
            let packed = Packed::from_values(values.iter().copied(), width);
            match width {
                Width::W8 => NumericSequence::Int8(packed),
                Width::W16 => NumericSequence::Int16(packed),
                Width::W32 => NumericSequence::Int32(packed),
            }
        }
    }
}

impl Default for NumericSequence<'_> {
    fn default() -> Self {
        NumericSequence::Empty
    }
}

/// Iterator over the elements of a sequence
pub struct Iter<'s, 'a> {
    sequence: &'s NumericSequence<'a>,
    front: usize,
    back: usize,
}

impl Iterator for Iter<'_, '_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.front >= self.back {
            return None;
        }
        let value = self.sequence.get(self.front);
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Iter<'_, '_> {
    fn next_back(&mut self) -> Option<i32> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.sequence.get(self.back))
    }
}

impl ExactSizeIterator for Iter<'_, '_> {}

impl<'s, 'a> IntoIterator for &'s NumericSequence<'a> {
    type Item = i32;
    type IntoIter = Iter<'s, 'a>;

    fn into_iter(self) -> Iter<'s, 'a> {
        self.iter()
    }
}

// Conversions

impl From<Vec<i32>> for NumericSequence<'static> {
    fn from(values: Vec<i32>) -> Self {
        NumericSequence::from(values.as_slice())
    }
}

impl From<&[i32]> for NumericSequence<'static> {
    fn from(values: &[i32]) -> Self {
        if values.is_empty() {
            return NumericSequence::Empty;
        }
        NumericSequence::Int32(Packed::from_values(values.iter().copied(), Width::W32))
    }
}

impl<const N: usize> From<[i32; N]> for NumericSequence<'static> {
    fn from(values: [i32; N]) -> Self {
        NumericSequence::from(&values[..])
    }
}

impl From<&[i16]> for NumericSequence<'static> {
    fn from(values: &[i16]) -> Self {
        if values.is_empty() {
            return NumericSequence::Empty;
        }
        NumericSequence::Int16(Packed::from_values(values.iter().map(|&v| v as i32), Width::W16))
    }
}

impl From<&[i8]> for NumericSequence<'static> {
    fn from(values: &[i8]) -> Self {
        if values.is_empty() {
            return NumericSequence::Empty;
        }
        NumericSequence::Int8(Packed::from_values(values.iter().map(|&v| v as i32), Width::W8))
    }
}

impl From<i32> for NumericSequence<'static> {
    fn from(value: i32) -> Self {
        NumericSequence::Single(value)
    }
}

impl FromIterator<i32> for NumericSequence<'static> {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        NumericSequence::from(iter.into_iter().collect::<Vec<_>>())
    }
}

// Equality, ordering and hashing all go through the generic element routines

impl PartialEq<NumericSequence<'_>> for NumericSequence<'_> {
    fn eq(&self, other: &NumericSequence<'_>) -> bool {
        self.equals(other)
    }
}

impl Eq for NumericSequence<'_> {}

impl PartialOrd<NumericSequence<'_>> for NumericSequence<'_> {
    fn partial_cmp(&self, other: &NumericSequence<'_>) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for NumericSequence<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for NumericSequence<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

impl fmt::Display for NumericSequence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for NumericSequence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            NumericSequence::Int32(_) => "Int32",
            NumericSequence::Int16(_) => "Int16",
            NumericSequence::Int8(_) => "Int8",
            NumericSequence::Single(_) => "Single",
            NumericSequence::Empty => "Empty",
            NumericSequence::Concat(_) => "Concat",
            NumericSequence::Section(_) => "Section",
        };
        write!(f, "{}{}", kind, self)
    }
}

impl Serialize for NumericSequence<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for NumericSequence<'static> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<i32>::deserialize(deserializer).map(NumericSequence::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(values: &[i32]) -> NumericSequence<'static> {
        NumericSequence::from(values)
    }

    #[test]
    fn test_get_is_permissive() {
        let s = seq(&[7, 8, 9]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.get(0), 7);
        assert_eq!(s.get(2), 9);
        assert_eq!(s.get(3), 0);
        assert_eq!(s.get(usize::MAX), 0);
        assert_eq!(NumericSequence::Empty.get(0), 0);
    }

    #[test]
    fn test_compact_keeps_values() {
        let s = seq(&[300, -5]);
        assert_eq!(s.mode(), 4);

        let compact = s.compact();
        assert!(matches!(compact, NumericSequence::Int16(_)));
        assert_eq!(compact.mode(), 2);
        assert_eq!(compact.get(0), 300);
        assert_eq!(compact.get(1), -5);
        assert_eq!(compact, s);
    }

    #[test]
    fn test_compact_shapes() {
        assert!(matches!(seq(&[]).compact(), NumericSequence::Empty));
        assert!(matches!(seq(&[70000]).compact(), NumericSequence::Single(70000)));
        assert!(matches!(seq(&[1, -1, 127]).compact(), NumericSequence::Int8(_)));
        assert!(matches!(seq(&[1, 70000]).compact(), NumericSequence::Int32(_)));
    }

    #[test]
    fn test_section() {
        let s = seq(&[1, 2, 3, 4, 5]);
        assert_eq!(s.section(1, 3).to_vec(), vec![2, 3, 4]);
        assert_eq!(s.section(0, 5).to_vec(), vec![1, 2, 3, 4, 5]);
        assert!(s.section(4, 2).is_empty());
        assert!(s.section(5, 1).is_empty());
        assert!(s.section(2, 0).is_empty());
        assert!(s.section(usize::MAX, 2).is_empty());
        assert!(matches!(s.section(1, 2), NumericSequence::Int32(_)));
    }

    #[test]
    fn test_concat() {
        let a = seq(&[1, 2]);
        let b = NumericSequence::from(&[3i8, 4, 5][..]);
        let empty = NumericSequence::Empty;

        assert!(matches!(a.concat(&empty), NumericSequence::Int32(_)));
        assert!(matches!(empty.concat(&b), NumericSequence::Int8(_)));

        let c = a.concat(&b);
        assert!(matches!(c, NumericSequence::Concat(_)));
        assert_eq!(c.len(), 5);
        assert_eq!(c.to_vec(), vec![1, 2, 3, 4, 5]);
        assert_eq!(c.get(5), 0);
        assert_eq!(c.mode(), 4);
    }

    #[test]
    fn test_section_of_concat() {
        let c = seq(&[1, 2]).concat(&seq(&[3, 4])).concat(&NumericSequence::Single(5));

        let straddling = c.section(1, 3);
        assert!(matches!(straddling, NumericSequence::Section(_)));
        assert_eq!(straddling.to_vec(), vec![2, 3, 4]);

        let nested = straddling.section(1, 2);
        assert_eq!(nested.to_vec(), vec![3, 4]);

        assert_eq!(c.section(4, 1).to_vec(), vec![5]);
        assert_eq!(c.section(0, 2).to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_long_concat_chain() {
        let count = 200_000;
        let chain = (0..count).fold(NumericSequence::Empty, |acc, i| {
            acc.concat(&NumericSequence::Single(i))
        });
        assert_eq!(chain.len(), count as usize);
        assert!(chain.depth() <= MAX_DEPTH);
        assert_eq!(chain.get(0), 0);
        assert_eq!(chain.get(123_456), 123_456);
        assert_eq!(chain.get(count as usize - 1), count - 1);

        let compact = chain.compact();
        assert!(matches!(compact, NumericSequence::Int32(_)));
        assert_eq!(compact.len(), count as usize);
        assert_eq!(compact.get(99_999), 99_999);
        drop(chain);
        drop(compact);
    }

    #[test]
    fn test_prepend_chain_and_sections() {
        let chain = (0..50_000).fold(NumericSequence::Empty, |acc, i| {
            NumericSequence::Single(i).concat(&acc)
        });
        assert!(chain.depth() <= MAX_DEPTH);
        assert_eq!(chain.get(0), 49_999);

        // straddling sections add one level and still flatten when joined
        let mut joined = NumericSequence::Empty;
        for start in 0..100 {
            let section = chain.section(start * 10, 500);
            assert!(section.depth() <= MAX_DEPTH + 1);
            joined = joined.concat(&section);
        }
        assert!(joined.depth() <= MAX_DEPTH);
        assert_eq!(joined.len(), 100 * 500);
        assert_eq!(joined.get(500), chain.get(10));
    }

    #[test]
    fn test_short_operands_merge_into_edge() {
        let c = seq(&[1, 2]).concat(&seq(&[3, 4])).concat(&NumericSequence::Single(5));
        assert_eq!(c.depth(), 1);
        assert_eq!(c.to_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_equality_ignores_width() {
        let wide = seq(&[1, -2, 3]);
        let narrow = NumericSequence::from(&[1i8, -2, 3][..]);
        let mid = NumericSequence::from(&[1i16, -2, 3][..]);
        let lazy = seq(&[1]).concat(&seq(&[-2, 3]));

        assert_eq!(wide, narrow);
        assert_eq!(narrow, mid);
        assert_eq!(mid, lazy);
        assert_eq!(wide.hash_code(), lazy.hash_code());
        assert_ne!(wide, seq(&[1, -2]));
    }

    #[test]
    fn test_ordering() {
        assert_eq!(seq(&[1, 2]).compare(&seq(&[1, 3])), Ordering::Less);
        assert_eq!(seq(&[1, 2]).compare(&seq(&[1, 2, 0])), Ordering::Less);
        assert_eq!(seq(&[-1]).compare(&seq(&[0])), Ordering::Less);
        assert_eq!(seq(&[5]).compare(&NumericSequence::Single(5)), Ordering::Equal);
        assert_eq!(NumericSequence::Empty.compare(&seq(&[i32::MIN])), Ordering::Less);
    }

    #[test]
    fn test_from_bytes_borrows() {
        let buffer = [0x00, 0x01, 0x00, 0x02, 0xFF];
        let view = NumericSequence::from_bytes(&buffer, ByteOrder::Big, Width::W16);
        assert_eq!(view.to_vec(), vec![1, 2]);

        let owned = view.into_owned();
        assert_eq!(owned.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_display_and_serde() -> serde_json::Result<()> {
        let s = seq(&[1, -2, 3]);
        assert_eq!(s.to_string(), "[1, -2, 3]");
        assert_eq!(format!("{:?}", NumericSequence::Single(4)), "Single[4]");

        let json = serde_json::to_string(&s)?;
        assert_eq!(json, "[1,-2,3]");
        let back: NumericSequence<'static> = serde_json::from_str(&json)?;
        assert_eq!(back, s);
        Ok(())
    }

    #[test]
    fn test_iter_both_ends() {
        let s = seq(&[1, 2, 3]);
        assert_eq!(s.iter().rev().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(s.iter().len(), 3);
        let collected: NumericSequence<'static> = (0..4).collect();
        assert_eq!(collected.to_vec(), vec![0, 1, 2, 3]);
    }
}
