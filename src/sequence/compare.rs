//! Element-wise hashing, equality and ordering
//!
//! All three work on the logical element values, so a sequence compares
//! equal to any other sequence holding the same integers regardless of
//! width, byte order or laziness.

use super::NumericSequence;
use std::cmp::Ordering;

const HASH_SEED: i32 = 0x811C_9DC5_u32 as i32;
const HASH_PRIME: i32 = 0x0100_0193;

pub(crate) fn hash(sequence: &NumericSequence<'_>) -> i32 {
    sequence
        .iter()
        .fold(HASH_SEED, |h, e| h.wrapping_mul(HASH_PRIME) ^ e)
}

pub(crate) fn equals(a: &NumericSequence<'_>, b: &NumericSequence<'_>) -> bool {
    a.len() == b.len() && a.iter().eq(b.iter())
}

pub(crate) fn compare(a: &NumericSequence<'_>, b: &NumericSequence<'_>) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_of_empty_is_seed() {
        assert_eq!(hash(&NumericSequence::Empty), 0x811C9DC5_u32 as i32);
    }

    #[test]
    fn test_hash_fold() {
        let expected = (0x811C9DC5_u32 as i32).wrapping_mul(0x01000193) ^ 7;
        assert_eq!(hash(&NumericSequence::Single(7)), expected);

        let ab = NumericSequence::from(&[1, 2][..]);
        let ba = NumericSequence::from(&[2, 1][..]);
        assert_ne!(hash(&ab), hash(&ba));
    }

    #[test]
    fn test_compare_prefix() {
        let short = NumericSequence::from(&[4, 5][..]);
        let long = NumericSequence::from(&[4, 5, -100][..]);
        assert_eq!(compare(&short, &long), Ordering::Less);
        assert_eq!(compare(&long, &short), Ordering::Greater);
        assert!(!equals(&short, &long));
    }
}
