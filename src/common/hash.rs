//! Hash functions for the cuckoo filter
//!
//! Provides the 128-bit digest the filter is built on (xxHash's `xxh3`
//! variant) plus the derived `primary_index` / `fingerprint` / `displacement`
//! operations.

use xxhash_rust::xxh3::xxh3_128;
use xxhash_rust::xxh64::xxh64;

#[inline]
fn digest(data: &[u8]) -> u128 {
    xxh3_128(data)
}

/// The primary bucket index for an item: the low 64 bits of its `xxh3_128`
/// digest, reduced modulo `capacity`.
#[inline]
pub fn primary_index(data: &[u8], capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (digest(data) as u64 as usize) % capacity
}

/// Computes the `bits`-wide fingerprint of an item from the high bits of its
/// `xxh3_128` digest, most-significant-first. Forces the low bit on so the
/// all-zero "empty slot" sentinel is never produced for a real fingerprint.
#[inline]
pub fn fingerprint(data: &[u8], bits: u32) -> u64 {
    debug_assert!(bits > 0 && bits <= 64);
    let raw = (digest(data) >> (128 - bits)) as u64;
    raw | 1
}

/// The displacement of a fingerprint: `xxh64` of its little-endian bytes,
/// reduced modulo `capacity`. Combined with XOR against the current bucket
/// index, this yields the fingerprint's alternate bucket without needing the
/// original item (partial-key cuckoo hashing).
#[inline]
pub fn displacement(fp: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (xxh64(&fp.to_le_bytes(), 0) as usize) % capacity
}

/// The alternate bucket index for a fingerprint currently held at `index`.
#[inline]
pub fn alt_index(index: usize, fp: u64, capacity: usize) -> usize {
    (index ^ displacement(fp, capacity)) % capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_index_in_range() {
        for capacity in [1usize, 2, 3, 7, 128, 1000] {
            let idx = primary_index(b"some item", capacity);
            assert!(idx < capacity);
        }
    }

    #[test]
    fn test_primary_index_deterministic() {
        let a = primary_index(b"hello world", 256);
        let b = primary_index(b"hello world", 256);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_nonzero() {
        for i in 0..1000u32 {
            let fp = fingerprint(&i.to_le_bytes(), 8);
            assert_ne!(fp, 0);
            assert!(fp < 256);
        }
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint(b"abc", 16);
        let b = fingerprint(b"abc", 16);
        assert_eq!(a, b);
    }

    #[test]
    fn test_displacement_in_range() {
        for capacity in [1usize, 2, 7, 128] {
            assert!(displacement(0xABCD, capacity) < capacity);
        }
    }

    #[test]
    fn test_alt_index_in_range() {
        let capacity = 128usize;
        let fp = fingerprint(b"round trip", 16);
        let i1 = primary_index(b"round trip", capacity);
        let i2 = alt_index(i1, fp, capacity);
        assert!(i2 < capacity);
    }
}
