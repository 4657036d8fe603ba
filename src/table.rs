//! Bit-packed bucket table: the dense store a [`Filter`](crate::filter::Filter)
//! is built on.
//!
//! A `BitTable` owns a single contiguous bit vector of length
//! `capacity * bucket_size * fingerprint_bits` bits and exposes slot-level
//! primitives (probe-insert, match, delete, find-and-replace, random-swap)
//! addressed by `(bucket_index, slot_index)`. There are no per-bucket heap
//! objects: slot `(i, j)` occupies the bit range
//! `[(i * bucket_size + j) * fingerprint_bits, (i * bucket_size + j + 1) * fingerprint_bits)`
//! of the underlying `Vec<u8>`.

use rand::Rng;

#[inline]
fn get_bits(data: &[u8], start: usize, nbits: u32) -> u64 {
    let mut result: u64 = 0;
    for k in 0..nbits {
        let gidx = start + k as usize;
        let byte = data[gidx / 8];
        let bit = (byte >> (gidx % 8)) & 1;
        result |= u64::from(bit) << k;
    }
    result
}

#[inline]
fn set_bits(data: &mut [u8], start: usize, nbits: u32, value: u64) {
    for k in 0..nbits {
        let gidx = start + k as usize;
        let bit = ((value >> k) & 1) as u8;
        let byte_idx = gidx / 8;
        let mask = 1u8 << (gidx % 8);
        if bit == 1 {
            data[byte_idx] |= mask;
        } else {
            data[byte_idx] &= !mask;
        }
    }
}

/// A dense, bit-packed table of fingerprint slots grouped into buckets.
#[derive(Clone, Debug)]
pub struct BitTable {
    capacity: usize,
    bucket_size: usize,
    fingerprint_bits: u32,
    bits: Vec<u8>,
}

impl BitTable {
    /// Creates a zeroed table for `capacity` buckets of `bucket_size` slots,
    /// each slot `fingerprint_bits` wide.
    pub fn new(capacity: usize, bucket_size: usize, fingerprint_bits: u32) -> Self {
        let total_bits = capacity * bucket_size * fingerprint_bits as usize;
        let total_bytes = total_bits.div_ceil(8);
        Self {
            capacity,
            bucket_size,
            fingerprint_bits,
            bits: vec![0u8; total_bytes],
        }
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots per bucket.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Fingerprint width in bits.
    pub fn fingerprint_bits(&self) -> u32 {
        self.fingerprint_bits
    }

    #[inline]
    fn slot_offset(&self, bucket: usize, slot: usize) -> usize {
        (bucket * self.bucket_size + slot) * self.fingerprint_bits as usize
    }

    #[inline]
    fn get(&self, bucket: usize, slot: usize) -> u64 {
        get_bits(&self.bits, self.slot_offset(bucket, slot), self.fingerprint_bits)
    }

    #[inline]
    fn set(&mut self, bucket: usize, slot: usize, value: u64) {
        let offset = self.slot_offset(bucket, slot);
        set_bits(&mut self.bits, offset, self.fingerprint_bits, value);
    }

    /// Scans the `bucket_size` slots of bucket `i` in order and writes `fp`
    /// into the first empty (all-zero) slot. Returns `false` if the bucket
    /// has no empty slot.
    pub fn probe_insert(&mut self, bucket: usize, fp: u64) -> bool {
        for slot in 0..self.bucket_size {
            if self.get(bucket, slot) == 0 {
                self.set(bucket, slot, fp);
                return true;
            }
        }
        false
    }

    /// Returns `true` if bucket `i` holds an exact match of `fp` in any slot.
    pub fn contains(&self, bucket: usize, fp: u64) -> bool {
        (0..self.bucket_size).any(|slot| self.get(bucket, slot) == fp)
    }

    /// Zeroes the first slot in bucket `i` matching `fp`. Returns `true` if a
    /// match was found and removed.
    pub fn delete(&mut self, bucket: usize, fp: u64) -> bool {
        for slot in 0..self.bucket_size {
            if self.get(bucket, slot) == fp {
                self.set(bucket, slot, 0);
                return true;
            }
        }
        false
    }

    /// Overwrites the first slot in bucket `i` matching `old` with `new`.
    /// Returns `true` if a match was found.
    pub fn find_and_replace(&mut self, bucket: usize, old: u64, new: u64) -> bool {
        for slot in 0..self.bucket_size {
            if self.get(bucket, slot) == old {
                self.set(bucket, slot, new);
                return true;
            }
        }
        false
    }

    /// Chooses a slot in bucket `i` whose contents differ from `fp`
    /// uniformly at random, exchanges it with `fp`, and returns the
    /// displaced value. Returns `None` if every slot in the bucket already
    /// holds `fp` (the swap-degeneracy case of inserting the same item more
    /// than `2 * bucket_size` times; see the crate's module docs).
    pub fn random_swap(&mut self, bucket: usize, fp: u64, rng: &mut impl Rng) -> Option<u64> {
        let candidates: Vec<usize> = (0..self.bucket_size)
            .filter(|&slot| self.get(bucket, slot) != fp)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let slot = candidates[rng.random_range(0..candidates.len())];
        let old = self.get(bucket, slot);
        self.set(bucket, slot, fp);
        Some(old)
    }

    /// Raw bit-packed bytes, for byte-copyable serialization.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Rebuilds a table from its parameters and raw bit-packed bytes.
    /// `bytes.len()` must match the length this table's parameters imply.
    pub fn from_parts(
        capacity: usize,
        bucket_size: usize,
        fingerprint_bits: u32,
        bytes: Vec<u8>,
    ) -> Option<Self> {
        let total_bits = capacity * bucket_size * fingerprint_bits as usize;
        let expected_bytes = total_bits.div_ceil(8);
        if bytes.len() != expected_bytes {
            return None;
        }
        Some(Self {
            capacity,
            bucket_size,
            fingerprint_bits,
            bits: bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_slot_is_zero() {
        let table = BitTable::new(8, 4, 12);
        assert!(!table.contains(0, 0));
    }

    #[test]
    fn test_probe_insert_and_contains() {
        let mut table = BitTable::new(8, 4, 12);
        assert!(table.probe_insert(3, 0xABC));
        assert!(table.contains(3, 0xABC));
        assert!(!table.contains(3, 0xABD));
    }

    #[test]
    fn test_probe_insert_fills_bucket_then_fails() {
        let mut table = BitTable::new(8, 2, 8);
        assert!(table.probe_insert(0, 1));
        assert!(table.probe_insert(0, 2));
        assert!(!table.probe_insert(0, 3));
    }

    #[test]
    fn test_duplicate_fingerprints_occupy_separate_slots() {
        let mut table = BitTable::new(8, 4, 8);
        assert!(table.probe_insert(0, 7));
        assert!(table.probe_insert(0, 7));
        assert!(table.delete(0, 7));
        assert!(table.contains(0, 7));
        assert!(table.delete(0, 7));
        assert!(!table.contains(0, 7));
    }

    #[test]
    fn test_find_and_replace() {
        let mut table = BitTable::new(4, 4, 8);
        table.probe_insert(1, 5);
        assert!(table.find_and_replace(1, 5, 9));
        assert!(table.contains(1, 9));
        assert!(!table.contains(1, 5));
        assert!(!table.find_and_replace(1, 5, 1));
    }

    #[test]
    fn test_random_swap_displaces_existing_value() {
        let mut table = BitTable::new(4, 4, 8);
        for fp in 1..=4u64 {
            table.probe_insert(2, fp);
        }
        let mut rng = SmallRng::seed_from_u64(1);
        let displaced = table.random_swap(2, 9, &mut rng).unwrap();
        assert!((1..=4).contains(&displaced));
        assert!(table.contains(2, 9));
    }

    #[test]
    fn test_random_swap_degenerate_returns_none() {
        let mut table = BitTable::new(4, 2, 8);
        table.probe_insert(0, 3);
        table.probe_insert(0, 3);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(table.random_swap(0, 3, &mut rng), None);
    }

    #[test]
    fn test_bit_packing_round_trip_preserves_adjacent_buckets() {
        let mut table = BitTable::new(4, 4, 13); // non-byte-aligned width
        table.probe_insert(0, 0x1FFF);
        table.probe_insert(1, 0x0AAA);
        assert!(table.contains(0, 0x1FFF));
        assert!(table.contains(1, 0x0AAA));
        assert!(!table.contains(0, 0x0AAA));
    }

    #[test]
    fn test_from_parts_rejects_wrong_length() {
        assert!(BitTable::from_parts(8, 4, 12, vec![0u8; 3]).is_none());
        let table = BitTable::new(8, 4, 12);
        let bytes = table.as_bytes().to_vec();
        assert!(BitTable::from_parts(8, 4, 12, bytes).is_some());
    }
}
