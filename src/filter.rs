//! Cuckoo Filter: space-efficient membership testing with deletions (Fan et al. 2014)
//!
//! A `Filter` is a single fixed-capacity cuckoo filter. Each item is hashed to
//! a fingerprint and two candidate buckets; insertion uses cuckoo hashing to
//! relocate existing fingerprints when both candidate buckets are full, and
//! rolls the table back to its pre-call state if the kick budget runs out
//! before a slot is found. Deletion removes a matching fingerprint directly,
//! since the alternate bucket is derivable from the fingerprint alone
//! (partial-key cuckoo hashing) — no stored item is needed.
//!
//! # Time Complexity
//!
//! - Insert: `O(1)` amortized, `O(max_kicks)` worst case
//! - Delete: `O(1)`
//! - Query: `O(1)`
//!
//! # Space Complexity
//!
//! `O(capacity * bucket_size * fingerprint_bits)` bits, no per-item overhead.
//!
//! # References
//!
//! - Fan, B., Andersen, D. G., Kaminsky, M., & Mitzenmacher, M. D. (2014).
//!   "Cuckoo Filter: Practically Better Than Bloom." CoNEXT '14.
//!
//! # Examples
//!
//! ```
//! use cuckoo_filter::Filter;
//!
//! let mut filter = Filter::new(1000, 1e-6).unwrap();
//! filter.insert(b"hello").unwrap();
//! assert!(filter.contains(b"hello"));
//! assert!(filter.delete(b"hello"));
//! assert!(!filter.contains(b"hello"));
//! ```

use crate::common::hash;
use crate::common::validation::{validate_bucket_size, validate_capacity, validate_error_rate, validate_min_size};
use crate::common::{CuckooError, Result};
use crate::table::BitTable;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Default number of fingerprint slots per bucket. Closely approaches the
/// best size for target FPP between 0.00001 and 0.002 (Fan et al.); filters
/// targeting a higher FPP are more space-efficient with `bucket_size = 2`.
pub const DEFAULT_BUCKET_SIZE: usize = 4;

/// Default number of relocation attempts before an insert gives up.
pub const DEFAULT_MAX_KICKS: usize = 500;

/// Computes the fingerprint width in bits for a target error rate and bucket
/// size: `f = ceil(log2(1/error_rate) + log2(2 * bucket_size))`.
fn fingerprint_bits_for(error_rate: f64, bucket_size: usize) -> u32 {
    let f = (1.0 / error_rate).log2() + ((2 * bucket_size) as f64).log2();
    f.ceil().max(1.0) as u32
}

/// Fixed-capacity cuckoo filter over a single [`BitTable`].
pub struct Filter {
    capacity: usize,
    bucket_size: usize,
    fingerprint_bits: u32,
    max_kicks: usize,
    error_rate: f64,
    size: usize,
    table: BitTable,
    rng: SmallRng,
}

impl Filter {
    /// Constructs a filter with `capacity` buckets, the default bucket size
    /// (4) and default kick budget (500).
    ///
    /// # Errors
    ///
    /// Returns [`CuckooError::InvalidParameter`] if `capacity == 0` or
    /// `error_rate` is not in `(0.0, 1.0)`.
    pub fn new(capacity: usize, error_rate: f64) -> Result<Self> {
        Self::with_params(capacity, error_rate, DEFAULT_BUCKET_SIZE, DEFAULT_MAX_KICKS)
    }

    /// Constructs a filter with explicit `bucket_size` and `max_kicks`.
    pub fn with_params(
        capacity: usize,
        error_rate: f64,
        bucket_size: usize,
        max_kicks: usize,
    ) -> Result<Self> {
        validate_capacity(capacity)?;
        validate_error_rate(error_rate)?;
        validate_bucket_size(bucket_size)?;

        let fingerprint_bits = fingerprint_bits_for(error_rate, bucket_size);
        if fingerprint_bits > 64 {
            return Err(CuckooError::InvalidParameter {
                param: "error_rate".to_string(),
                value: error_rate.to_string(),
                constraint: "requires a fingerprint wider than 64 bits; choose a larger error_rate".to_string(),
            });
        }

        Ok(Self {
            capacity,
            bucket_size,
            fingerprint_bits,
            max_kicks,
            error_rate,
            size: 0,
            table: BitTable::new(capacity, bucket_size, fingerprint_bits),
            rng: SmallRng::from_os_rng(),
        })
    }

    /// Like [`Filter::with_params`], but seeds the internal random source
    /// deterministically. Intended for tests that need reproducible kick
    /// sequences; the public contract never exposes the RNG's state
    /// otherwise.
    pub fn with_seed(
        capacity: usize,
        error_rate: f64,
        bucket_size: usize,
        max_kicks: usize,
        seed: u64,
    ) -> Result<Self> {
        let mut filter = Self::with_params(capacity, error_rate, bucket_size, max_kicks)?;
        filter.rng = SmallRng::seed_from_u64(seed);
        Ok(filter)
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
    pub fn fingerprint_size(&self) -> u32 {
        self.fingerprint_bits
    }

    /// Target false-positive probability this filter was constructed with.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Number of live fingerprints currently stored.
    pub fn size(&self) -> usize {
        self.size
    }

    /// `true` if no fingerprints are stored.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// `size / (capacity * bucket_size)`, in `[0.0, 1.0]`.
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / (self.capacity * self.bucket_size) as f64
    }

    /// Inserts `item`, returning the bucket it was recorded at.
    ///
    /// # Errors
    ///
    /// Returns [`CuckooError::CapacityExhausted`] if `max_kicks` relocations
    /// were exhausted without finding an empty slot. On that path the table
    /// is restored to its pre-call state before the error is returned.
    pub fn insert(&mut self, item: &[u8]) -> Result<usize> {
        let fp = hash::fingerprint(item, self.fingerprint_bits);
        let i1 = hash::primary_index(item, self.capacity);
        let i2 = hash::alt_index(i1, fp, self.capacity);

        if self.table.probe_insert(i1, fp) {
            self.size += 1;
            return Ok(i1);
        }
        if self.table.probe_insert(i2, fp) {
            self.size += 1;
            return Ok(i2);
        }

        let origin = if self.rng.random::<bool>() { i1 } else { i2 };
        let mut fp_stack: Vec<u64> = vec![fp];
        let mut idx_stack: Vec<usize> = vec![origin];
        let mut current_idx = origin;
        let mut current_fp = fp;

        for _ in 0..self.max_kicks {
            let displaced = match self.table.random_swap(current_idx, current_fp, &mut self.rng) {
                Some(displaced) => displaced,
                // every slot in the bucket already holds current_fp: the
                // same item was inserted more than 2 * bucket_size times.
                // No relocation is possible; fall through to rollback.
                None => break,
            };
            fp_stack.push(displaced);
            current_idx = hash::alt_index(current_idx, displaced, self.capacity);
            idx_stack.push(current_idx);
            current_fp = displaced;

            if self.table.probe_insert(current_idx, current_fp) {
                self.size += 1;
                return Ok(origin);
            }
        }

        self.rollback(&fp_stack, &idx_stack)?;
        Err(CuckooError::CapacityExhausted {
            size: self.size,
            capacity: self.capacity * self.bucket_size,
        })
    }

    /// Undoes every swap performed during a failed relocation, restoring the
    /// table to the state it held before `insert` was called. Unwinds the
    /// kick stacks from the top: each popped `(fp, idx)` pair had displaced
    /// the fingerprint one entry earlier in the stack, so writing that
    /// earlier value back into `idx` reverses the swap.
    fn rollback(&mut self, fp_stack: &[u64], idx_stack: &[usize]) -> Result<()> {
        for k in (0..idx_stack.len().saturating_sub(1)).rev() {
            if !self.table.find_and_replace(idx_stack[k], fp_stack[k], fp_stack[k + 1]) {
                return Err(CuckooError::Inconsistency(format!(
                    "rollback expected fingerprint {} at bucket {} but did not find it",
                    fp_stack[k], idx_stack[k]
                )));
            }
        }
        Ok(())
    }

    /// `true` if a fingerprint matching `item` is present in either
    /// candidate bucket. May return `true` for items never inserted, bounded
    /// by the filter's target error rate; never returns `false` for an item
    /// that is still present.
    pub fn contains(&self, item: &[u8]) -> bool {
        let fp = hash::fingerprint(item, self.fingerprint_bits);
        let i1 = hash::primary_index(item, self.capacity);
        let i2 = hash::alt_index(i1, fp, self.capacity);
        self.table.contains(i1, fp) || self.table.contains(i2, fp)
    }

    /// Removes one occurrence of `item`, if present. Returns `true` iff a
    /// matching fingerprint was found and removed from one of the two
    /// candidate buckets.
    ///
    /// Deleting an item that was never inserted can remove a colliding
    /// item's fingerprint instead (a false-positive delete), with
    /// probability bounded by the filter's error rate.
    pub fn delete(&mut self, item: &[u8]) -> bool {
        let fp = hash::fingerprint(item, self.fingerprint_bits);
        let i1 = hash::primary_index(item, self.capacity);
        let i2 = hash::alt_index(i1, fp, self.capacity);

        if self.table.delete(i1, fp) {
            self.size -= 1;
            true
        } else if self.table.delete(i2, fp) {
            self.size -= 1;
            true
        } else {
            false
        }
    }

    /// Serializes this filter's parameters and bit-packed table to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let table_bytes = self.table.as_bytes();
        let mut out = Vec::with_capacity(40 + table_bytes.len());
        out.extend_from_slice(&(self.capacity as u64).to_le_bytes());
        out.extend_from_slice(&(self.bucket_size as u64).to_le_bytes());
        out.extend_from_slice(&(self.fingerprint_bits as u64).to_le_bytes());
        out.extend_from_slice(&(self.max_kicks as u64).to_le_bytes());
        out.extend_from_slice(&self.error_rate.to_le_bytes());
        out.extend_from_slice(&(self.size as u64).to_le_bytes());
        out.extend_from_slice(&(table_bytes.len() as u64).to_le_bytes());
        out.extend_from_slice(table_bytes);
        out
    }

    /// Restores a filter previously produced by [`Filter::to_bytes`]. The
    /// random source is reseeded from OS entropy; only the table contents
    /// and scalar parameters are round-tripped, per the filter's contract
    /// (fingerprint determinism does not depend on RNG state).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        const HEADER_LEN: usize = 8 * 7;
        validate_min_size(bytes.len(), HEADER_LEN)?;

        let read_u64 = |offset: usize| -> u64 {
            u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
        };

        let capacity = read_u64(0) as usize;
        let bucket_size = read_u64(8) as usize;
        let fingerprint_bits = read_u64(16) as u32;
        let max_kicks = read_u64(24) as usize;
        let error_rate = f64::from_le_bytes(bytes[32..40].try_into().unwrap());
        let size = read_u64(40) as usize;
        let table_len = read_u64(48) as usize;

        validate_min_size(bytes.len(), HEADER_LEN + table_len)?;
        let table_bytes = bytes[HEADER_LEN..HEADER_LEN + table_len].to_vec();

        let table = BitTable::from_parts(capacity, bucket_size, fingerprint_bits, table_bytes)
            .ok_or_else(|| {
                CuckooError::InvalidParameter {
                    param: "bytes".to_string(),
                    value: table_len.to_string(),
                    constraint: "table byte length does not match header parameters".to_string(),
                }
            })?;

        Ok(Self {
            capacity,
            bucket_size,
            fingerprint_bits,
            max_kicks,
            error_rate,
            size,
            table,
            rng: SmallRng::from_os_rng(),
        })
    }
}
