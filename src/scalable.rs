//! Scalable Cuckoo Filter: an unbounded-capacity cuckoo filter built from a
//! growing stack of fixed-capacity [`Filter`]s.
//!
//! A single `Filter` cannot be resized in place once full; a
//! `ScalableFilter` works around that by keeping an ordered sequence of
//! filters with geometrically increasing capacity (`capacity(Fk) =
//! capacity(F0) * 2^k`), routing new insertions to the newest filter that
//! still has headroom and allocating a new, bigger filter only when none do.
//! Membership and deletion fan out across every filter in the stack, newest
//! first, since items are biased toward newer filters by construction.
//!
//! # Examples
//!
//! ```
//! use cuckoo_filter::ScalableFilter;
//!
//! let mut filter = ScalableFilter::new(1000, 1e-6).unwrap();
//! for i in 0..5000u32 {
//!     filter.insert(&i.to_le_bytes()).unwrap();
//! }
//! assert!(filter.contains(&42u32.to_le_bytes()));
//! assert!(filter.num_filters() >= 1);
//! ```

use crate::common::validation::validate_min_size;
use crate::common::{CuckooError, Result};
use crate::filter::{Filter, DEFAULT_BUCKET_SIZE, DEFAULT_MAX_KICKS};

/// Capacity multiplier applied each time a new filter is allocated.
pub const SCALE_FACTOR: usize = 2;

/// Load factor above which a filter is skipped by insertion rather than
/// driven into its expensive relocation-failure path.
pub const DEFAULT_LOAD_THRESHOLD: f64 = 0.90;

/// An ordered, growing sequence of fixed-capacity cuckoo filters presented
/// as a single unbounded-capacity filter.
pub struct ScalableFilter {
    filters: Vec<Filter>,
    error_rate: f64,
    bucket_size: usize,
    max_kicks: usize,
    load_threshold: f64,
}

impl ScalableFilter {
    /// Constructs a scalable filter whose first underlying filter has
    /// `initial_capacity` buckets, the default bucket size (4) and kick
    /// budget (500).
    pub fn new(initial_capacity: usize, error_rate: f64) -> Result<Self> {
        Self::with_params(
            initial_capacity,
            error_rate,
            DEFAULT_BUCKET_SIZE,
            DEFAULT_MAX_KICKS,
        )
    }

    /// Constructs a scalable filter with explicit `bucket_size` and
    /// `max_kicks`, shared by every filter subsequently allocated.
    pub fn with_params(
        initial_capacity: usize,
        error_rate: f64,
        bucket_size: usize,
        max_kicks: usize,
    ) -> Result<Self> {
        let first = Filter::with_params(initial_capacity, error_rate, bucket_size, max_kicks)?;
        Ok(Self {
            filters: vec![first],
            error_rate,
            bucket_size,
            max_kicks,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
        })
    }

    /// Number of underlying filters currently allocated. Nondecreasing over
    /// the lifetime of the scalable filter.
    pub fn num_filters(&self) -> usize {
        self.filters.len()
    }

    /// Total live fingerprints across every underlying filter.
    pub fn size(&self) -> usize {
        self.filters.iter().map(Filter::size).sum()
    }

    /// Total slots (`capacity * bucket_size`) across every underlying filter.
    pub fn total_slots(&self) -> usize {
        self.filters
            .iter()
            .map(|f| f.capacity() * f.bucket_size())
            .sum()
    }

    /// `size / total_slots`, in `[0.0, 1.0]`.
    pub fn load_factor(&self) -> f64 {
        self.size() as f64 / self.total_slots() as f64
    }

    /// Bucket size shared by every underlying filter.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Fingerprint width in bits, shared by every underlying filter.
    pub fn fingerprint_size(&self) -> u32 {
        self.filters[0].fingerprint_size()
    }

    /// Inserts `item` into the newest underlying filter with headroom,
    /// allocating a new filter with `SCALE_FACTOR` times the capacity of the
    /// current newest filter if none has room.
    ///
    /// # Errors
    ///
    /// Only returns an error if insertion into a freshly allocated, empty
    /// filter itself fails — per the filter's contract this cannot happen
    /// under correct operation, so this path signals
    /// [`CuckooError::Inconsistency`].
    pub fn insert(&mut self, item: &[u8]) -> Result<usize> {
        for filter in self.filters.iter_mut().rev() {
            if filter.load_factor() > self.load_threshold {
                continue;
            }
            match filter.insert(item) {
                Ok(idx) => return Ok(idx),
                Err(CuckooError::CapacityExhausted { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        let new_capacity = self
            .filters
            .last()
            .expect("a scalable filter always holds at least one filter")
            .capacity()
            * SCALE_FACTOR;
        let mut new_filter =
            Filter::with_params(new_capacity, self.error_rate, self.bucket_size, self.max_kicks)?;
        let result = new_filter.insert(item);
        self.filters.push(new_filter);

        result.map_err(|e| {
            CuckooError::Inconsistency(format!(
                "insertion into a freshly allocated filter must succeed but failed: {e}"
            ))
        })
    }

    /// `true` if any underlying filter reports the item present.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.filters.iter().rev().any(|f| f.contains(item))
    }

    /// Removes one occurrence of `item` from the first (newest-first)
    /// underlying filter that holds a matching fingerprint.
    pub fn delete(&mut self, item: &[u8]) -> bool {
        for filter in self.filters.iter_mut().rev() {
            if filter.delete(item) {
                return true;
            }
        }
        false
    }

    /// Serializes every underlying filter, newest-last, to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.filters.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.error_rate.to_le_bytes());
        out.extend_from_slice(&(self.bucket_size as u64).to_le_bytes());
        out.extend_from_slice(&(self.max_kicks as u64).to_le_bytes());
        out.extend_from_slice(&self.load_threshold.to_le_bytes());
        for filter in &self.filters {
            let bytes = filter.to_bytes();
            out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
            out.extend_from_slice(&bytes);
        }
        out
    }

    /// Restores a scalable filter previously produced by
    /// [`ScalableFilter::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        const HEADER_LEN: usize = 8 + 8 + 8 + 8 + 8;
        validate_min_size(bytes.len(), HEADER_LEN)?;

        let num_filters = u64::from_le_bytes(bytes[0..8].try_into().unwrap()) as usize;
        let error_rate = f64::from_le_bytes(bytes[8..16].try_into().unwrap());
        let bucket_size = u64::from_le_bytes(bytes[16..24].try_into().unwrap()) as usize;
        let max_kicks = u64::from_le_bytes(bytes[24..32].try_into().unwrap()) as usize;
        let load_threshold = f64::from_le_bytes(bytes[32..40].try_into().unwrap());

        let mut offset = HEADER_LEN;
        let mut filters = Vec::with_capacity(num_filters);
        for _ in 0..num_filters {
            validate_min_size(bytes.len(), offset + 8)?;
            let len = u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap()) as usize;
            offset += 8;
            validate_min_size(bytes.len(), offset + len)?;
            filters.push(Filter::from_bytes(&bytes[offset..offset + len])?);
            offset += len;
        }

        if filters.is_empty() {
            return Err(CuckooError::InvalidParameter {
                param: "bytes".to_string(),
                value: "0".to_string(),
                constraint: "a scalable filter must contain at least one filter".to_string(),
            });
        }

        Ok(Self {
            filters,
            error_rate,
            bucket_size,
            max_kicks,
            load_threshold,
        })
    }
}
