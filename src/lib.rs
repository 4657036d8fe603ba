//! cuckoo-filter: a space-efficient probabilistic set-membership structure
//! with the same semantics as the Cuckoo filter of Fan et al. (2014).
//!
//! Given an item (an opaque byte string), a [`Filter`] supports insertion,
//! deletion, and membership testing with a bounded false-positive
//! probability and no false negatives for items actually present. Unlike a
//! classic Bloom filter it supports deletion and, at low target error
//! rates, uses less space.
//!
//! A single [`Filter`] has a fixed capacity set at construction time; a
//! [`ScalableFilter`] composes a growing sequence of fixed-capacity filters
//! to present an effectively unbounded-capacity structure.
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! cuckoo-filter = "0.1"
//! ```
//!
//! ```rust
//! use cuckoo_filter::Filter;
//!
//! let mut filter = Filter::new(1000, 1e-6).unwrap();
//!
//! let words = ["foo", "bar", "xylophone", "milagro"];
//! for word in &words {
//!     filter.insert(word.as_bytes()).unwrap();
//! }
//!
//! for word in &words {
//!     assert!(filter.contains(word.as_bytes()));
//! }
//!
//! assert!(filter.delete(b"foo"));
//! assert!(!filter.contains(b"foo"));
//! ```
//!
//! # References
//!
//! - Fan, B., Andersen, D. G., Kaminsky, M., & Mitzenmacher, M. D. (2014).
//!   "Cuckoo Filter: Practically Better Than Bloom." CoNEXT '14.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod common;
mod filter;
mod scalable;
mod table;

pub use common::hash;
pub use common::{CuckooError, Result};
pub use filter::{Filter, DEFAULT_BUCKET_SIZE, DEFAULT_MAX_KICKS};
pub use scalable::{ScalableFilter, DEFAULT_LOAD_THRESHOLD, SCALE_FACTOR};
pub use table::BitTable;

#[cfg(test)]
mod tests {
    #[test]
    fn test_library_compiles() {
        // Ensures the module tree wires up; real coverage lives in each
        // module's own #[cfg(test)] block and in tests/.
    }
}
