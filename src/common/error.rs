//! Error types for cuckoo filter operations

use std::fmt;

/// Errors that can occur during cuckoo filter operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CuckooError {
    /// Invalid parameter provided to a constructor
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Invalid value provided
        value: String,
        /// Constraint that was violated
        constraint: String,
    },

    /// The kick budget was exhausted while inserting an item.
    ///
    /// The table is guaranteed to be bit-for-bit identical to its state
    /// before the failing `insert` call.
    CapacityExhausted {
        /// Live fingerprints at the time of the failed insert
        size: usize,
        /// Total slots (`capacity * bucket_size`) at the time of the failed insert
        capacity: usize,
    },

    /// The rollback path could not find a fingerprint it had just placed.
    ///
    /// This signals a programming bug or a data race under unsupported
    /// concurrent use; the filter should be considered poisoned.
    Inconsistency(String),
}

impl fmt::Display for CuckooError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CuckooError::InvalidParameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "invalid parameter '{param}': value '{value}' {constraint}"
                )
            }
            CuckooError::CapacityExhausted { size, capacity } => {
                write!(
                    f,
                    "cuckoo filter is at capacity ({size}/{capacity}), insertion failed after exhausting the kick budget"
                )
            }
            CuckooError::Inconsistency(msg) => write!(f, "inconsistent filter state: {msg}"),
        }
    }
}

impl std::error::Error for CuckooError {}

/// Result type alias for cuckoo filter operations
pub type Result<T> = std::result::Result<T, CuckooError>;
