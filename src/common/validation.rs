//! Validation utilities for construction-time parameter bounds checking

use crate::common::{CuckooError, Result};

/// Maximum bucket capacity (2^31 - 1): well beyond any realistic filter,
/// but bounds pathological allocation requests.
pub const MAX_CAPACITY: usize = (1usize << 31) - 1;

/// Validate that capacity (number of buckets) is positive and within limits.
pub fn validate_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(CuckooError::InvalidParameter {
            param: "capacity".to_string(),
            value: capacity.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if capacity > MAX_CAPACITY {
        return Err(CuckooError::InvalidParameter {
            param: "capacity".to_string(),
            value: capacity.to_string(),
            constraint: format!("must not exceed {MAX_CAPACITY}"),
        });
    }
    Ok(())
}

/// Validate that `error_rate` is a valid probability in the open interval
/// `(0.0, 1.0)`.
pub fn validate_error_rate(error_rate: f64) -> Result<()> {
    if !(error_rate > 0.0 && error_rate < 1.0) {
        return Err(CuckooError::InvalidParameter {
            param: "error_rate".to_string(),
            value: error_rate.to_string(),
            constraint: "must be in range (0.0, 1.0) (exclusive)".to_string(),
        });
    }
    Ok(())
}

/// Validate that `bucket_size` is positive.
pub fn validate_bucket_size(bucket_size: usize) -> Result<()> {
    if bucket_size == 0 {
        return Err(CuckooError::InvalidParameter {
            param: "bucket_size".to_string(),
            value: bucket_size.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validate minimum required bytes for a deserialization header.
pub fn validate_min_size(actual: usize, required: usize) -> Result<()> {
    if actual < required {
        return Err(CuckooError::InvalidParameter {
            param: "bytes".to_string(),
            value: actual.to_string(),
            constraint: format!("insufficient data: need at least {required} bytes"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_capacity_valid() {
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(1_000_000).is_ok());
    }

    #[test]
    fn test_validate_capacity_invalid() {
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(MAX_CAPACITY + 1).is_err());
    }

    #[test]
    fn test_validate_error_rate_valid() {
        assert!(validate_error_rate(0.01).is_ok());
        assert!(validate_error_rate(0.999).is_ok());
    }

    #[test]
    fn test_validate_error_rate_invalid() {
        assert!(validate_error_rate(0.0).is_err());
        assert!(validate_error_rate(1.0).is_err());
        assert!(validate_error_rate(-0.1).is_err());
    }

    #[test]
    fn test_validate_bucket_size() {
        assert!(validate_bucket_size(0).is_err());
        assert!(validate_bucket_size(4).is_ok());
    }

    #[test]
    fn test_validate_min_size() {
        assert!(validate_min_size(10, 16).is_err());
        assert!(validate_min_size(16, 16).is_ok());
    }
}
