//! Validation for raw operations against fixed size limits.
//!
//! Every check runs before any network call; a validation failure is
//! never retried.

use crate::error::RawKvError;
use crate::key::Key;
use crate::key::Value;
use crate::limits::MAX_BATCH_KEYS;
use crate::limits::MAX_KEY_SIZE;
use crate::limits::MAX_SCAN_LIMIT;
use crate::limits::MAX_VALUE_SIZE;

/// Validate a single key: non-empty and within the size limit.
pub fn validate_key(key: &[u8]) -> Result<(), RawKvError> {
    if key.is_empty() {
        return Err(RawKvError::EmptyKey);
    }
    if key.len() > MAX_KEY_SIZE as usize {
        return Err(RawKvError::KeyTooLarge {
            size: key.len(),
            max: MAX_KEY_SIZE,
        });
    }
    Ok(())
}

/// Validate a value to be written: non-empty (the empty value is the
/// store's absence sentinel) and within the size limit.
pub fn validate_value(value: &[u8]) -> Result<(), RawKvError> {
    if value.is_empty() {
        return Err(RawKvError::EmptyValue);
    }
    if value.len() > MAX_VALUE_SIZE as usize {
        return Err(RawKvError::ValueTooLarge {
            size: value.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(())
}

/// Validate parallel key/value sequences for a batch write.
pub fn validate_batch(keys: &[Key], values: &[Value]) -> Result<(), RawKvError> {
    if keys.len() != values.len() {
        return Err(RawKvError::MismatchedBatch {
            keys: keys.len(),
            values: values.len(),
        });
    }
    if keys.len() > MAX_BATCH_KEYS as usize {
        return Err(RawKvError::BatchTooLarge {
            size: keys.len(),
            max: MAX_BATCH_KEYS,
        });
    }
    for key in keys {
        validate_key(key)?;
    }
    for value in values {
        validate_value(value)?;
    }
    Ok(())
}

/// Validate a scan result limit.
pub fn validate_scan_limit(limit: u32) -> Result<(), RawKvError> {
    if limit == 0 || limit > MAX_SCAN_LIMIT {
        return Err(RawKvError::InvalidScanLimit {
            limit,
            max: MAX_SCAN_LIMIT,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_rejects_empty() {
        assert_eq!(validate_key(b""), Err(RawKvError::EmptyKey));
    }

    #[test]
    fn test_validate_key_rejects_oversized() {
        let key = vec![b'k'; MAX_KEY_SIZE as usize + 1];
        assert!(matches!(validate_key(&key), Err(RawKvError::KeyTooLarge { .. })));
    }

    #[test]
    fn test_validate_key_accepts_boundary() {
        let key = vec![b'k'; MAX_KEY_SIZE as usize];
        assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn test_validate_value_rejects_empty() {
        assert_eq!(validate_value(b""), Err(RawKvError::EmptyValue));
    }

    #[test]
    fn test_validate_batch_rejects_mismatched_lengths() {
        let keys = vec![b"k1".to_vec(), b"k2".to_vec()];
        let values = vec![b"v1".to_vec()];
        assert_eq!(
            validate_batch(&keys, &values),
            Err(RawKvError::MismatchedBatch { keys: 2, values: 1 })
        );
    }

    #[test]
    fn test_validate_batch_rejects_empty_value() {
        let keys = vec![b"k1".to_vec()];
        let values = vec![Vec::new()];
        assert_eq!(validate_batch(&keys, &values), Err(RawKvError::EmptyValue));
    }

    #[test]
    fn test_validate_batch_rejects_oversized_batch() {
        let keys: Vec<_> = (0..=MAX_BATCH_KEYS).map(|i| format!("k{i}").into_bytes()).collect();
        let values: Vec<_> = (0..=MAX_BATCH_KEYS).map(|i| format!("v{i}").into_bytes()).collect();
        assert!(matches!(validate_batch(&keys, &values), Err(RawKvError::BatchTooLarge { .. })));
    }

    #[test]
    fn test_validate_scan_limit() {
        assert!(matches!(validate_scan_limit(0), Err(RawKvError::InvalidScanLimit { .. })));
        assert!(validate_scan_limit(1).is_ok());
        assert!(validate_scan_limit(MAX_SCAN_LIMIT).is_ok());
        assert!(matches!(
            validate_scan_limit(MAX_SCAN_LIMIT + 1),
            Err(RawKvError::InvalidScanLimit { .. })
        ));
    }
}
