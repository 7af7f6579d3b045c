//! Error taxonomy for raw client operations.
//!
//! Three layers with distinct recovery policies:
//! - `RegionError` travels in per-region responses and is recovered by
//!   invalidating cached metadata and re-routing; callers never see one
//!   unless the retry budget runs out.
//! - `TransportError` is a local delivery failure, recovered by backoff.
//! - `RawKvError` is the caller-visible surface: validation failures,
//!   codec failures, and timeout after exhausted retries.

use rangekv_codec::CodecError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::region::RegionId;
use crate::region::StoreId;

/// Routing error reported by a storage node for one per-region request.
#[derive(Debug, Error, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RegionError {
    /// The request carried a stale epoch; the region has split or its
    /// boundaries otherwise changed since the client cached it.
    #[error("region {region_id} epoch not match; client metadata is stale")]
    EpochNotMatch { region_id: RegionId },

    /// The addressed store no longer leads this region.
    #[error("region {region_id} not led by this store; current leader: {leader:?}")]
    NotLeader {
        region_id: RegionId,
        leader: Option<StoreId>,
    },

    /// The region id is unknown to the addressed store.
    #[error("region {region_id} not found on store")]
    RegionNotFound { region_id: RegionId },

    /// A key in the request falls outside the region's current range,
    /// typically because a split moved the boundary.
    #[error("key not in region {region_id}")]
    KeyNotInRegion { region_id: RegionId },
}

/// Local failure delivering a request to a storage node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to connect to store {store_id}: {reason}")]
    ConnectFailed { store_id: StoreId, reason: String },

    #[error("connection to store {store_id} closed mid-request")]
    ConnectionClosed { store_id: StoreId },
}

/// Caller-visible error for raw key-value operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RawKvError {
    #[error("key cannot be empty")]
    EmptyKey,

    /// The raw store reserves the empty value as its absence sentinel.
    #[error("value cannot be empty")]
    EmptyValue,

    #[error("key size {size} exceeds maximum of {max} bytes")]
    KeyTooLarge { size: usize, max: u32 },

    #[error("value size {size} exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: u32 },

    #[error("batch size {size} exceeds maximum of {max} keys")]
    BatchTooLarge { size: usize, max: u32 },

    #[error("batch has {keys} keys but {values} values")]
    MismatchedBatch { keys: usize, values: usize },

    #[error("scan limit {limit} outside 1..={max}")]
    InvalidScanLimit { limit: u32, max: u32 },

    /// Retry budget or call deadline exhausted before the operation
    /// completed.
    #[error("operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// A storage node answered with a body that does not match the
    /// request; indicates a broken transport or node.
    #[error("unexpected response body for {operation}")]
    UnexpectedResponse { operation: &'static str },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_error_epoch_not_match_display() {
        let err = RegionError::EpochNotMatch { region_id: 4 };
        assert_eq!(err.to_string(), "region 4 epoch not match; client metadata is stale");
    }

    #[test]
    fn region_error_not_leader_display() {
        let err = RegionError::NotLeader {
            region_id: 2,
            leader: Some(5),
        };
        assert_eq!(err.to_string(), "region 2 not led by this store; current leader: Some(5)");

        let err = RegionError::NotLeader {
            region_id: 2,
            leader: None,
        };
        assert_eq!(err.to_string(), "region 2 not led by this store; current leader: None");
    }

    #[test]
    fn region_error_not_found_display() {
        let err = RegionError::RegionNotFound { region_id: 9 };
        assert_eq!(err.to_string(), "region 9 not found on store");
    }

    #[test]
    fn transport_error_connect_failed_display() {
        let err = TransportError::ConnectFailed {
            store_id: 1,
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "failed to connect to store 1: connection refused");
    }

    #[test]
    fn raw_kv_error_empty_value_display() {
        assert_eq!(RawKvError::EmptyValue.to_string(), "value cannot be empty");
    }

    #[test]
    fn raw_kv_error_timeout_display() {
        let err = RawKvError::Timeout { duration_ms: 20000 };
        assert_eq!(err.to_string(), "operation timed out after 20000ms");
    }

    #[test]
    fn raw_kv_error_mismatched_batch_display() {
        let err = RawKvError::MismatchedBatch { keys: 3, values: 2 };
        assert_eq!(err.to_string(), "batch has 3 keys but 2 values");
    }

    #[test]
    fn raw_kv_error_from_codec() {
        let err: RawKvError = CodecError::TruncatedEncoding.into();
        assert!(matches!(err, RawKvError::Codec(CodecError::TruncatedEncoding)));
    }

    #[test]
    fn region_error_clone_and_equality() {
        let err1 = RegionError::EpochNotMatch { region_id: 1 };
        let err2 = err1.clone();
        let err3 = RegionError::EpochNotMatch { region_id: 2 };
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
