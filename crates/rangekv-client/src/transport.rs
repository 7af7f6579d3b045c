//! Per-region request/response types and the transport seam.
//!
//! Every request carries the region id and epoch the client routed by;
//! the serving node rejects mismatches with a region error in the
//! response instead of a transport failure, which is the signal driving
//! cache invalidation.

use async_trait::async_trait;
use rangekv_types::Key;
use rangekv_types::KeyRange;
use rangekv_types::KvPair;
use rangekv_types::RegionEpoch;
use rangekv_types::RegionError;
use rangekv_types::RegionId;
use rangekv_types::StoreId;
use rangekv_types::TransportError;
use rangekv_types::Value;
use serde::Deserialize;
use serde::Serialize;

/// Routing metadata attached to every per-region request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestContext {
    pub region_id: RegionId,
    pub epoch: RegionEpoch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRequest {
    pub context: RequestContext,
    pub body: RawRequestBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RawRequestBody {
    Get { key: Key },
    Put { key: Key, value: Value },
    Delete { key: Key },
    BatchPut { pairs: Vec<KvPair> },
    /// Bounded scan from `start_key` (clipped to the region) returning at
    /// most `limit` pairs in ascending key order.
    Scan { start_key: Key, limit: u32 },
    /// Delete all keys in `range` intersected with the region.
    DeleteRange { range: KeyRange },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawResponse {
    /// Routing error, if any. When set, the body carries no payload and
    /// the client must re-route and retry.
    pub region_error: Option<RegionError>,
    pub body: RawResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RawResponseBody {
    /// Acknowledgement without payload (writes, deletes).
    Empty,
    /// Point-read payload; `None` means the key is absent.
    Value { value: Option<Value> },
    /// Scan payload, ascending by key, confined to the region.
    Pairs { pairs: Vec<KvPair> },
}

impl RawResponse {
    pub fn ok(body: RawResponseBody) -> Self {
        Self {
            region_error: None,
            body,
        }
    }

    pub fn region_error(error: RegionError) -> Self {
        Self {
            region_error: Some(error),
            body: RawResponseBody::Empty,
        }
    }
}

/// Wire transport delivering one request to one store.
///
/// Implementations own connection management; delivery failures surface
/// as [`TransportError`] and are retried by the client with backoff.
#[async_trait]
pub trait RawTransport: Send + Sync {
    async fn dispatch(&self, store: StoreId, request: RawRequest) -> Result<RawResponse, TransportError>;
}
