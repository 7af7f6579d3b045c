//! Mock cluster: region table plus an in-memory ordered store.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use parking_lot::Mutex;
use rangekv_client::RawRequest;
use rangekv_client::RawRequestBody;
use rangekv_client::RawResponse;
use rangekv_client::RawResponseBody;
use rangekv_client::RawTransport;
use rangekv_client::RegionOracle;
use rangekv_types::Key;
use rangekv_types::KeyRange;
use rangekv_types::KvPair;
use rangekv_types::Region;
use rangekv_types::RegionEpoch;
use rangekv_types::RegionError;
use rangekv_types::RegionId;
use rangekv_types::StoreId;
use rangekv_types::TransportError;
use rangekv_types::Value;

/// The single store id every region's leader lives on.
pub const MOCK_STORE_ID: StoreId = 1;

struct ClusterState {
    /// Regions indexed by range start key; they partition the keyspace.
    regions: BTreeMap<Key, Region>,
    /// The backing store, shared by all regions.
    data: BTreeMap<Key, Value>,
    next_region_id: RegionId,
}

impl ClusterState {
    fn region_covering(&self, key: &[u8]) -> Option<&Region> {
        self.regions
            .range::<[u8], _>((Bound::Unbounded, Bound::Included(key)))
            .next_back()
            .map(|(_, region)| region)
            .filter(|region| region.contains(key))
    }
}

/// Single-store cluster with splittable regions and fault injection.
pub struct MockCluster {
    state: Mutex<ClusterState>,
    inject_failures: AtomicU32,
    fail_always: AtomicBool,
}

impl MockCluster {
    /// A cluster with one region covering the full keyspace.
    pub fn new() -> Self {
        let mut regions = BTreeMap::new();
        regions.insert(
            Vec::new(),
            Region::new(1, KeyRange::full(), RegionEpoch::new(1), MOCK_STORE_ID),
        );
        Self {
            state: Mutex::new(ClusterState {
                regions,
                data: BTreeMap::new(),
                next_region_id: 2,
            }),
            inject_failures: AtomicU32::new(0),
            fail_always: AtomicBool::new(false),
        }
    }

    /// Split the region covering `split_key` at that key. The left half
    /// keeps its id with the epoch bumped; the right half gets a fresh
    /// id. Splitting at a region's start key is a no-op. Clients holding
    /// the old epoch see `EpochNotMatch` on their next request.
    pub fn split(&self, split_key: &[u8]) {
        let mut state = self.state.lock();
        let Some(region) = state.region_covering(split_key) else {
            return;
        };
        let Some((left_range, right_range)) = region.range.split_at(split_key) else {
            return;
        };
        let start = region.range.start.clone();
        let right_id = state.next_region_id;
        state.next_region_id += 1;

        let left = state.regions.get_mut(&start).unwrap();
        left.range = left_range;
        left.epoch = left.epoch.bumped();
        let leader_store = left.leader_store;

        state.regions.insert(
            right_range.start.clone(),
            Region::new(right_id, right_range, RegionEpoch::new(1), leader_store),
        );
    }

    pub fn region_count(&self) -> usize {
        self.state.lock().regions.len()
    }

    /// Snapshot of the backing store, ascending by key.
    pub fn contents(&self) -> Vec<KvPair> {
        self.state
            .lock()
            .data
            .iter()
            .map(|(key, value)| KvPair::new(key.clone(), value.clone()))
            .collect()
    }

    /// Fail the next `n` dispatches with a connect error.
    pub fn inject_transport_errors(&self, n: u32) {
        self.inject_failures.store(n, Ordering::SeqCst);
    }

    /// Fail every dispatch until cleared; used for budget-exhaustion
    /// tests.
    pub fn fail_always(&self, fail: bool) {
        self.fail_always.store(fail, Ordering::SeqCst);
    }

    fn take_injected_failure(&self) -> bool {
        if self.fail_always.load(Ordering::SeqCst) {
            return true;
        }
        self.inject_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for MockCluster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegionOracle for MockCluster {
    async fn region_for_key(&self, key: &[u8]) -> Result<Region, TransportError> {
        self.state
            .lock()
            .region_covering(key)
            .cloned()
            .ok_or(TransportError::ConnectionClosed { store_id: MOCK_STORE_ID })
    }
}

#[async_trait]
impl RawTransport for MockCluster {
    async fn dispatch(&self, store: StoreId, request: RawRequest) -> Result<RawResponse, TransportError> {
        if self.take_injected_failure() {
            return Err(TransportError::ConnectFailed {
                store_id: store,
                reason: "injected failure".to_string(),
            });
        }

        let mut state = self.state.lock();
        let region_id = request.context.region_id;
        let Some(region) = state.regions.values().find(|r| r.id == region_id).cloned() else {
            return Ok(RawResponse::region_error(RegionError::RegionNotFound { region_id }));
        };
        if region.epoch != request.context.epoch {
            return Ok(RawResponse::region_error(RegionError::EpochNotMatch { region_id }));
        }
        if store != region.leader_store {
            return Ok(RawResponse::region_error(RegionError::NotLeader {
                region_id,
                leader: Some(region.leader_store),
            }));
        }

        let body = match request.body {
            RawRequestBody::Get { key } => {
                if !region.contains(&key) {
                    return Ok(RawResponse::region_error(RegionError::KeyNotInRegion { region_id }));
                }
                RawResponseBody::Value {
                    value: state.data.get(&key).cloned(),
                }
            }
            RawRequestBody::Put { key, value } => {
                if !region.contains(&key) {
                    return Ok(RawResponse::region_error(RegionError::KeyNotInRegion { region_id }));
                }
                state.data.insert(key, value);
                RawResponseBody::Empty
            }
            RawRequestBody::Delete { key } => {
                if !region.contains(&key) {
                    return Ok(RawResponse::region_error(RegionError::KeyNotInRegion { region_id }));
                }
                state.data.remove(&key);
                RawResponseBody::Empty
            }
            RawRequestBody::BatchPut { pairs } => {
                if pairs.iter().any(|pair| !region.contains(&pair.key)) {
                    return Ok(RawResponse::region_error(RegionError::KeyNotInRegion { region_id }));
                }
                for pair in pairs {
                    state.data.insert(pair.key, pair.value);
                }
                RawResponseBody::Empty
            }
            RawRequestBody::Scan { start_key, limit } => {
                let from = if start_key.as_slice() > region.range.start.as_slice() {
                    start_key
                } else {
                    region.range.start.clone()
                };
                let pairs = state
                    .data
                    .range::<[u8], _>((Bound::Included(from.as_slice()), Bound::Unbounded))
                    .take_while(|(key, _)| region.contains(key))
                    .take(limit as usize)
                    .map(|(key, value)| KvPair::new(key.clone(), value.clone()))
                    .collect();
                RawResponseBody::Pairs { pairs }
            }
            RawRequestBody::DeleteRange { range } => {
                if let Some(clipped) = range.intersect(&region.range) {
                    let doomed: Vec<Key> = state
                        .data
                        .range::<[u8], _>((Bound::Included(clipped.start.as_slice()), Bound::Unbounded))
                        .take_while(|(key, _)| clipped.contains(key))
                        .map(|(key, _)| key.clone())
                        .collect();
                    for key in doomed {
                        state.data.remove(&key);
                    }
                }
                RawResponseBody::Empty
            }
        };

        Ok(RawResponse::ok(body))
    }
}

#[cfg(test)]
mod tests {
    use rangekv_client::RequestContext;

    use super::*;

    fn get_request(region: &Region, key: &[u8]) -> RawRequest {
        RawRequest {
            context: RequestContext {
                region_id: region.id,
                epoch: region.epoch,
            },
            body: RawRequestBody::Get { key: key.to_vec() },
        }
    }

    #[tokio::test]
    async fn test_split_partitions_keyspace() {
        let cluster = MockCluster::new();
        cluster.split(b"m");
        assert_eq!(cluster.region_count(), 2);

        let left = cluster.region_for_key(b"a").await.unwrap();
        let right = cluster.region_for_key(b"z").await.unwrap();
        assert_ne!(left.id, right.id);
        assert_eq!(left.range.end, right.range.start);
    }

    #[tokio::test]
    async fn test_split_at_region_start_is_noop() {
        let cluster = MockCluster::new();
        cluster.split(b"m");
        cluster.split(b"m");
        assert_eq!(cluster.region_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_epoch_rejected() {
        let cluster = MockCluster::new();
        let stale = cluster.region_for_key(b"a").await.unwrap();
        cluster.split(b"m");

        let response = cluster.dispatch(MOCK_STORE_ID, get_request(&stale, b"a")).await.unwrap();
        assert_eq!(response.region_error, Some(RegionError::EpochNotMatch { region_id: stale.id }));
    }

    #[tokio::test]
    async fn test_unknown_region_rejected() {
        let cluster = MockCluster::new();
        let mut region = cluster.region_for_key(b"a").await.unwrap();
        region.id = 99;

        let response = cluster.dispatch(MOCK_STORE_ID, get_request(&region, b"a")).await.unwrap();
        assert_eq!(response.region_error, Some(RegionError::RegionNotFound { region_id: 99 }));
    }

    #[tokio::test]
    async fn test_wrong_store_rejected_as_not_leader() {
        let cluster = MockCluster::new();
        let region = cluster.region_for_key(b"a").await.unwrap();

        let response = cluster.dispatch(7, get_request(&region, b"a")).await.unwrap();
        assert_eq!(
            response.region_error,
            Some(RegionError::NotLeader {
                region_id: region.id,
                leader: Some(MOCK_STORE_ID),
            })
        );
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let cluster = MockCluster::new();
        cluster.inject_transport_errors(1);
        let region = cluster.region_for_key(b"a").await.unwrap();

        let first = cluster.dispatch(MOCK_STORE_ID, get_request(&region, b"a")).await;
        assert!(first.is_err());
        let second = cluster.dispatch(MOCK_STORE_ID, get_request(&region, b"a")).await;
        assert!(second.is_ok());
    }
}
