//! The raw key-value client and its range-splitting executor.
//!
//! Client calls are decomposed into one sub-operation per overlapping
//! region. Each sub-operation runs the shared retry loop: a region error
//! in a response invalidates the cached entry, re-routes against fresh
//! metadata, and redispatches after backoff; a transport error retries
//! with backoff and falls back to a metadata refresh when the failure
//! persists. Routing churn is invisible to the caller on success; the
//! only user-visible failures are validation errors, codec errors, and
//! timeout after the retry budget is gone.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::try_join_all;
use rangekv_types::Key;
use rangekv_types::KeyRange;
use rangekv_types::KvPair;
use rangekv_types::RawKvError;
use rangekv_types::Region;
use rangekv_types::RegionError;
use rangekv_types::RegionId;
use rangekv_types::Value;
use rangekv_types::validation;
use tokio::time::timeout;
use tracing::debug;
use tracing::warn;

use crate::backoff::BackoffKind;
use crate::backoff::Backoffer;
use crate::config::ClientConfig;
use crate::oracle::RegionOracle;
use crate::region_cache::RegionCache;
use crate::transport::RawRequest;
use crate::transport::RawRequestBody;
use crate::transport::RawResponseBody;
use crate::transport::RawTransport;
use crate::transport::RequestContext;

/// Consecutive delivery failures to one region before the cached entry
/// is dropped as a recovery heuristic.
const TRANSPORT_FAILURES_BEFORE_REFRESH: u32 = 3;

/// Raw (non-transactional) key-value client.
///
/// Operations are linearized per region by that region's leader; nothing
/// here sequences operations across regions. Multi-region writes
/// (`batch_put`, `delete_range`) are not atomic across regions: a caller
/// that observes an error after some sub-operations already committed
/// must assume partial application.
///
/// Every call runs under the configured request deadline, and dropping a
/// call's future cancels its outstanding sub-operations; writes already
/// accepted by a region are not rolled back.
pub struct RawClient {
    cache: Arc<RegionCache>,
    transport: Arc<dyn RawTransport>,
    config: ClientConfig,
}

impl RawClient {
    pub fn new(oracle: Arc<dyn RegionOracle>, transport: Arc<dyn RawTransport>) -> Self {
        Self::with_config(oracle, transport, ClientConfig::default())
    }

    pub fn with_config(oracle: Arc<dyn RegionOracle>, transport: Arc<dyn RawTransport>, config: ClientConfig) -> Self {
        Self {
            cache: Arc::new(RegionCache::new(oracle)),
            transport,
            config,
        }
    }

    /// Read one key. An absent key is `Ok(None)`, never an error.
    pub async fn get(&self, key: &[u8]) -> Result<Option<Value>, RawKvError> {
        validation::validate_key(key)?;
        let mut bo = self.backoffer();
        let body = RawRequestBody::Get { key: key.to_vec() };
        let (_, response) = self.with_deadline(self.send_keyed(&mut bo, key, body)).await?;
        match response {
            RawResponseBody::Value { value } => Ok(value),
            _ => Err(RawKvError::UnexpectedResponse { operation: "get" }),
        }
    }

    /// Write one key. Rejects an empty value before any network call;
    /// the raw store reserves the empty value as its absence sentinel.
    pub async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), RawKvError> {
        validation::validate_key(key)?;
        validation::validate_value(value)?;
        let mut bo = self.backoffer();
        let body = RawRequestBody::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        };
        let (_, response) = self.with_deadline(self.send_keyed(&mut bo, key, body)).await?;
        match response {
            RawResponseBody::Empty => Ok(()),
            _ => Err(RawKvError::UnexpectedResponse { operation: "put" }),
        }
    }

    /// Delete one key. Idempotent: deleting an absent key succeeds.
    pub async fn delete(&self, key: &[u8]) -> Result<(), RawKvError> {
        validation::validate_key(key)?;
        let mut bo = self.backoffer();
        let body = RawRequestBody::Delete { key: key.to_vec() };
        let (_, response) = self.with_deadline(self.send_keyed(&mut bo, key, body)).await?;
        match response {
            RawResponseBody::Empty => Ok(()),
            _ => Err(RawKvError::UnexpectedResponse { operation: "delete" }),
        }
    }

    /// Write many pairs, one sub-batch per covering region, dispatched
    /// concurrently. Not atomic across regions (see type docs).
    pub async fn batch_put(&self, keys: Vec<Key>, values: Vec<Value>) -> Result<(), RawKvError> {
        validation::validate_batch(&keys, &values)?;
        let pairs: Vec<KvPair> = keys.into_iter().zip(values).map(|(key, value)| KvPair { key, value }).collect();
        let bo = self.backoffer();
        self.with_deadline(self.send_batch_put(bo, pairs)).await
    }

    /// Scan from `start_key` (inclusive; empty means the beginning of the
    /// keyspace), returning up to `limit` pairs in strictly ascending key
    /// order. Results are identical regardless of how the keyspace is
    /// partitioned into regions at call time.
    pub async fn scan(&self, start_key: &[u8], limit: u32) -> Result<Vec<KvPair>, RawKvError> {
        validation::validate_scan_limit(limit)?;
        let mut bo = self.backoffer();
        self.with_deadline(async {
            let mut results: Vec<KvPair> = Vec::with_capacity(limit as usize);
            let mut cursor = start_key.to_vec();
            loop {
                let remaining = limit - results.len() as u32;
                let body = RawRequestBody::Scan {
                    start_key: cursor.clone(),
                    limit: remaining,
                };
                let (region, response) = self.send_keyed(&mut bo, &cursor, body).await?;
                let RawResponseBody::Pairs { pairs } = response else {
                    return Err(RawKvError::UnexpectedResponse { operation: "scan" });
                };
                results.extend(pairs);

                if results.len() as u32 >= limit || region.range.is_unbounded() {
                    break;
                }
                // This region is exhausted; continue from the next
                // region's start boundary.
                cursor = region.range.end.clone();
            }
            results.truncate(limit as usize);
            Ok(results)
        })
        .await
    }

    /// Delete exactly the keys in `[start, end)`; an empty `end` means
    /// the end of the keyspace. An empty range is a no-op. Per-region
    /// sub-deletes are dispatched concurrently and are not atomic across
    /// regions (see type docs).
    pub async fn delete_range(&self, start: &[u8], end: &[u8]) -> Result<(), RawKvError> {
        let range = KeyRange::new(start.to_vec(), end.to_vec());
        if range.is_empty() {
            return Ok(());
        }
        let bo = self.backoffer();
        self.with_deadline(self.send_delete_range(bo, range)).await
    }

    /// The shared per-key retry loop: locate, dispatch, recover from
    /// region and transport errors until success or budget exhaustion.
    async fn send_keyed(
        &self,
        bo: &mut Backoffer,
        key: &[u8],
        body: RawRequestBody,
    ) -> Result<(Region, RawResponseBody), RawKvError> {
        let mut transport_failures = 0u32;
        loop {
            let region = self.locate_with_backoff(bo, key).await?;
            let request = RawRequest {
                context: RequestContext {
                    region_id: region.id,
                    epoch: region.epoch,
                },
                body: body.clone(),
            };
            match self.transport.dispatch(region.leader_store, request).await {
                Ok(response) => match response.region_error {
                    Some(error) => self.handle_region_error(bo, region.id, error).await?,
                    None => return Ok((region, response.body)),
                },
                Err(error) => {
                    transport_failures += 1;
                    warn!(region_id = region.id, error = %error, "transport failure; backing off");
                    bo.backoff(BackoffKind::Transport).await?;
                    if transport_failures >= TRANSPORT_FAILURES_BEFORE_REFRESH {
                        self.cache.invalidate(region.id);
                        transport_failures = 0;
                    }
                }
            }
        }
    }

    fn send_batch_put(&self, mut bo: Backoffer, pairs: Vec<KvPair>) -> BoxFuture<'_, Result<(), RawKvError>> {
        async move {
            let mut groups: BTreeMap<RegionId, (Region, Vec<KvPair>)> = BTreeMap::new();
            for pair in pairs {
                let region = self.locate_with_backoff(&mut bo, &pair.key).await?;
                groups.entry(region.id).or_insert_with(|| (region, Vec::new())).1.push(pair);
            }
            debug!(regions = groups.len(), "dispatching batch put sub-batches");
            let tasks = groups.into_values().map(|(region, group)| self.batch_put_group(bo.fork(), region, group));
            try_join_all(tasks).await?;
            Ok(())
        }
        .boxed()
    }

    async fn batch_put_group(&self, mut bo: Backoffer, region: Region, pairs: Vec<KvPair>) -> Result<(), RawKvError> {
        let mut transport_failures = 0u32;
        loop {
            let request = RawRequest {
                context: RequestContext {
                    region_id: region.id,
                    epoch: region.epoch,
                },
                body: RawRequestBody::BatchPut { pairs: pairs.clone() },
            };
            match self.transport.dispatch(region.leader_store, request).await {
                Ok(response) => match response.region_error {
                    Some(error) => {
                        self.handle_region_error(&mut bo, region.id, error).await?;
                        // The boundary may have moved; re-split just this
                        // sub-batch against fresh metadata.
                        return self.send_batch_put(bo, pairs).await;
                    }
                    None => return Ok(()),
                },
                Err(error) => {
                    transport_failures += 1;
                    warn!(region_id = region.id, error = %error, "batch sub-put transport failure");
                    bo.backoff(BackoffKind::Transport).await?;
                    if transport_failures >= TRANSPORT_FAILURES_BEFORE_REFRESH {
                        self.cache.invalidate(region.id);
                        return self.send_batch_put(bo, pairs).await;
                    }
                }
            }
        }
    }

    fn send_delete_range(&self, mut bo: Backoffer, range: KeyRange) -> BoxFuture<'_, Result<(), RawKvError>> {
        async move {
            // Decompose the range into the sub-ranges intersected with
            // each covering region's own boundaries.
            let mut subranges: Vec<(Region, KeyRange)> = Vec::new();
            let mut cursor = range.start.clone();
            loop {
                let region = self.locate_with_backoff(&mut bo, &cursor).await?;
                let tail = KeyRange::new(cursor.clone(), range.end.clone());
                let Some(sub) = tail.intersect(&region.range) else {
                    break;
                };
                let covered = region.range.is_unbounded() || (!range.end.is_empty() && region.range.end >= range.end);
                let next = region.range.end.clone();
                subranges.push((region, sub));
                if covered {
                    break;
                }
                cursor = next;
            }
            debug!(regions = subranges.len(), "dispatching range delete sub-ranges");
            let tasks = subranges.into_iter().map(|(region, sub)| self.delete_range_group(bo.fork(), region, sub));
            try_join_all(tasks).await?;
            Ok(())
        }
        .boxed()
    }

    async fn delete_range_group(&self, mut bo: Backoffer, region: Region, sub: KeyRange) -> Result<(), RawKvError> {
        let mut transport_failures = 0u32;
        loop {
            let request = RawRequest {
                context: RequestContext {
                    region_id: region.id,
                    epoch: region.epoch,
                },
                body: RawRequestBody::DeleteRange { range: sub.clone() },
            };
            match self.transport.dispatch(region.leader_store, request).await {
                Ok(response) => match response.region_error {
                    Some(error) => {
                        self.handle_region_error(&mut bo, region.id, error).await?;
                        return self.send_delete_range(bo, sub).await;
                    }
                    None => return Ok(()),
                },
                Err(error) => {
                    transport_failures += 1;
                    warn!(region_id = region.id, error = %error, "range sub-delete transport failure");
                    bo.backoff(BackoffKind::Transport).await?;
                    if transport_failures >= TRANSPORT_FAILURES_BEFORE_REFRESH {
                        self.cache.invalidate(region.id);
                        return self.send_delete_range(bo, sub).await;
                    }
                }
            }
        }
    }

    async fn handle_region_error(
        &self,
        bo: &mut Backoffer,
        region_id: RegionId,
        error: RegionError,
    ) -> Result<(), RawKvError> {
        debug!(region_id, error = %error, "region error; invalidating cached entry");
        self.cache.invalidate(region_id);
        let kind = match error {
            RegionError::NotLeader { .. } => BackoffKind::NotLeader,
            _ => BackoffKind::RegionMiss,
        };
        bo.backoff(kind).await
    }

    async fn locate_with_backoff(&self, bo: &mut Backoffer, key: &[u8]) -> Result<Region, RawKvError> {
        loop {
            match self.cache.locate_key(key).await {
                Ok(region) => return Ok(region),
                Err(error) => {
                    warn!(error = %error, "region lookup failed; backing off");
                    bo.backoff(BackoffKind::Transport).await?;
                }
            }
        }
    }

    fn backoffer(&self) -> Backoffer {
        Backoffer::new(self.config.backoff_budget_ms)
    }

    async fn with_deadline<T>(&self, fut: impl Future<Output = Result<T, RawKvError>>) -> Result<T, RawKvError> {
        let duration_ms = self.config.request_timeout_ms;
        match timeout(Duration::from_millis(duration_ms), fut).await {
            Ok(result) => result,
            Err(_) => Err(RawKvError::Timeout { duration_ms }),
        }
    }
}
