//! Client-side cache of region metadata.
//!
//! Region entries are created lazily on first access to a key range,
//! invalidated on any region-level error, and refreshed from the oracle.
//! The by-id map is sharded (dashmap) and the ordered boundary index
//! takes its lock only for map operations, never across an oracle call,
//! so invalidating one region does not serialize lookups of unrelated
//! regions.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rangekv_types::Key;
use rangekv_types::Region;
use rangekv_types::RegionId;
use rangekv_types::TransportError;
use tracing::debug;

use crate::oracle::RegionOracle;

pub struct RegionCache {
    oracle: Arc<dyn RegionOracle>,
    /// All cached regions by id.
    regions: DashMap<RegionId, Region>,
    /// Ordered index from range start key to region id, for boundary
    /// lookups.
    by_start: RwLock<BTreeMap<Key, RegionId>>,
}

impl RegionCache {
    pub fn new(oracle: Arc<dyn RegionOracle>) -> Self {
        Self {
            oracle,
            regions: DashMap::new(),
            by_start: RwLock::new(BTreeMap::new()),
        }
    }

    /// Locate the region currently covering `key`, consulting the oracle
    /// on a cache miss.
    pub async fn locate_key(&self, key: &[u8]) -> Result<Region, TransportError> {
        if let Some(region) = self.lookup_cached(key) {
            return Ok(region);
        }

        let region = self.oracle.region_for_key(key).await?;
        debug!(region_id = region.id, epoch = region.epoch.version, "cached region from oracle");
        self.insert(region.clone());
        Ok(region)
    }

    /// Drop a region from the cache. The next lookup touching its range
    /// goes back to the oracle.
    pub fn invalidate(&self, region_id: RegionId) {
        match self.regions.remove(&region_id) {
            Some((_, region)) => {
                let mut index = self.by_start.write();
                if index.get(&region.range.start) == Some(&region_id) {
                    index.remove(&region.range.start);
                }
            }
            None => {
                // No by-id entry to recover the start key from; sweep the
                // index for dangling references.
                self.by_start.write().retain(|_, id| *id != region_id);
            }
        }
        debug!(region_id, "invalidated cached region");
    }

    /// Number of regions currently cached.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    fn lookup_cached(&self, key: &[u8]) -> Option<Region> {
        let candidate = {
            let index = self.by_start.read();
            index
                .range::<[u8], _>((Bound::Unbounded, Bound::Included(key)))
                .next_back()
                .map(|(_, &id)| id)
        }?;

        // Copy out of the shard guard; touching the map again on this
        // thread while the guard is held would deadlock.
        let cached = self.regions.get(&candidate).map(|entry| entry.value().clone())?;
        if cached.contains(key) {
            Some(cached)
        } else {
            // The candidate stops short of the key: a plain miss, not
            // staleness. The oracle fills the gap; eviction waits for a
            // region error.
            None
        }
    }

    fn insert(&self, region: Region) {
        let start = region.range.start.clone();
        let id = region.id;
        self.regions.insert(id, region);
        self.by_start.write().insert(start, id);
    }
}
