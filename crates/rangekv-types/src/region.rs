//! Region metadata: the unit of keyspace partitioning and routing.

use serde::Deserialize;
use serde::Serialize;

use crate::key::KeyRange;

/// Unique identifier for a region.
pub type RegionId = u64;

/// Unique identifier for a storage node.
pub type StoreId = u64;

/// Version counter on a region's metadata.
///
/// Bumped whenever the region's boundaries change (split or merge).
/// A request carrying an epoch older than the region's current one is
/// rejected by the serving node, which is how clients learn their cached
/// routing metadata is stale.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionEpoch {
    pub version: u64,
}

impl RegionEpoch {
    pub fn new(version: u64) -> Self {
        Self { version }
    }

    /// The epoch after a boundary change.
    pub fn bumped(self) -> Self {
        Self {
            version: self.version + 1,
        }
    }
}

/// A contiguous, non-overlapping shard of the keyspace.
///
/// At any instant every key belongs to exactly one region. Splits replace
/// one region with two adjacent regions whose ranges union to the
/// original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    pub id: RegionId,
    pub range: KeyRange,
    pub epoch: RegionEpoch,
    /// The store currently serving this region's leader.
    pub leader_store: StoreId,
}

impl Region {
    pub fn new(id: RegionId, range: KeyRange, epoch: RegionEpoch, leader_store: StoreId) -> Self {
        Self {
            id,
            range,
            epoch,
            leader_store,
        }
    }

    /// Check if a key is owned by this region.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.range.contains(key)
    }
}
