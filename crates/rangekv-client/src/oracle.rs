//! Contract for the authoritative region metadata source.

use async_trait::async_trait;
use rangekv_types::Region;
use rangekv_types::TransportError;

/// Authoritative source of region metadata (the cluster's placement
/// service). Consulted only on cache miss or after an invalidation; the
/// region returned for a key is the one currently covering it.
#[async_trait]
pub trait RegionOracle: Send + Sync {
    async fn region_for_key(&self, key: &[u8]) -> Result<Region, TransportError>;
}
