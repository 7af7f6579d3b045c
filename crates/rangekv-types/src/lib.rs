//! Shared types for the rangekv client.
//!
//! Keys and values are opaque byte strings. Regions are contiguous,
//! non-overlapping shards of the keyspace identified by an id and an
//! epoch; the epoch detects stale cached routing metadata.

mod error;
mod key;
mod limits;
mod region;
pub mod validation;

pub use error::RawKvError;
pub use error::RegionError;
pub use error::TransportError;
pub use key::Key;
pub use key::KeyRange;
pub use key::KvPair;
pub use key::Value;
pub use limits::MAX_BATCH_KEYS;
pub use limits::MAX_KEY_SIZE;
pub use limits::MAX_SCAN_LIMIT;
pub use limits::MAX_VALUE_SIZE;
pub use region::Region;
pub use region::RegionEpoch;
pub use region::RegionId;
pub use region::StoreId;
