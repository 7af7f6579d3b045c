//! Region-routing raw key-value client.
//!
//! Turns single-key and key-range operations into one or more per-region
//! remote calls, reconciles results across region boundaries, and retries
//! transparently when cached region metadata is stale or a target region
//! has split or moved.
//!
//! The authoritative metadata source and the wire transport are trait
//! seams ([`RegionOracle`], [`RawTransport`]); this crate owns the cache,
//! the backoff policy, and the range-splitting executor behind
//! [`RawClient`].

mod backoff;
mod config;
mod oracle;
mod raw;
mod region_cache;
mod transport;

pub use backoff::BackoffKind;
pub use backoff::Backoffer;
pub use config::ClientConfig;
pub use oracle::RegionOracle;
pub use raw::RawClient;
pub use region_cache::RegionCache;
pub use transport::RawRequest;
pub use transport::RawRequestBody;
pub use transport::RawResponse;
pub use transport::RawResponseBody;
pub use transport::RawTransport;
pub use transport::RequestContext;
