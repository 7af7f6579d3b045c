//! In-process mock cluster for exercising the client's routing paths.
//!
//! One logical store serves every region. The mock enforces the same
//! per-request checks a real storage node performs (region existence,
//! epoch match, leadership, key ownership), so stale client metadata
//! surfaces as region errors and drives the client's invalidate-and-retry
//! path exactly as a live cluster would.

mod mock_cluster;

pub use mock_cluster::MOCK_STORE_ID;
pub use mock_cluster::MockCluster;

/// Install a fmt subscriber honoring `RUST_LOG`. Safe to call from every
/// test; only the first call in the process wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
