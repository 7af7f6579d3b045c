//! Bounded retry backoff with a per-call budget.
//!
//! Every logical client call constructs one [`Backoffer`]; sub-operations
//! fanned out concurrently fork it with the remaining budget. Each
//! failure category has its own base and cap: region-miss retries are
//! short because fresh metadata is usually one oracle round-trip away,
//! transport retries are longer to let a node recover.

use std::time::Duration;

use rand::Rng;
use rangekv_types::RawKvError;
use tokio::time::sleep;
use tracing::debug;

/// Failure category driving the backoff interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffKind {
    /// Cached region metadata was stale (epoch mismatch, split, moved).
    RegionMiss,
    /// The addressed store is no longer the region's leader.
    NotLeader,
    /// The request could not be delivered.
    Transport,
}

impl BackoffKind {
    fn base_ms(self) -> u64 {
        match self {
            BackoffKind::RegionMiss => 2,
            BackoffKind::NotLeader => 5,
            BackoffKind::Transport => 100,
        }
    }

    fn cap_ms(self) -> u64 {
        match self {
            BackoffKind::RegionMiss => 500,
            BackoffKind::NotLeader => 1000,
            BackoffKind::Transport => 2000,
        }
    }

    fn index(self) -> usize {
        match self {
            BackoffKind::RegionMiss => 0,
            BackoffKind::NotLeader => 1,
            BackoffKind::Transport => 2,
        }
    }
}

/// Retry state machine scoped to one logical client call.
#[derive(Debug)]
pub struct Backoffer {
    budget_ms: u64,
    slept_ms: u64,
    attempts: [u32; 3],
}

impl Backoffer {
    /// Create a backoffer with a fresh cumulative sleep budget.
    pub fn new(budget_ms: u64) -> Self {
        Self {
            budget_ms,
            slept_ms: 0,
            attempts: [0; 3],
        }
    }

    /// Budget not yet consumed by sleeps.
    pub fn remaining_ms(&self) -> u64 {
        self.budget_ms.saturating_sub(self.slept_ms)
    }

    /// Hand a concurrent sub-operation the remaining budget.
    pub fn fork(&self) -> Self {
        Self::new(self.remaining_ms())
    }

    /// Sleep before the next retry, or fail with a timeout error when the
    /// cumulative budget is exhausted.
    pub async fn backoff(&mut self, kind: BackoffKind) -> Result<(), RawKvError> {
        let attempt = self.attempts[kind.index()];
        self.attempts[kind.index()] += 1;

        let exp = kind
            .base_ms()
            .saturating_mul(1u64 << attempt.min(16))
            .min(kind.cap_ms());
        let sleep_ms = {
            let mut rng = rand::rng();
            rng.random_range(exp / 2 + 1..=exp.max(1))
        };

        if self.slept_ms + sleep_ms > self.budget_ms {
            return Err(RawKvError::Timeout {
                duration_ms: self.budget_ms,
            });
        }

        debug!(?kind, attempt, sleep_ms, "backing off before retry");
        sleep(Duration::from_millis(sleep_ms)).await;
        self.slept_ms += sleep_ms;
        Ok(())
    }
}
