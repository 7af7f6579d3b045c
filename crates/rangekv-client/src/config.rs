//! Client configuration.

use serde::Deserialize;
use serde::Serialize;

/// Timeouts and retry budget for one client.
///
/// Each logical client call gets a fresh backoff budget; the request
/// timeout bounds the whole call including all retries and fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Deadline for one logical client call in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Cumulative backoff budget per logical client call in milliseconds.
    /// When retries have slept this long in total, the call fails with a
    /// timeout error.
    #[serde(default = "default_backoff_budget_ms")]
    pub backoff_budget_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            backoff_budget_ms: default_backoff_budget_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    40_000
}

fn default_backoff_budget_ms() -> u64 {
    20_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout_ms, 40_000);
        assert_eq!(config.backoff_budget_ms, 20_000);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.backoff_budget_ms, default_backoff_budget_ms());
    }
}
