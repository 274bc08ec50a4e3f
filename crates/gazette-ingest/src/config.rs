//! Configuration for episode building and submission

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Episode batching granularity
///
/// Controls episode size and how many submission calls a circular
/// costs: one episode per clause, or one per circular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One episode per numbered clause
    #[default]
    PerClause,

    /// One episode carrying the whole circular
    PerCircular,
}

/// Configuration for the ingestion layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Episode batching granularity
    pub granularity: Granularity,

    /// Also emit a leading metadata episode per circular, carrying the
    /// inferred metadata and any preamble text
    pub emit_metadata_episode: bool,

    /// Maximum concurrent in-flight submissions
    pub max_in_flight: usize,

    /// Per-submission timeout (seconds)
    pub submit_timeout_secs: u64,

    /// Retry budget for transient failures
    pub max_retries: u32,

    /// Base backoff delay (milliseconds), doubled per attempt
    pub retry_base_ms: u64,

    /// Backoff delay cap (milliseconds)
    pub retry_max_ms: u64,
}

impl IngestConfig {
    /// Get the per-submission timeout as a Duration
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    /// Backoff delay before retry number `attempt` (1-based), doubling
    /// from the base and capped at the maximum
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let ms = self
            .retry_base_ms
            .saturating_mul(1u64 << shift)
            .min(self.retry_max_ms);
        Duration::from_millis(ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_in_flight == 0 {
            return Err("max_in_flight must be greater than 0".to_string());
        }
        if self.submit_timeout_secs == 0 {
            return Err("submit_timeout_secs must be greater than 0".to_string());
        }
        if self.retry_base_ms == 0 {
            return Err("retry_base_ms must be greater than 0".to_string());
        }
        if self.retry_max_ms < self.retry_base_ms {
            return Err("retry_max_ms cannot be below retry_base_ms".to_string());
        }
        Ok(())
    }

    /// Throttled preset for rate-limited services: one submission at a
    /// time with a larger retry budget
    pub fn throttled() -> Self {
        Self {
            max_in_flight: 1,
            max_retries: 6,
            ..Default::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::PerClause,
            emit_metadata_episode: false,
            max_in_flight: 4,
            submit_timeout_secs: 30,
            max_retries: 5,
            retry_base_ms: 500,
            retry_max_ms: 30_000,
        }
    }
}
