//! Search configuration

use crate::indexing::MAX_ARRAY_QUERY_VALUES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Combination search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Combinations per batch query (capped at the backend limit of 10)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Keys excluded by a narrowed query (capped at 10)
    #[serde(default = "default_max_exclusions")]
    pub max_exclusions: usize,

    /// Share of batch groups sent in the first, unoptimized wave
    #[serde(default = "default_unoptimized_fraction")]
    pub unoptimized_fraction: f64,

    /// Timeout for a single batch query (milliseconds)
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,

    /// Narrow second-wave queries with keys found by the first wave
    #[serde(default = "default_true")]
    pub optimize_later_batches: bool,
}

impl SearchConfig {
    /// Batch size actually used for queries
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_ARRAY_QUERY_VALUES)
    }

    /// Exclusion count actually used for narrowed queries
    pub fn effective_max_exclusions(&self) -> usize {
        self.max_exclusions.min(MAX_ARRAY_QUERY_VALUES)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }

    /// Number of groups in the first wave: `ceil(groups * fraction)`,
    /// never less than one when there is anything to search
    pub fn first_wave_len(&self, groups: usize) -> usize {
        if groups == 0 {
            return 0;
        }

        let fraction = self.unoptimized_fraction.clamp(0.0, 1.0);
        let wanted = (groups as f64 * fraction).ceil() as usize;
        wanted.clamp(1, groups)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_exclusions: default_max_exclusions(),
            unoptimized_fraction: default_unoptimized_fraction(),
            batch_timeout_ms: default_batch_timeout_ms(),
            optimize_later_batches: true,
        }
    }
}

fn default_batch_size() -> usize {
    MAX_ARRAY_QUERY_VALUES
}

fn default_max_exclusions() -> usize {
    MAX_ARRAY_QUERY_VALUES
}

fn default_unoptimized_fraction() -> f64 {
    1.0 / 3.0
}

fn default_batch_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn max_exclusions(mut self, max: usize) -> Self {
        self.config.max_exclusions = max;
        self
    }

    pub fn unoptimized_fraction(mut self, fraction: f64) -> Self {
        self.config.unoptimized_fraction = fraction;
        self
    }

    pub fn batch_timeout_ms(mut self, millis: u64) -> Self {
        self.config.batch_timeout_ms = millis;
        self
    }

    pub fn optimize_later_batches(mut self, enabled: bool) -> Self {
        self.config.optimize_later_batches = enabled;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
