// crates/core/src/sample.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling cadence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    #[serde(default = "default_average_interval_ms")]
    pub average_interval_ms: u64,
}

fn default_sample_interval_ms() -> u64 {
    500
}

fn default_average_interval_ms() -> u64 {
    2500
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            average_interval_ms: default_average_interval_ms(),
        }
    }
}

impl SamplerConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn average_interval(&self) -> Duration {
        Duration::from_millis(self.average_interval_ms)
    }

    /// Number of samples taken per averaging window.
    pub fn samples_per_window(&self) -> usize {
        if self.sample_interval_ms == 0 {
            return 0;
        }
        (self.average_interval_ms / self.sample_interval_ms) as usize
    }
}

/// A single raw sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub value: i32,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn now(value: i32) -> Self {
        Self {
            value,
            timestamp: Utc::now(),
        }
    }
}

/// Mean of the readings drained from the buffer in one averaging window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Average {
    pub value: i32,
    pub samples: usize,
    pub timestamp: DateTime<Utc>,
}

impl Average {
    /// Integer mean of `values`, `None` when there is nothing to average.
    pub fn from_values(values: &[i32]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
        let mean = sum / values.len() as i64;

        Some(Self {
            value: mean as i32,
            samples: values.len(),
            timestamp: Utc::now(),
        })
    }
}
