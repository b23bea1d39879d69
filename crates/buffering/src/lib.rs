// crates/buffering/src/lib.rs

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod ring_buffer;

pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, Severity, TracingSink};
#[cfg(any(test, feature = "test-util"))]
pub use diagnostics::RecordingSink;
pub use error::{BufferError, BufferResult};
pub use ring_buffer::{RingBuffer, EMPTY_SENTINEL};

/// What to do with a new sample when the buffer is full and cannot grow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Keep the buffered samples and drop the new one
    #[default]
    Reject,
    /// Discard the oldest sample to make room
    Overwrite,
}

/// Sample buffering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_capacity")]
    pub max_capacity: usize,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

fn default_capacity() -> usize {
    5
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_capacity: default_capacity(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl BufferConfig {
    /// Next capacity to grow to from `current`, if growth is still allowed.
    pub fn next_capacity(&self, current: usize) -> Option<usize> {
        if current >= self.max_capacity {
            return None;
        }
        Some(current.saturating_mul(2).min(self.max_capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_doubles_up_to_limit() {
        let config = BufferConfig {
            capacity: 5,
            max_capacity: 12,
            overflow: OverflowPolicy::Reject,
        };

        assert_eq!(config.next_capacity(5), Some(10));
        assert_eq!(config.next_capacity(10), Some(12));
        assert_eq!(config.next_capacity(12), None);
    }

    #[test]
    fn default_config_never_grows() {
        let config = BufferConfig::default();
        assert_eq!(config.next_capacity(config.capacity), None);
    }
}
