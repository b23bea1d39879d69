// crates/config/src/validator.rs

use crate::SensorringConfig;
use sensorring_core::{SensorError, SensorResult};
use tracing::warn;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &SensorringConfig) -> SensorResult<()> {
        // Buffer
        if config.buffer.capacity == 0 {
            return Err(SensorError::Config("Buffer capacity must be > 0".to_string()));
        }
        if config.buffer.max_capacity < config.buffer.capacity {
            return Err(SensorError::Config(
                "Buffer max_capacity must be >= capacity".to_string(),
            ));
        }

        // Sampler
        if config.sampler.sample_interval_ms == 0 {
            return Err(SensorError::Config("Sample interval must be > 0".to_string()));
        }
        if config.sampler.average_interval_ms < config.sampler.sample_interval_ms {
            return Err(SensorError::Config(
                "Average interval must be >= sample interval".to_string(),
            ));
        }
        if config.sampler.samples_per_window() > config.buffer.max_capacity {
            warn!(
                samples_per_window = config.sampler.samples_per_window(),
                max_capacity = config.buffer.max_capacity,
                "Buffer cannot hold a full averaging window; samples will be {}",
                match config.buffer.overflow {
                    sensorring_buffering::OverflowPolicy::Reject => "rejected",
                    sensorring_buffering::OverflowPolicy::Overwrite => "overwritten",
                }
            );
        }

        // App
        if !LOG_LEVELS.contains(&config.app.log_level.to_ascii_lowercase().as_str()) {
            return Err(SensorError::Config(format!(
                "Unknown log level: {}",
                config.app.log_level
            )));
        }
        if config.app.max_windows == Some(0) {
            return Err(SensorError::Config("max_windows must be > 0 when set".to_string()));
        }

        Ok(())
    }

    pub fn validate_runtime_change(
        old: &SensorringConfig,
        new: &SensorringConfig,
    ) -> SensorResult<()> {
        // Buffers only grow
        if new.buffer.capacity < old.buffer.capacity {
            return Err(SensorError::Config(
                "Cannot shrink buffer capacity at runtime".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConfigValidator::validate(&SensorringConfig::default()).is_ok());
    }

    #[test]
    fn rejects_inconsistent_buffer_limits() {
        let mut config = SensorringConfig::default();
        config.buffer.capacity = 10;
        config.buffer.max_capacity = 4;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn rejects_bad_intervals() {
        let mut config = SensorringConfig::default();
        config.sampler.sample_interval_ms = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        let mut config = SensorringConfig::default();
        config.sampler.average_interval_ms = 100;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = SensorringConfig::default();
        config.app.log_level = "loud".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
