// crates/config/src/loader.rs

use crate::SensorringConfig;
use sensorring_buffering::OverflowPolicy;
use sensorring_core::{SensorError, SensorResult};
use std::path::Path;
use toml::{Table, Value};

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_file(path: &Path) -> SensorResult<SensorringConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> SensorResult<SensorringConfig> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to_file(path: &Path, config: &SensorringConfig) -> SensorResult<()> {
        let content = toml::to_string_pretty(config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Defaults overridden by `SENSORRING_*` environment variables.
    pub fn load_from_env() -> SensorResult<SensorringConfig> {
        Self::apply_env(SensorringConfig::default(), |key| std::env::var(key).ok())
    }

    pub fn apply_env<F>(mut config: SensorringConfig, lookup: F) -> SensorResult<SensorringConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("SENSORRING_LOG_LEVEL") {
            config.app.log_level = level;
        }
        if let Some(capacity) = lookup("SENSORRING_BUFFER_CAPACITY") {
            config.buffer.capacity = capacity
                .parse()
                .map_err(|_| SensorError::Config("Invalid buffer capacity".to_string()))?;
            config.buffer.max_capacity = config.buffer.max_capacity.max(config.buffer.capacity);
        }
        if let Some(max) = lookup("SENSORRING_BUFFER_MAX_CAPACITY") {
            config.buffer.max_capacity = max
                .parse()
                .map_err(|_| SensorError::Config("Invalid buffer max capacity".to_string()))?;
        }
        if let Some(policy) = lookup("SENSORRING_OVERFLOW") {
            config.buffer.overflow = match policy.to_ascii_lowercase().as_str() {
                "reject" => OverflowPolicy::Reject,
                "overwrite" => OverflowPolicy::Overwrite,
                other => {
                    return Err(SensorError::Config(format!(
                        "Unknown overflow policy: {}",
                        other
                    )))
                }
            };
        }
        if let Some(interval) = lookup("SENSORRING_SAMPLE_INTERVAL_MS") {
            config.sampler.sample_interval_ms = interval
                .parse()
                .map_err(|_| SensorError::Config("Invalid sample interval".to_string()))?;
        }
        if let Some(interval) = lookup("SENSORRING_AVERAGE_INTERVAL_MS") {
            config.sampler.average_interval_ms = interval
                .parse()
                .map_err(|_| SensorError::Config("Invalid average interval".to_string()))?;
        }

        Ok(config)
    }

    /// Lays the keys present in `override_path` over `base`, table by table.
    ///
    /// A missing override file leaves `base` as it is.
    pub fn merge_configs(
        base: SensorringConfig,
        override_path: Option<&Path>,
    ) -> SensorResult<SensorringConfig> {
        let path = match override_path {
            Some(path) if path.exists() => path,
            _ => return Ok(base),
        };

        let overrides: Table = std::fs::read_to_string(path)?.parse()?;
        let mut merged = Value::try_from(&base)?;
        match &mut merged {
            Value::Table(table) => merge_tables(table, overrides),
            _ => {
                return Err(SensorError::Config(
                    "configuration did not serialize to a table".to_string(),
                ))
            }
        }

        Ok(merged.try_into()?)
    }
}

fn merge_tables(base: &mut Table, overrides: Table) {
    for (key, value) in overrides {
        match value {
            Value::Table(nested) => match base.get_mut(&key) {
                Some(Value::Table(existing)) => merge_tables(existing, nested),
                _ => {
                    base.insert(key, Value::Table(nested));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config = ConfigLoader::parse(
            r#"
            [buffer]
            capacity = 8
            overflow = "overwrite"
            "#,
        )
        .unwrap();

        assert_eq!(config.buffer.capacity, 8);
        assert_eq!(config.buffer.overflow, OverflowPolicy::Overwrite);
        assert_eq!(config.sampler.sample_interval_ms, 500);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn malformed_files_are_parse_errors() {
        let err = ConfigLoader::parse("[buffer\ncapacity = ").unwrap_err();
        assert!(matches!(err, SensorError::TomlParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ConfigLoader::load_from_file(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, SensorError::Io(_)));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = ConfigLoader::apply_env(
            SensorringConfig::default(),
            env(&[
                ("SENSORRING_BUFFER_CAPACITY", "16"),
                ("SENSORRING_OVERFLOW", "Overwrite"),
                ("SENSORRING_SAMPLE_INTERVAL_MS", "100"),
            ]),
        )
        .unwrap();

        assert_eq!(config.buffer.capacity, 16);
        assert_eq!(config.buffer.max_capacity, 16);
        assert_eq!(config.buffer.overflow, OverflowPolicy::Overwrite);
        assert_eq!(config.sampler.sample_interval_ms, 100);
    }

    #[test]
    fn env_rejects_garbage() {
        let err = ConfigLoader::apply_env(
            SensorringConfig::default(),
            env(&[("SENSORRING_BUFFER_CAPACITY", "many")]),
        )
        .unwrap_err();
        assert!(matches!(err, SensorError::Config(_)));

        let err = ConfigLoader::apply_env(
            SensorringConfig::default(),
            env(&[("SENSORRING_OVERFLOW", "drop")]),
        )
        .unwrap_err();
        assert!(matches!(err, SensorError::Config(_)));
    }

    #[test]
    fn merge_without_override_keeps_base() {
        let base = SensorringConfig::default();
        let merged =
            ConfigLoader::merge_configs(base.clone(), Some(Path::new("does/not/exist.toml")))
                .unwrap();
        assert_eq!(merged, base);
        assert_eq!(ConfigLoader::merge_configs(base.clone(), None).unwrap(), base);
    }

    #[test]
    fn merge_keeps_base_fields_missing_from_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        std::fs::write(&path, "[sampler]\nsample_interval_ms = 100\n").unwrap();

        let mut base = SensorringConfig::default();
        base.buffer.capacity = 42;
        base.buffer.max_capacity = 64;
        base.app.max_windows = Some(3);

        let merged = ConfigLoader::merge_configs(base, Some(&path)).unwrap();

        assert_eq!(merged.sampler.sample_interval_ms, 100);
        assert_eq!(merged.sampler.average_interval_ms, 2500);
        assert_eq!(merged.buffer.capacity, 42);
        assert_eq!(merged.buffer.max_capacity, 64);
        assert_eq!(merged.app.max_windows, Some(3));
    }

    #[test]
    fn merge_rejects_malformed_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        std::fs::write(&path, "[buffer\n").unwrap();

        let err = ConfigLoader::merge_configs(SensorringConfig::default(), Some(&path)).unwrap_err();
        assert!(matches!(err, SensorError::TomlParse(_)));
    }
}
