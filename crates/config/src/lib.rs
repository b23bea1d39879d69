// crates/config/src/lib.rs

use parking_lot::RwLock;
use sensorring_buffering::BufferConfig;
use sensorring_core::{SamplerConfig, SensorResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub mod loader;
pub mod validator;

pub use loader::ConfigLoader;
pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SensorringConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Stop after this many averaging windows, run until interrupted when unset
    #[serde(default)]
    pub max_windows: Option<u64>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_windows: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_service_name() -> String {
    "sensorring".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: default_metrics_enabled(),
            service_name: default_service_name(),
        }
    }
}

/// Holds the active configuration and validates every change to it
pub struct ConfigManager {
    config_path: PathBuf,
    config: Arc<RwLock<SensorringConfig>>,
}

impl ConfigManager {
    pub fn new(config_path: impl AsRef<Path>) -> SensorResult<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let config = ConfigLoader::load_from_file(&config_path)?;

        ConfigValidator::validate(&config)?;
        info!(path = %config_path.display(), "Configuration loaded");

        Ok(Self {
            config_path,
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config_path: PathBuf::from("config/sensorring.toml"),
            config: Arc::new(RwLock::new(SensorringConfig::default())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn get(&self) -> SensorringConfig {
        self.config.read().clone()
    }

    /// Applies `f` to a copy and keeps the result only if it validates.
    pub fn update<F>(&self, f: F) -> SensorResult<()>
    where
        F: FnOnce(&mut SensorringConfig),
    {
        let mut candidate = self.config.read().clone();
        f(&mut candidate);

        ConfigValidator::validate(&candidate)?;
        ConfigValidator::validate_runtime_change(&self.config.read(), &candidate)?;

        *self.config.write() = candidate;
        Ok(())
    }

    pub fn save(&self) -> SensorResult<()> {
        let config = self.config.read();
        ConfigLoader::save_to_file(&self.config_path, &config)
    }
}
