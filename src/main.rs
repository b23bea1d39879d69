// src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use sensorring::SensorringApp;
use sensorring_config::{ConfigLoader, SensorringConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_PATH: &str = "config/sensorring.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration decides the default log level, so it comes first
    let (config, source) = load_config()?;

    init_logging(&config.app.log_level)?;

    info!("Starting sensorring v{}", env!("CARGO_PKG_VERSION"));
    info!(source = %source, "Configuration loaded");

    let mut app = SensorringApp::new(config)?;
    app.run().await?;

    info!("sensorring shut down successfully");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sensorring=debug,{}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

fn load_config() -> Result<(SensorringConfig, String)> {
    let path = match std::env::var_os("SENSORRING_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            anyhow::ensure!(path.exists(), "config file {} not found", path.display());
            Some(path)
        }
        None => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|path| path.exists()),
    };

    let config = ConfigLoader::merge_configs(SensorringConfig::default(), path.as_deref())
        .context("loading configuration")?;
    let config = ConfigLoader::apply_env(config, |key| std::env::var(key).ok())?;

    let source = path.map_or_else(|| "defaults".to_string(), |path| path.display().to_string());
    Ok((config, source))
}
