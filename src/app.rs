// src/app.rs
use std::sync::Arc;

use sensorring_config::{ConfigValidator, SensorringConfig};
use sensorring_core::{SensorError, SensorResult};
use sensorring_observability::{MetricsCollector, ObservabilityConfig};
use tokio::signal;
use tracing::{error, info};

use crate::pipeline::SamplingPipeline;
use crate::source::{SampleSource, SimulatedLdr};

pub struct SensorringApp {
    config: SensorringConfig,
    pipeline: SamplingPipeline,
    metrics: Arc<MetricsCollector>,
}

impl SensorringApp {
    pub fn new(config: SensorringConfig) -> SensorResult<Self> {
        Self::with_source(config, Box::new(SimulatedLdr::default()))
    }

    pub fn with_source(config: SensorringConfig, source: Box<dyn SampleSource>) -> SensorResult<Self> {
        info!("Initializing sensorring components...");
        ConfigValidator::validate(&config)?;

        let metrics = Arc::new(MetricsCollector::with_config(ObservabilityConfig {
            metrics_enabled: config.observability.metrics_enabled,
            service_name: config.observability.service_name.clone(),
        }));

        let pipeline = SamplingPipeline::new(
            config.sampler.clone(),
            config.buffer.clone(),
            source,
            metrics.clone(),
        )
        .with_max_windows(config.app.max_windows);

        Ok(Self {
            config,
            pipeline,
            metrics,
        })
    }

    pub fn config(&self) -> &SensorringConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub async fn run(&mut self) -> SensorResult<()> {
        info!("Starting sensor sampling...");

        self.pipeline
            .start()
            .await
            .map_err(|e| SensorError::Unknown(e.to_string()))?;

        if self.config.app.max_windows.is_some() {
            tokio::select! {
                result = self.pipeline.wait() => {
                    result.map_err(|e| SensorError::Unknown(e.to_string()))?;
                }
                result = Self::wait_for_shutdown() => result?,
            }
        } else {
            Self::wait_for_shutdown().await?;
        }

        if self.pipeline.is_running() {
            self.pipeline
                .stop()
                .await
                .map_err(|e| SensorError::Unknown(e.to_string()))?;
        }

        match self.metrics.health_json() {
            Ok(json) => info!(health = %json, "Final health status"),
            Err(e) => error!("Failed to render health status: {}", e),
        }

        Ok(())
    }

    async fn wait_for_shutdown() -> SensorResult<()> {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                Ok(())
            }
            Err(e) => {
                error!("Failed to listen for shutdown signal: {}", e);
                Err(SensorError::Io(e))
            }
        }
    }
}
