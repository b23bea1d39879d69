// crates/observability/src/lib.rs

use sensorring_buffering::DiagnosticSink;
use sensorring_core::SensorResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub mod metrics;
pub mod sink;

pub use metrics::{MetricType, Metrics};
pub use sink::MetricsSink;

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            service_name: "sensorring".to_string(),
        }
    }
}

/// Metrics collector
pub struct MetricsCollector {
    config: ObservabilityConfig,
    metrics: Arc<Metrics>,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::with_config(ObservabilityConfig::default())
    }

    pub fn with_config(config: ObservabilityConfig) -> Self {
        info!(
            service = %config.service_name,
            metrics_enabled = config.metrics_enabled,
            "Metrics collector initialised"
        );

        Self {
            config,
            metrics: Arc::new(Metrics::new()),
            start_time: Instant::now(),
        }
    }

    /// Wraps `inner` so buffer diagnostics are counted, unless metrics are disabled.
    pub fn instrument<T: 'static>(
        &self,
        inner: Arc<dyn DiagnosticSink<T>>,
    ) -> Arc<dyn DiagnosticSink<T>> {
        if !self.config.metrics_enabled {
            return inner;
        }
        Arc::new(MetricsSink::new(self.metrics.clone(), inner))
    }

    pub fn record(&self, metric: MetricType, value: f64) {
        if self.config.metrics_enabled {
            self.metrics.record(metric, value);
        }
    }

    pub fn add(&self, metric: MetricType, value: f64) {
        if self.config.metrics_enabled {
            self.metrics.add(metric, value);
        }
    }

    pub fn increment(&self, metric: MetricType) {
        self.add(metric, 1.0);
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn get_health_status(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service: self.config.service_name.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            metrics: self.metrics.get_summary(),
        }
    }

    pub fn health_json(&self) -> SensorResult<String> {
        Ok(serde_json::to_string(&self.get_health_status())?)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub service: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub metrics: MetricsSummary,
}

#[derive(Debug, Default, Serialize)]
pub struct MetricsSummary {
    pub samples_written: u64,
    pub samples_pushed: u64,
    pub writes_rejected: u64,
    pub overwrites: u64,
    pub pops: u64,
    pub empty_reads: u64,
    pub resizes: u64,
    pub averages_computed: u64,
    pub source_errors: u64,
    pub last_average: Option<f64>,
}
