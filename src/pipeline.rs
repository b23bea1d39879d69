use std::sync::Arc;

use sensorring_buffering::{BufferConfig, TracingSink};
use sensorring_core::{Average, Reading, SamplerConfig, SensorError};
use sensorring_observability::{MetricType, MetricsCollector};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::sampler::{SampleOutcome, Sampler};
use crate::source::SampleSource;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline already running")]
    AlreadyRunning,
    #[error("pipeline not running")]
    NotRunning,
    #[error("sample source already consumed by an earlier run")]
    SourceConsumed,
    #[error("failed to initialise sampler: {0}")]
    Init(#[from] SensorError),
    #[error("pipeline task failed: {0}")]
    Join(String),
}

#[derive(Debug)]
enum ControlMessage {
    Shutdown { ack: oneshot::Sender<()> },
}

#[derive(Debug, Default, Clone)]
pub struct PipelineMetrics {
    samples_stored: usize,
    samples_rejected: usize,
    samples_overwritten: usize,
    buffer_growths: usize,
    source_errors: usize,
    windows: usize,
    series: Vec<i32>,
    last_reading: Option<Reading>,
}

impl PipelineMetrics {
    pub fn samples_stored(&self) -> usize {
        self.samples_stored
    }

    pub fn samples_rejected(&self) -> usize {
        self.samples_rejected
    }

    pub fn samples_overwritten(&self) -> usize {
        self.samples_overwritten
    }

    pub fn buffer_growths(&self) -> usize {
        self.buffer_growths
    }

    pub fn source_errors(&self) -> usize {
        self.source_errors
    }

    /// Averaging windows elapsed, including empty ones.
    pub fn windows(&self) -> usize {
        self.windows
    }

    /// Averages computed so far, oldest first.
    pub fn series(&self) -> &[i32] {
        &self.series
    }

    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    fn record_outcome(&mut self, outcome: SampleOutcome) {
        match outcome {
            SampleOutcome::Stored(_) => self.samples_stored += 1,
            SampleOutcome::Grew { .. } => {
                self.samples_stored += 1;
                self.buffer_growths += 1;
            }
            SampleOutcome::Overwrote { .. } => {
                self.samples_stored += 1;
                self.samples_overwritten += 1;
            }
            SampleOutcome::Rejected(_) => self.samples_rejected += 1,
        }
    }
}

/// Periodically samples a source into a ring buffer and averages it.
pub struct SamplingPipeline {
    sampler_config: SamplerConfig,
    buffer_config: BufferConfig,
    max_windows: Option<u64>,
    source: Option<Box<dyn SampleSource>>,
    collector: Arc<MetricsCollector>,
    control_tx: Option<mpsc::Sender<ControlMessage>>,
    task: Option<JoinHandle<()>>,
    metrics: Arc<Mutex<PipelineMetrics>>,
    average_rx: Option<mpsc::UnboundedReceiver<Average>>,
}

impl SamplingPipeline {
    pub fn new(
        sampler_config: SamplerConfig,
        buffer_config: BufferConfig,
        source: Box<dyn SampleSource>,
        collector: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            sampler_config,
            buffer_config,
            max_windows: None,
            source: Some(source),
            collector,
            control_tx: None,
            task: None,
            metrics: Arc::new(Mutex::new(PipelineMetrics::default())),
            average_rx: None,
        }
    }

    /// Stop on its own after `windows` averaging windows.
    pub fn with_max_windows(mut self, windows: Option<u64>) -> Self {
        self.max_windows = windows;
        self
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub async fn start(&mut self) -> Result<(), PipelineError> {
        if self.task.is_some() {
            return Err(PipelineError::AlreadyRunning);
        }

        let source = self.source.take().ok_or(PipelineError::SourceConsumed)?;
        let sink = self.collector.instrument::<i32>(Arc::new(TracingSink));
        let sampler = Sampler::new(source, self.buffer_config.clone(), sink)?;

        let (control_tx, control_rx) = mpsc::channel(1);
        let (average_tx, average_rx) = mpsc::unbounded_channel();
        let metrics = Arc::clone(&self.metrics);
        let collector = Arc::clone(&self.collector);
        let config = self.sampler_config.clone();
        let max_windows = self.max_windows;

        let task = tokio::spawn(async move {
            run_sampling(
                control_rx,
                sampler,
                config,
                max_windows,
                metrics,
                collector,
                average_tx,
            )
            .await;
        });

        self.control_tx = Some(control_tx);
        self.task = Some(task);
        self.average_rx = Some(average_rx);

        info!(
            sample_interval_ms = self.sampler_config.sample_interval_ms,
            average_interval_ms = self.sampler_config.average_interval_ms,
            "Sampling pipeline started"
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), PipelineError> {
        let tx = self.control_tx.take().ok_or(PipelineError::NotRunning)?;
        let task = self.task.take().ok_or(PipelineError::NotRunning)?;

        let (ack_tx, ack_rx) = oneshot::channel();
        if tx.send(ControlMessage::Shutdown { ack: ack_tx }).await.is_ok() {
            if ack_rx.await.is_err() {
                warn!("Pipeline shutdown acknowledgement was dropped");
            }
        } else {
            debug!("Sampling task already finished");
        }

        task.await.map_err(|err| PipelineError::Join(err.to_string()))?;

        self.log_summary().await;
        Ok(())
    }

    /// Waits for the sampling task to end by itself (see [`with_max_windows`](Self::with_max_windows)).
    ///
    /// Cancel safe: dropping the future leaves the pipeline running.
    pub async fn wait(&mut self) -> Result<(), PipelineError> {
        let task = self.task.as_mut().ok_or(PipelineError::NotRunning)?;
        let result = task.await;

        self.task = None;
        self.control_tx = None;
        result.map_err(|err| PipelineError::Join(err.to_string()))?;

        self.log_summary().await;
        Ok(())
    }

    pub async fn metrics(&self) -> PipelineMetrics {
        self.metrics.lock().await.clone()
    }

    pub fn take_average_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<Average>> {
        self.average_rx.take()
    }

    async fn log_summary(&self) {
        let metrics = self.metrics().await;
        info!(
            samples_stored = metrics.samples_stored(),
            samples_rejected = metrics.samples_rejected(),
            samples_overwritten = metrics.samples_overwritten(),
            buffer_growths = metrics.buffer_growths(),
            source_errors = metrics.source_errors(),
            windows = metrics.windows(),
            "Sampling pipeline stopped"
        );
    }
}

async fn run_sampling(
    mut control_rx: mpsc::Receiver<ControlMessage>,
    mut sampler: Sampler,
    config: SamplerConfig,
    max_windows: Option<u64>,
    metrics: Arc<Mutex<PipelineMetrics>>,
    collector: Arc<MetricsCollector>,
    average_tx: mpsc::UnboundedSender<Average>,
) {
    info!(source = sampler.source_name(), "Sampling loop running");

    let mut sample_tick = time::interval(config.sample_interval());
    sample_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut average_tick = time::interval_at(
        Instant::now() + config.average_interval(),
        config.average_interval(),
    );
    average_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut windows: u64 = 0;

    loop {
        tokio::select! {
            biased;

            message = control_rx.recv() => {
                match message {
                    Some(ControlMessage::Shutdown { ack }) => {
                        let _ = ack.send(());
                    }
                    None => debug!("Control channel closed"),
                }
                break;
            }
            _ = average_tick.tick() => {
                windows += 1;
                let average = sampler.average();

                {
                    let mut metrics = metrics.lock().await;
                    metrics.windows += 1;
                    if let Some(average) = average {
                        metrics.series.push(average.value);
                    }
                }

                if let Some(average) = average {
                    collector.increment(MetricType::AveragesComputed);
                    collector.record(MetricType::LastAverage, f64::from(average.value));
                    if average_tx.send(average).is_err() {
                        debug!("Average receiver dropped");
                    }
                }

                if max_windows.is_some_and(|max| windows >= max) {
                    info!(windows, "Reached configured window limit");
                    break;
                }
            }
            _ = sample_tick.tick() => {
                match sampler.sample() {
                    Ok(outcome) => {
                        if let SampleOutcome::Rejected(value) = outcome {
                            warn!(value, "Sample buffer full, reading dropped");
                        }
                        let mut metrics = metrics.lock().await;
                        metrics.record_outcome(outcome);
                        metrics.last_reading = sampler.last_reading();
                    }
                    Err(err) => {
                        error!(error = %err, "Failed to take sample");
                        collector.increment(MetricType::SourceErrors);
                        metrics.lock().await.source_errors += 1;
                    }
                }
            }
        }
    }

    sampler.shutdown();
    info!("Sampling loop terminated");
}
