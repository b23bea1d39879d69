use crate::MetricsSummary;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    SamplesWritten,
    WritesRejected,
    SamplesPushed,
    Overwrites,
    Reads,
    Pops,
    EmptyReads,
    Resizes,
    ShrinksIgnored,
    AllocationFailures,
    Releases,
    AveragesComputed,
    LastAverage,
    BufferCapacity,
    SourceErrors,
}

#[derive(Default)]
pub struct Metrics {
    values: RwLock<HashMap<MetricType, f64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Sets a gauge, replacing whatever was there.
    pub fn record(&self, metric: MetricType, value: f64) {
        self.update(metric, |slot| *slot = value);
    }

    /// Adds `delta` to a counter that starts at zero.
    pub fn add(&self, metric: MetricType, delta: f64) {
        self.update(metric, |slot| *slot += delta);
    }

    pub fn increment(&self, metric: MetricType) {
        self.update(metric, |slot| *slot += 1.0);
    }

    pub fn get_summary(&self) -> MetricsSummary {
        let values = self.values.read();
        let count = |metric: MetricType| values.get(&metric).copied().unwrap_or_default() as u64;

        MetricsSummary {
            samples_written: count(MetricType::SamplesWritten),
            samples_pushed: count(MetricType::SamplesPushed),
            writes_rejected: count(MetricType::WritesRejected),
            overwrites: count(MetricType::Overwrites),
            pops: count(MetricType::Pops),
            empty_reads: count(MetricType::EmptyReads),
            resizes: count(MetricType::Resizes),
            averages_computed: count(MetricType::AveragesComputed),
            source_errors: count(MetricType::SourceErrors),
            last_average: values.get(&MetricType::LastAverage).copied(),
        }
    }

    pub fn get(&self, metric: MetricType) -> Option<f64> {
        self.values.read().get(&metric).copied()
    }

    fn update(&self, metric: MetricType, apply: impl FnOnce(&mut f64)) {
        apply(self.values.write().entry(metric).or_default());
    }
}
