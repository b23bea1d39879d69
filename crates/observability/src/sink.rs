// crates/observability/src/sink.rs

use crate::metrics::{MetricType, Metrics};
use sensorring_buffering::{Diagnostic, DiagnosticSink};
use std::sync::Arc;

/// Counts buffer diagnostics, then hands them to the wrapped sink.
pub struct MetricsSink<T> {
    metrics: Arc<Metrics>,
    inner: Arc<dyn DiagnosticSink<T>>,
}

impl<T> MetricsSink<T> {
    pub fn new(metrics: Arc<Metrics>, inner: Arc<dyn DiagnosticSink<T>>) -> Self {
        Self { metrics, inner }
    }
}

impl<T> DiagnosticSink<T> for MetricsSink<T> {
    fn emit(&self, diagnostic: &Diagnostic<T>) {
        let metric = match diagnostic {
            Diagnostic::Written { .. } => Some(MetricType::SamplesWritten),
            Diagnostic::WriteRejected { .. } => Some(MetricType::WritesRejected),
            Diagnostic::Pushed { .. } => Some(MetricType::SamplesPushed),
            Diagnostic::Overwrote { .. } => Some(MetricType::Overwrites),
            Diagnostic::Read { .. } => Some(MetricType::Reads),
            Diagnostic::ReadEmpty | Diagnostic::PopEmpty => Some(MetricType::EmptyReads),
            Diagnostic::Popped { .. } => Some(MetricType::Pops),
            Diagnostic::Resized { to, .. } => {
                self.metrics.record(MetricType::BufferCapacity, *to as f64);
                Some(MetricType::Resizes)
            }
            Diagnostic::ShrinkIgnored { .. } => Some(MetricType::ShrinksIgnored),
            Diagnostic::AllocationFailed { .. } => Some(MetricType::AllocationFailures),
            Diagnostic::Released { .. } => {
                self.metrics.record(MetricType::BufferCapacity, 0.0);
                Some(MetricType::Releases)
            }
            Diagnostic::ResizeRequested { .. } => None,
        };

        if let Some(metric) = metric {
            self.metrics.increment(metric);
        }

        self.inner.emit(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorring_buffering::{RecordingSink, RingBuffer};

    #[test]
    fn counts_and_forwards() {
        let metrics = Arc::new(Metrics::new());
        let recorder = Arc::new(RecordingSink::<i32>::new());
        let sink = Arc::new(MetricsSink::<i32>::new(metrics.clone(), recorder.clone()));

        let mut buffer = RingBuffer::<i32>::with_sink(2, sink).unwrap();
        buffer.write(1).unwrap();
        buffer.write(2).unwrap();
        let _ = buffer.write(3);
        buffer.push(4).unwrap();
        buffer.pop().unwrap();
        buffer.pop().unwrap();
        let _ = buffer.pop();
        buffer.resize(4).unwrap();
        let _ = buffer.resize(1);

        let summary = metrics.get_summary();
        assert_eq!(summary.samples_written, 2);
        assert_eq!(summary.writes_rejected, 1);
        assert_eq!(summary.samples_pushed, 1);
        assert_eq!(summary.overwrites, 1);
        assert_eq!(summary.pops, 2);
        assert_eq!(summary.empty_reads, 1);
        assert_eq!(summary.resizes, 1);
        assert_eq!(metrics.get(MetricType::ShrinksIgnored), Some(1.0));
        assert_eq!(metrics.get(MetricType::BufferCapacity), Some(4.0));

        // every diagnostic still reaches the wrapped sink
        assert_eq!(recorder.entries().len(), 12);
    }
}
