// tests/integration_test.rs

use std::sync::Arc;

use sensorring::{SampleOutcome, Sampler, ScriptedSource};
use sensorring_buffering::{
    BufferConfig, BufferError, Diagnostic, NullSink, OverflowPolicy, RecordingSink, RingBuffer,
    EMPTY_SENTINEL,
};
use sensorring_config::{ConfigLoader, ConfigManager};
use sensorring_observability::{MetricType, MetricsCollector};

fn quiet(capacity: usize) -> RingBuffer<i32> {
    RingBuffer::<i32>::with_sink(capacity, Arc::new(NullSink)).expect("allocation failed")
}

#[test]
fn test_write_rejects_then_accepts_after_pop() {
    let mut buffer = quiet(3);
    buffer.write(10).unwrap();
    buffer.write(20).unwrap();
    buffer.write(30).unwrap();

    assert_eq!(buffer.write(40), Err(BufferError::Full { capacity: 3 }));
    assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);

    assert_eq!(buffer.pop(), Ok(10));
    buffer.write(40).unwrap();
    assert_eq!(buffer.pop(), Ok(20));
    assert_eq!(buffer.pop(), Ok(30));
    assert_eq!(buffer.pop(), Ok(40));
}

#[test]
fn test_push_overwrites_then_runs_empty() {
    let sink = Arc::new(RecordingSink::<i32>::new());
    let mut buffer = RingBuffer::<i32>::with_sink(2, sink.clone()).unwrap();
    buffer.push(1).unwrap();
    buffer.push(2).unwrap();
    buffer.push(3).unwrap();

    assert_eq!(buffer.pop(), Ok(2));
    assert_eq!(buffer.pop(), Ok(3));
    assert_eq!(buffer.pop_or_sentinel(), EMPTY_SENTINEL);
    assert!(buffer.is_empty());
    assert_eq!(sink.last(), Some(Diagnostic::PopEmpty));
}

#[test]
fn test_resize_then_fill() {
    let mut buffer = quiet(2);
    buffer.write(5).unwrap();
    buffer.write(6).unwrap();
    buffer.resize(4).unwrap();
    buffer.write(7).unwrap();
    buffer.write(8).unwrap();

    let drained: Vec<i32> = (0..4).map(|_| buffer.pop().unwrap()).collect();
    assert_eq!(drained, vec![5, 6, 7, 8]);
}

#[test]
fn test_sampler_feeds_series_through_metrics_sink() {
    let collector = MetricsCollector::new();
    let sink = collector.instrument::<i32>(Arc::new(NullSink));
    let mut sampler = Sampler::new(
        Box::new(ScriptedSource::new(vec![10, 20, 30, 40])),
        BufferConfig {
            capacity: 3,
            max_capacity: 3,
            overflow: OverflowPolicy::Overwrite,
        },
        sink,
    )
    .unwrap();

    for _ in 0..4 {
        sampler.sample().unwrap();
    }
    assert_eq!(sampler.average().map(|a| a.value), Some(30));

    let metrics = collector.metrics();
    assert_eq!(metrics.get(MetricType::SamplesWritten), Some(3.0));
    assert_eq!(metrics.get(MetricType::Overwrites), Some(1.0));
    assert_eq!(metrics.get(MetricType::Pops), Some(3.0));
}

#[test]
fn test_sampler_outcome_on_reject() {
    let mut sampler = Sampler::new(
        Box::new(ScriptedSource::new(vec![1, 2])),
        BufferConfig {
            capacity: 1,
            max_capacity: 1,
            overflow: OverflowPolicy::Reject,
        },
        Arc::new(NullSink),
    )
    .unwrap();

    assert_eq!(sampler.sample().unwrap(), SampleOutcome::Stored(1));
    assert_eq!(sampler.sample().unwrap(), SampleOutcome::Rejected(2));
}

#[test]
fn test_config_loading() {
    let manager = ConfigManager::with_defaults();
    let config = manager.get();

    assert_eq!(config.buffer.capacity, 5);
    assert_eq!(config.sampler.samples_per_window(), 5);

    let shipped = ConfigLoader::load_from_file(std::path::Path::new("config/sensorring.toml"))
        .expect("shipped config should parse");
    assert_eq!(shipped, config);
}
