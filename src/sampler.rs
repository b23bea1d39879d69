// src/sampler.rs

use std::sync::Arc;

use sensorring_buffering::{BufferConfig, BufferError, DiagnosticSink, OverflowPolicy, RingBuffer};
use sensorring_core::{Average, Reading, SensorResult};
use tracing::{debug, info, warn};

use crate::source::SampleSource;

/// What happened to a reading handed to the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    Stored(i32),
    Grew { value: i32, from: usize, to: usize },
    Overwrote { value: i32, discarded: i32 },
    Rejected(i32),
}

/// Stages readings in a ring buffer and turns each window into an average.
pub struct Sampler {
    source: Box<dyn SampleSource>,
    buffer: RingBuffer<i32>,
    config: BufferConfig,
    averages: Vec<Average>,
    last_reading: Option<Reading>,
}

impl Sampler {
    pub fn new(
        source: Box<dyn SampleSource>,
        config: BufferConfig,
        sink: Arc<dyn DiagnosticSink<i32>>,
    ) -> SensorResult<Self> {
        let buffer = RingBuffer::with_sink(config.capacity, sink)?;

        info!(
            source = source.name(),
            capacity = config.capacity,
            max_capacity = config.max_capacity,
            overflow = ?config.overflow,
            "Sampler initialised"
        );

        Ok(Self {
            source,
            buffer,
            config,
            averages: Vec::new(),
            last_reading: None,
        })
    }

    /// Takes one reading from the source and stages it.
    pub fn sample(&mut self) -> SensorResult<SampleOutcome> {
        let reading = Reading::now(self.source.read()?);
        self.last_reading = Some(reading);
        self.store(reading.value)
    }

    /// Most recent reading taken from the source, with the time it was taken.
    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// Stages `value`, growing the buffer or applying the overflow policy when full.
    pub fn store(&mut self, value: i32) -> SensorResult<SampleOutcome> {
        if self.buffer.is_released() {
            return Err(BufferError::Released.into());
        }

        if !self.buffer.is_full() {
            self.buffer.write(value)?;
            return Ok(SampleOutcome::Stored(value));
        }

        let from = self.buffer.capacity();
        if let Some(to) = self.config.next_capacity(from) {
            match self.buffer.resize(to) {
                Ok(()) => {
                    self.buffer.write(value)?;
                    info!(from, to, "Grew sample buffer");
                    return Ok(SampleOutcome::Grew { value, from, to });
                }
                Err(err @ BufferError::Allocation { .. }) => {
                    warn!(error = %err, "Could not grow sample buffer, applying overflow policy");
                }
                Err(err) => return Err(err.into()),
            }
        }

        match self.config.overflow {
            OverflowPolicy::Reject => match self.buffer.write(value) {
                Ok(()) => Ok(SampleOutcome::Stored(value)),
                Err(BufferError::Full { .. }) => Ok(SampleOutcome::Rejected(value)),
                Err(err) => Err(err.into()),
            },
            OverflowPolicy::Overwrite => match self.buffer.push(value)? {
                Some(discarded) => Ok(SampleOutcome::Overwrote { value, discarded }),
                None => Ok(SampleOutcome::Stored(value)),
            },
        }
    }

    /// Drains the buffer and appends the mean of the drained readings to the series.
    pub fn average(&mut self) -> Option<Average> {
        let values: Vec<i32> = self.buffer.drain().collect();
        let Some(average) = Average::from_values(&values) else {
            debug!("Nothing buffered, skipping average");
            return None;
        };

        self.averages.push(average);
        info!(
            average = average.value,
            samples = average.samples,
            "Averaged sample window"
        );
        debug!("Processed series: {:?}", self.series());

        Some(average)
    }

    pub fn averages(&self) -> &[Average] {
        &self.averages
    }

    /// Average values only, in the order they were computed.
    pub fn series(&self) -> Vec<i32> {
        self.averages.iter().map(|a| a.value).collect()
    }

    pub fn buffer(&self) -> &RingBuffer<i32> {
        &self.buffer
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Releases the buffer storage.
    pub fn shutdown(&mut self) {
        self.buffer.release();
    }
}
