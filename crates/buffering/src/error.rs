// crates/buffering/src/error.rs

use sensorring_core::SensorError;
use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("buffer capacity must be greater than zero")]
    ZeroCapacity,

    #[error("failed to allocate storage for {requested} elements: {source}")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("buffer is full ({capacity} elements), write rejected")]
    Full { capacity: usize },

    #[error("buffer is empty")]
    Empty,

    #[error("cannot shrink buffer from {current} to {requested} elements")]
    InvalidResize { current: usize, requested: usize },

    #[error("buffer storage has been released")]
    Released,
}

pub type BufferResult<T> = Result<T, BufferError>;

impl From<BufferError> for SensorError {
    fn from(err: BufferError) -> Self {
        SensorError::Buffer(err.to_string())
    }
}
