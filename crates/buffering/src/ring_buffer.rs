// crates/buffering/src/ring_buffer.rs

use std::fmt;
use std::sync::Arc;

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{BufferError, BufferResult};

/// Value returned by the sentinel accessors when the buffer is empty.
pub const EMPTY_SENTINEL: i32 = -1;

/// Fixed-capacity FIFO with wrap-around indexing.
///
/// `write` rejects new values once the buffer is full while `push` overwrites
/// the oldest one. Capacity can only grow, through [`RingBuffer::resize`].
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    capacity: usize,
    head: usize,
    tail: usize,
    count: usize,
    sink: Arc<dyn DiagnosticSink<T>>,
}

impl<T> RingBuffer<T>
where
    T: Clone + Default + fmt::Display,
{
    pub fn new(capacity: usize) -> BufferResult<Self> {
        Self::with_sink(capacity, Arc::new(TracingSink))
    }
}

impl<T: Clone + Default> RingBuffer<T> {
    pub fn with_sink(capacity: usize, sink: Arc<dyn DiagnosticSink<T>>) -> BufferResult<Self> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }

        let buffer = match allocate(capacity) {
            Ok(buffer) => buffer,
            Err(err) => {
                sink.emit(&Diagnostic::AllocationFailed {
                    requested: capacity,
                });
                return Err(err);
            }
        };

        Ok(Self {
            buffer,
            capacity,
            head: 0,
            tail: 0,
            count: 0,
            sink,
        })
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once [`release`](Self::release) has dropped the storage.
    pub fn is_released(&self) -> bool {
        self.capacity == 0
    }

    /// Appends `value`, refusing it when the buffer is full.
    pub fn write(&mut self, value: T) -> BufferResult<()> {
        if self.is_released() {
            return Err(BufferError::Released);
        }

        if self.is_full() {
            self.sink.emit(&Diagnostic::WriteRejected {
                value,
                capacity: self.capacity,
            });
            return Err(BufferError::Full {
                capacity: self.capacity,
            });
        }

        self.buffer[self.head] = value.clone();
        self.head = self.advance(self.head);
        self.count += 1;

        self.sink.emit(&Diagnostic::Written {
            value,
            head: self.head,
        });

        Ok(())
    }

    /// Appends `value`, discarding the oldest element if the buffer is full.
    ///
    /// Returns the discarded element, if any.
    pub fn push(&mut self, value: T) -> BufferResult<Option<T>> {
        if self.is_released() {
            return Err(BufferError::Released);
        }

        let discarded = if self.is_full() {
            let oldest = std::mem::take(&mut self.buffer[self.tail]);
            self.tail = self.advance(self.tail);
            self.sink.emit(&Diagnostic::Overwrote {
                discarded: oldest.clone(),
                tail: self.tail,
            });
            Some(oldest)
        } else {
            self.count += 1;
            None
        };

        self.buffer[self.head] = value.clone();
        self.head = self.advance(self.head);

        self.sink.emit(&Diagnostic::Pushed {
            value,
            head: self.head,
        });

        Ok(discarded)
    }

    /// Returns the oldest element without removing it.
    pub fn read(&self) -> BufferResult<T> {
        if self.is_empty() {
            self.sink.emit(&Diagnostic::ReadEmpty);
            return Err(BufferError::Empty);
        }

        let value = self.buffer[self.tail].clone();
        self.sink.emit(&Diagnostic::Read {
            value: value.clone(),
            tail: self.tail,
        });

        Ok(value)
    }

    /// Removes and returns the oldest element.
    pub fn pop(&mut self) -> BufferResult<T> {
        if self.is_empty() {
            self.sink.emit(&Diagnostic::PopEmpty);
            return Err(BufferError::Empty);
        }

        let value = std::mem::take(&mut self.buffer[self.tail]);
        self.tail = self.advance(self.tail);
        self.count -= 1;

        self.sink.emit(&Diagnostic::Popped {
            value: value.clone(),
            tail: self.tail,
        });

        Ok(value)
    }

    /// Grows the storage to `new_capacity`, keeping FIFO order.
    ///
    /// Shrinking is refused and leaves the buffer untouched, as does an
    /// allocation failure.
    pub fn resize(&mut self, new_capacity: usize) -> BufferResult<()> {
        if self.is_released() {
            return Err(BufferError::Released);
        }

        self.sink.emit(&Diagnostic::ResizeRequested {
            from: self.capacity,
            to: new_capacity,
        });

        if new_capacity < self.capacity {
            self.sink.emit(&Diagnostic::ShrinkIgnored {
                current: self.capacity,
                requested: new_capacity,
            });
            return Err(BufferError::InvalidResize {
                current: self.capacity,
                requested: new_capacity,
            });
        }

        let mut resized = match allocate::<T>(new_capacity) {
            Ok(resized) => resized,
            Err(err) => {
                self.sink.emit(&Diagnostic::AllocationFailed {
                    requested: new_capacity,
                });
                return Err(err);
            }
        };

        for i in 0..self.count {
            let pos = (self.tail + i) % self.capacity;
            resized[i] = std::mem::take(&mut self.buffer[pos]);
        }

        let from = self.capacity;
        self.buffer = resized;
        self.capacity = new_capacity;
        self.tail = 0;
        self.head = self.count % new_capacity;

        self.sink.emit(&Diagnostic::Resized {
            from,
            to: new_capacity,
            preserved: self.count,
        });

        Ok(())
    }

    /// Drops the storage and zeroes every index. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.is_released() {
            return;
        }

        let capacity = self.capacity;
        self.buffer = Vec::new();
        self.capacity = 0;
        self.head = 0;
        self.tail = 0;
        self.count = 0;

        self.sink.emit(&Diagnostic::Released { capacity });
    }

    /// Forgets all live elements but keeps the storage.
    pub fn clear(&mut self) {
        for slot in self.buffer.iter_mut() {
            *slot = T::default();
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Live elements, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.count).map(move |i| &self.buffer[(self.tail + i) % self.capacity])
    }

    /// The `n` most recent elements, oldest first.
    pub fn get_last_n(&self, n: usize) -> Vec<T> {
        let count = n.min(self.count);
        self.iter().skip(self.count - count).cloned().collect()
    }

    /// Pops until the buffer is empty.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || {
            if self.is_empty() {
                None
            } else {
                self.pop().ok()
            }
        })
    }

    fn advance(&self, index: usize) -> usize {
        if index == self.capacity - 1 {
            0
        } else {
            index + 1
        }
    }
}

impl RingBuffer<i32> {
    /// Like [`read`](Self::read), returning [`EMPTY_SENTINEL`] when empty.
    pub fn read_or_sentinel(&self) -> i32 {
        self.read().unwrap_or(EMPTY_SENTINEL)
    }

    /// Like [`pop`](Self::pop), returning [`EMPTY_SENTINEL`] when empty.
    pub fn pop_or_sentinel(&mut self) -> i32 {
        self.pop().unwrap_or(EMPTY_SENTINEL)
    }
}

impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

fn allocate<T: Clone + Default>(capacity: usize) -> BufferResult<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|source| BufferError::Allocation {
            requested: capacity,
            source,
        })?;
    buffer.resize(capacity, T::default());
    Ok(buffer)
}
