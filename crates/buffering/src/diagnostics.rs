// crates/buffering/src/diagnostics.rs

#[cfg(any(test, feature = "test-util"))]
use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Warn,
}

/// Conditions reported by a [`RingBuffer`](crate::RingBuffer) while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic<T> {
    Written { value: T, head: usize },
    WriteRejected { value: T, capacity: usize },
    Pushed { value: T, head: usize },
    Overwrote { discarded: T, tail: usize },
    Read { value: T, tail: usize },
    ReadEmpty,
    Popped { value: T, tail: usize },
    PopEmpty,
    ResizeRequested { from: usize, to: usize },
    ShrinkIgnored { current: usize, requested: usize },
    Resized { from: usize, to: usize, preserved: usize },
    AllocationFailed { requested: usize },
    Released { capacity: usize },
}

impl<T> Diagnostic<T> {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::WriteRejected { .. }
            | Diagnostic::ReadEmpty
            | Diagnostic::PopEmpty
            | Diagnostic::ShrinkIgnored { .. }
            | Diagnostic::AllocationFailed { .. } => Severity::Warn,
            _ => Severity::Debug,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Diagnostic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Written { value, head } => write!(f, "Write: {value}. Head at: {head}"),
            Diagnostic::WriteRejected { value, capacity } => write!(
                f,
                "Buffer is full ({capacity} elements). Unable to write {value}"
            ),
            Diagnostic::Pushed { value, head } => write!(f, "Push {value}. Head at: {head}"),
            Diagnostic::Overwrote { discarded, tail } => write!(
                f,
                "Overwrote oldest value {discarded}. Tail is now at {tail}"
            ),
            Diagnostic::Read { value, tail } => write!(f, "Read -> {value} at tail {tail}"),
            Diagnostic::ReadEmpty => write!(f, "Buffer is empty. Read returned sentinel"),
            Diagnostic::Popped { value, tail } => write!(f, "Pop {value}. Tail at: {tail}"),
            Diagnostic::PopEmpty => write!(f, "Buffer is empty. Pop returned sentinel"),
            Diagnostic::ResizeRequested { from, to } => {
                write!(f, "Attempting resize from {from} to {to}")
            }
            Diagnostic::ShrinkIgnored { current, requested } => write!(
                f,
                "New size {requested} cannot be smaller than the current size {current}. Shrink request ignored"
            ),
            Diagnostic::Resized {
                from,
                to,
                preserved,
            } => write!(f, "Resized from {from} to {to}, kept {preserved} values"),
            Diagnostic::AllocationFailed { requested } => {
                write!(f, "Failed to allocate storage for {requested} elements")
            }
            Diagnostic::Released { capacity } => {
                write!(f, "Released buffer storage ({capacity} elements)")
            }
        }
    }
}

/// Receives buffer diagnostics. Implementations must not fail.
pub trait DiagnosticSink<T>: Send + Sync {
    fn emit(&self, diagnostic: &Diagnostic<T>);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl<T: fmt::Display> DiagnosticSink<T> for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic<T>) {
        match diagnostic.severity() {
            Severity::Warn => warn!(target: "sensorring::buffer", "{}", diagnostic),
            Severity::Debug => debug!(target: "sensorring::buffer", "{}", diagnostic),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl<T> DiagnosticSink<T> for NullSink {
    fn emit(&self, _diagnostic: &Diagnostic<T>) {}
}

/// Keeps every diagnostic in memory for later inspection.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct RecordingSink<T> {
    entries: Mutex<Vec<Diagnostic<T>>>,
}

#[cfg(any(test, feature = "test-util"))]
impl<T: Clone> RecordingSink<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<Diagnostic<T>> {
        self.entries.lock().clone()
    }

    pub fn take(&self) -> Vec<Diagnostic<T>> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn last(&self) -> Option<Diagnostic<T>> {
        self.entries.lock().last().cloned()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl<T: Clone + Send> DiagnosticSink<T> for RecordingSink<T> {
    fn emit(&self, diagnostic: &Diagnostic<T>) {
        self.entries.lock().push(diagnostic.clone());
    }
}
