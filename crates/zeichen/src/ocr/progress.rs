//! Scoped progress reporting.
//!
//! Progress is a stream of [`ProgressEvent`]s on a 0–100 scale. A
//! [`ProgressScope`] owns a `(base, range)` slice of that scale so nested
//! stages report fractions of their own work without knowing where they sit
//! in the whole. Within one scope reported values never decrease.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub percent: f32,
    pub message: String,
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn report(&self, event: ProgressEvent) {
        // Receiver gone means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

/// A `(base, range)` slice of the overall progress scale.
#[derive(Clone)]
pub struct ProgressScope {
    sink: Arc<dyn ProgressSink>,
    base: f32,
    range: f32,
    last: Arc<Mutex<f32>>,
}

impl ProgressScope {
    /// The full 0–100 scale.
    pub fn root(sink: Arc<dyn ProgressSink>) -> Self {
        Self::new(sink, 0.0, 100.0)
    }

    pub fn noop() -> Self {
        Self::root(Arc::new(NoopProgress))
    }

    fn new(sink: Arc<dyn ProgressSink>, base: f32, range: f32) -> Self {
        Self {
            sink,
            base,
            range,
            last: Arc::new(Mutex::new(base)),
        }
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn end(&self) -> f32 {
        self.base + self.range
    }

    /// Child scope covering `[start, end]` of this scope, as fractions in 0..=1.
    /// The child tracks its own monotonic baseline.
    pub fn sub_scope(&self, start: f32, end: f32) -> Self {
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(start, 1.0);
        Self::new(
            Arc::clone(&self.sink),
            self.base + self.range * start,
            self.range * (end - start),
        )
    }

    /// Report `fraction` (0..=1) of this scope's work as done.
    pub fn report(&self, fraction: f32, message: impl Into<String>) {
        let mut percent = self.base + self.range * fraction.clamp(0.0, 1.0);
        {
            let mut last = self.last.lock();
            if percent < *last {
                percent = *last;
            }
            *last = percent;
        }
        self.sink.report(ProgressEvent {
            percent,
            message: message.into(),
        });
    }

    /// Report `completed` out of `total` steps. An empty batch counts as done.
    pub fn report_step(&self, completed: usize, total: usize, message: impl Into<String>) {
        let fraction = if total == 0 {
            1.0
        } else {
            completed as f32 / total as f32
        };
        self.report(fraction, message);
    }
}
