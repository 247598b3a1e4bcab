//! Collaborator ports
//!
//! The capture core reports through a metrics sink owned by the embedding
//! runtime. The sink is an explicitly constructed, explicitly passed
//! instance - there is no process-wide implicit meter.

use std::sync::Arc;

/// Sink for counters and samples emitted by the capture core.
///
/// Implementations must be cheap and non-blocking: they are called from the
/// instrumented program's threads.
pub trait MetricsSink: Send + Sync {
    /// Bump a named counter by one
    fn increment(&self, name: &str, tags: &[(&str, &str)]);

    /// Add `value` to a named counter
    fn count(&self, name: &str, value: f64, tags: &[(&str, &str)]);

    /// Record the current value of a gauge
    fn gauge(&self, name: &str, value: f64, tags: &[(&str, &str)]);

    /// Record a histogram sample
    fn histogram(&self, name: &str, value: f64, tags: &[(&str, &str)]);

    /// Record a distribution sample
    fn distribution(&self, name: &str, value: f64, tags: &[(&str, &str)]);
}

/// Shared reference to a metrics sink
pub type MetricsSinkRef = Arc<dyn MetricsSink>;

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn increment(&self, _name: &str, _tags: &[(&str, &str)]) {}
    fn count(&self, _name: &str, _value: f64, _tags: &[(&str, &str)]) {}
    fn gauge(&self, _name: &str, _value: f64, _tags: &[(&str, &str)]) {}
    fn histogram(&self, _name: &str, _value: f64, _tags: &[(&str, &str)]) {}
    fn distribution(&self, _name: &str, _value: f64, _tags: &[(&str, &str)]) {}
}
