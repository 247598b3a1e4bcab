//! Event collector
//!
//! Receives finished events and routes them by outcome state: skips become
//! counters, commits go to the streaming encoder (or, for metric probes, to
//! the metrics sink). For function instrumentation, `attach` wraps the call
//! in a guard that guarantees exactly-once enter/exit bookkeeping on every
//! exit path, unwinding included.

use crate::event::{CaptureState, CapturedEvent, MetricSample};
use crate::payload::EventKind;
use crate::ports::MetricsSinkRef;
use spyglass_core::{ExceptionInfo, RuntimeValue};
use spyglass_output::{BatchEncoder, Error as EncoderError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Routes finished events to metrics or the encoder.
///
/// Buffer overflow is an accepted, observable outcome: the event is counted
/// and dropped, never blocking or retrying.
pub struct EventCollector {
    encoder: Arc<BatchEncoder<CapturedEvent>>,
    meter: MetricsSinkRef,
}

impl EventCollector {
    pub fn new(encoder: Arc<BatchEncoder<CapturedEvent>>, meter: MetricsSinkRef) -> Self {
        Self { encoder, meter }
    }

    /// Route one finished event by its outcome state.
    pub fn push(&self, event: CapturedEvent) {
        let probe_id = event.probe().probe_id.clone();
        match event.state() {
            CaptureState::SkipCond => self.count_skip("cond", &probe_id),
            CaptureState::SkipCondError => self.count_skip("cond_error", &probe_id),
            CaptureState::SkipRate => self.count_skip("rate", &probe_id),
            CaptureState::Commit => match &event {
                CapturedEvent::Metric(sample) => self.emit_sample(sample, &probe_id),
                _ => self.enqueue(event),
            },
            CaptureState::None => {}
        }
    }

    /// Wrap a function invocation: calls `enter()` now, and guarantees
    /// `exit(...)` followed by `push(...)` on every exit path.
    pub fn attach(&self, event: CapturedEvent) -> AttachedEvent<'_> {
        AttachedEvent::new(self, event)
    }

    fn count_skip(&self, cause: &str, probe_id: &str) {
        self.meter
            .increment("skip", &[("cause", cause), ("probe_id", probe_id)]);
    }

    fn emit_sample(&self, sample: &MetricSample, probe_id: &str) {
        let Some(emission) = &sample.sample else {
            return;
        };
        let tags = [("probe_id", probe_id)];
        match emission.kind {
            spyglass_core::MetricKind::Count => {
                self.meter.count(&emission.name, emission.value, &tags)
            }
            spyglass_core::MetricKind::Gauge => {
                self.meter.gauge(&emission.name, emission.value, &tags)
            }
            spyglass_core::MetricKind::Histogram => {
                self.meter.histogram(&emission.name, emission.value, &tags)
            }
            spyglass_core::MetricKind::Distribution => {
                self.meter
                    .distribution(&emission.name, emission.value, &tags)
            }
        }
    }

    fn enqueue(&self, event: CapturedEvent) {
        match self.encoder.put(&event) {
            Ok(_) => {}
            Err(EncoderError::BufferFull { .. }) => {
                debug!(probe_id = %event.probe().probe_id, "Encoder buffer full, dropping event");
                self.meter.increment("encoder.buffer.full", &[]);
            }
            Err(err) => {
                // Missing encoder registration or a serialization fault:
                // a contract violation, surfaced loudly but never raised
                // into the instrumented program.
                error!(error = %err, kind = ?EventKind::of(&event), "Failed to encode event");
                self.meter.increment("encoder.error", &[]);
            }
        }
    }
}

impl std::fmt::Debug for EventCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCollector")
            .field("encoder", &self.encoder)
            .field("meter", &"<MetricsSink>")
            .finish()
    }
}

/// Guard over one instrumented call.
///
/// Construction runs the event's `enter()` leg. [`complete`](Self::complete)
/// runs `exit(...)` and pushes; if the wrapped call unwinds instead, `Drop`
/// performs the same bookkeeping with no return value, so the event is
/// pushed exactly once regardless of how the call terminates.
pub struct AttachedEvent<'a> {
    collector: &'a EventCollector,
    event: Option<CapturedEvent>,
    started: Instant,
}

impl<'a> AttachedEvent<'a> {
    fn new(collector: &'a EventCollector, mut event: CapturedEvent) -> Self {
        event.enter();
        Self {
            collector,
            event: Some(event),
            started: Instant::now(),
        }
    }

    /// The wrapped event; present until the guard is consumed
    pub fn event(&self) -> &CapturedEvent {
        self.event
            .as_ref()
            .expect("attached event present until completion")
    }

    /// Finish the wrapped call with its outcome.
    pub fn complete(mut self, retval: RuntimeValue, exc_info: Option<ExceptionInfo>) {
        let duration_ns = self.started.elapsed().as_nanos() as u64;
        if let Some(mut event) = self.event.take() {
            event.exit(retval, exc_info, duration_ns);
            self.collector.push(event);
        }
    }
}

impl Drop for AttachedEvent<'_> {
    fn drop(&mut self) {
        // Unwinding path: the exit leg still runs, without a return value.
        if let Some(mut event) = self.event.take() {
            let duration_ns = self.started.elapsed().as_nanos() as u64;
            event.exit(RuntimeValue::Null, None, duration_ns);
            self.collector.push(event);
        }
    }
}
