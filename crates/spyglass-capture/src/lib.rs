//! Spyglass Capture - value inspection and capture orchestration
//!
//! This crate is the application layer of the capture core: when a probe
//! fires, a captured event is constructed against the paused frame, gated by
//! the probe's condition and rate limit, filled with bounded captures by the
//! safe value inspector, and finally routed by the collector - skips to
//! metrics, commits to the streaming encoder.
//!
//! Nothing in this crate may propagate an error into the instrumented
//! program: inspection is total, condition failures are recorded on the
//! event, and encoder overflow is counted and dropped.
//!
//! # Modules
//!
//! - `inspect` - Safe value inspector (bounded capture and text rendering)
//! - `event` - Captured event state machine (snapshot, log, metric)
//! - `collector` - Outcome routing and the RAII call guard
//! - `payload` - Upload payload builders and per-kind JSON encoders
//! - `ports` - Collaborator traits (metrics sink)

pub mod collector;
pub mod event;
pub mod inspect;
pub mod payload;
pub mod ports;

pub use collector::{AttachedEvent, EventCollector};
pub use event::{
    CaptureState, CapturedEvent, EvaluationError, EventContext, LogMessage, MetricEmission,
    MetricSample, Snapshot, DURATION_BINDING, RETURN_BINDING,
};
pub use inspect::{
    capture_exception, capture_stack, capture_value, captured_context, serialize,
    MAX_STACK_HEIGHT,
};
pub use payload::{
    format_captured_value, format_message, EventKind, LogMessageJsonEncoder, SnapshotJsonEncoder,
};
pub use ports::{MetricsSink, MetricsSinkRef, NullSink};
