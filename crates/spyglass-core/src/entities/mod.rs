//! Core domain entities for Spyglass
//!
//! # Modules
//!
//! - `value` - Runtime value tree delivered by host-runtime adapters
//! - `limits` - Capture limits value object
//! - `captured` - Bounded capture records (the wire-facing side)
//! - `probe` - Probe model (location, condition, capture kind, limiter)
//! - `frame` - Frame snapshots, thread info, exception info
//! - `language` - Source language tag

mod captured;
mod frame;
mod language;
mod limits;
mod probe;
mod value;

pub use captured::{
    CapturedContext, CapturedFields, CapturedValue, DepthCutCapture, ExceptionCapture,
    MappingCapture, NotCapturedReason, NullCapture, ObjectCapture, PrimitiveCapture,
    SequenceCapture, StackEntry,
};
pub use frame::{ExceptionInfo, FrameSnapshot, ThreadInfo, TraceContext};
pub use language::SourceLanguage;
pub use limits::{
    CaptureLimits, DEFAULT_MAX_FIELDS, DEFAULT_MAX_LEN, DEFAULT_MAX_LEVEL, DEFAULT_MAX_SIZE,
};
pub use probe::{
    CaptureKind, EvaluateAt, MetricKind, Probe, ProbeLocation, DEFAULT_PROBE_RATE,
};
pub use value::{FieldAccess, ObjectValue, RuntimeValue};
