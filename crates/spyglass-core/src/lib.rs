//! Spyglass Core - Domain entities and core logic
//!
//! This crate contains the domain model of the capture core. It has no
//! infrastructure concerns: no I/O, no async, no transport.
//!
//! # Architecture
//!
//! - `entities` - Domain entities (Probe, RuntimeValue, CapturedValue, etc.)
//! - `expressions` - Compiled condition/template expression seam
//! - `rate_limit` - Per-probe token-bucket rate limiter
//! - `error` - Domain error types
//!
//! # Related Crates
//!
//! - Value inspection and event state machines: `spyglass-capture`
//! - Bounded streaming encoder: `spyglass-output`
//! - Configuration types: `spyglass-config`

pub mod entities;
pub mod error;
pub mod expressions;
pub mod rate_limit;

pub use entities::{
    CaptureKind, CaptureLimits, CapturedContext, CapturedFields, CapturedValue, DepthCutCapture,
    EvaluateAt, ExceptionCapture, ExceptionInfo, FieldAccess, FrameSnapshot, MappingCapture,
    MetricKind, NotCapturedReason, NullCapture, ObjectCapture, ObjectValue, PrimitiveCapture,
    Probe, ProbeLocation, RuntimeValue, SequenceCapture, SourceLanguage, StackEntry, ThreadInfo,
    TraceContext, DEFAULT_MAX_FIELDS, DEFAULT_MAX_LEN, DEFAULT_MAX_LEVEL, DEFAULT_MAX_SIZE,
    DEFAULT_PROBE_RATE,
};
pub use error::{Error, Result};
pub use expressions::{bindings_from, Bindings, ExpressionError, ProbeExpression, TemplateSegment};
pub use rate_limit::{RateLimitDecision, RateLimiter};
