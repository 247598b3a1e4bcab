//! Captured event state machine
//!
//! One event exists per probe firing. It owns the gating (condition, rate
//! limit) and the bounded captures for its probe's kind, and ends in exactly
//! one terminal state before being pushed to the collector. Gating failures
//! are recorded on the event, never raised to the instrumentation call site.

use crate::inspect::{captured_context, serialize};
use chrono::Utc;
use serde::Serialize;
use spyglass_core::{
    bindings_from, Bindings, CaptureKind, CapturedContext, EvaluateAt, ExceptionInfo,
    FrameSnapshot, MetricKind, Probe, RateLimitDecision, RuntimeValue, TemplateSegment,
    ThreadInfo, TraceContext,
};
use std::sync::Arc;
use uuid::Uuid;

/// Pseudo-local carrying the call duration at exit-time evaluation
pub const DURATION_BINDING: &str = "@duration";
/// Pseudo-local carrying the return value at exit-time evaluation
pub const RETURN_BINDING: &str = "@return";

/// Lifecycle state of a captured event.
///
/// `None` is the initial state; every other state is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    None,
    /// Condition evaluated false
    SkipCond,
    /// Condition evaluation failed
    SkipCondError,
    /// Rate limiter denied the firing
    SkipRate,
    /// Captured and ready to ship
    Commit,
}

impl CaptureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::SkipCond => "SKIP_COND",
            Self::SkipCondError => "SKIP_COND_ERROR",
            Self::SkipRate => "SKIP_RATE",
            Self::Commit => "COMMIT",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A recorded expression failure, reported against the expression's source
/// text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationError {
    pub expr: String,
    pub message: String,
}

/// State shared by every captured event kind: the firing's identity and the
/// gating bookkeeping.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub probe: Arc<Probe>,
    pub frame: FrameSnapshot,
    pub thread: ThreadInfo,
    pub correlation: Option<TraceContext>,
    /// Entry arguments captured by the call site, when it pre-captured them
    pub args: Option<Vec<(String, RuntimeValue)>>,
    pub state: CaptureState,
    pub errors: Vec<EvaluationError>,
    /// Milliseconds since epoch at construction
    pub timestamp_ms: i64,
    pub event_id: String,
}

impl EventContext {
    pub fn new(probe: Arc<Probe>, frame: FrameSnapshot, thread: ThreadInfo) -> Self {
        Self {
            probe,
            frame,
            thread,
            correlation: None,
            args: None,
            state: CaptureState::None,
            errors: Vec::new(),
            timestamp_ms: Utc::now().timestamp_millis(),
            event_id: Uuid::new_v4().to_string(),
        }
    }

    /// Attach entry arguments the call site captured before constructing the
    /// event; they take precedence over the frame's argument slots.
    pub fn with_args(mut self, args: Vec<(String, RuntimeValue)>) -> Self {
        self.args = Some(args);
        self
    }

    /// Attach trace correlation ids when the firing happened inside an
    /// active trace
    pub fn with_correlation(mut self, correlation: TraceContext) -> Self {
        self.correlation = Some(correlation);
        self
    }

    /// Evaluate the probe condition against the given bindings.
    ///
    /// A missing condition passes. A false result moves the event to
    /// `SkipCond`; an evaluation failure is recorded and moves it to
    /// `SkipCondError`. Failures never propagate.
    fn eval_condition(&mut self, bindings: &Bindings) -> bool {
        let Some(condition) = &self.probe.condition else {
            return true;
        };

        match condition.eval(bindings) {
            Ok(value) if value.is_truthy() => true,
            Ok(_) => {
                self.state = CaptureState::SkipCond;
                false
            }
            Err(err) => {
                self.errors.push(EvaluationError {
                    expr: err.source,
                    message: err.message,
                });
                self.state = CaptureState::SkipCondError;
                false
            }
        }
    }

    /// One budget check against the probe's limiter
    fn check_rate(&mut self) -> bool {
        if self.probe.limiter.limit() == RateLimitDecision::Exceeded {
            self.state = CaptureState::SkipRate;
            return false;
        }
        true
    }

    /// The entry arguments: pre-captured if the call site provided them,
    /// otherwise the frame's argument slots.
    fn entry_args(&self) -> Vec<(String, RuntimeValue)> {
        self.args.clone().unwrap_or_else(|| self.frame.args.clone())
    }

    /// Entry arguments enriched with the `@duration` and (absent an
    /// exception) `@return` pseudo-locals, for exit-time evaluation.
    fn enriched_bindings(
        &self,
        retval: &RuntimeValue,
        exc_info: Option<&ExceptionInfo>,
        duration_ns: u64,
    ) -> Bindings {
        let mut bindings = bindings_from(&self.entry_args());
        bindings.insert(
            DURATION_BINDING.to_string(),
            RuntimeValue::Int(duration_ns as i64),
        );
        if exc_info.is_none() {
            bindings.insert(RETURN_BINDING.to_string(), retval.clone());
        }
        bindings
    }
}

/// Full state snapshot of a probe firing
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub event: EventContext,
    pub entry_capture: Option<CapturedContext>,
    pub return_capture: Option<CapturedContext>,
    pub line_capture: Option<CapturedContext>,
    pub duration_ns: Option<u64>,
}

impl Snapshot {
    pub fn new(probe: Arc<Probe>, frame: FrameSnapshot, thread: ThreadInfo) -> Self {
        Self {
            event: EventContext::new(probe, frame, thread),
            entry_capture: None,
            return_capture: None,
            line_capture: None,
            duration_ns: None,
        }
    }

    pub fn enter(&mut self) {
        if self.event.probe.evaluate_at() == EvaluateAt::Exit {
            return;
        }

        let args = self.event.entry_args();
        if !self.event.eval_condition(&bindings_from(&args)) {
            return;
        }
        if !self.event.check_rate() {
            return;
        }

        let limits = self.event.probe.capture_limits();
        self.entry_capture = Some(captured_context(&args, &[], None, &limits));
        self.event.state = CaptureState::Commit;
    }

    pub fn exit(&mut self, retval: RuntimeValue, exc_info: Option<ExceptionInfo>, duration_ns: u64) {
        if self.event.probe.evaluate_at() == EvaluateAt::Exit {
            let bindings = self
                .event
                .enriched_bindings(&retval, exc_info.as_ref(), duration_ns);
            if !self.event.eval_condition(&bindings) {
                return;
            }
            if !self.event.check_rate() {
                return;
            }
        } else if matches!(
            self.event.state,
            CaptureState::SkipCond | CaptureState::SkipCondError | CaptureState::SkipRate
        ) {
            // A decision made at entry is never overridden at exit.
            return;
        }

        let mut locals: Vec<(String, RuntimeValue)> = Vec::new();
        if exc_info.is_none() {
            locals.push((RETURN_BINDING.to_string(), retval));
        }

        let limits = self.event.probe.capture_limits();
        self.return_capture = Some(captured_context(
            &self.event.entry_args(),
            &locals,
            exc_info.as_ref(),
            &limits,
        ));
        self.duration_ns = Some(duration_ns);
        self.event.state = CaptureState::Commit;
    }

    pub fn line(
        &mut self,
        locals: Option<Vec<(String, RuntimeValue)>>,
        exc_info: Option<ExceptionInfo>,
    ) {
        let frame_bindings = self.event.frame.bindings();
        if !self.event.eval_condition(&frame_bindings) {
            return;
        }
        if !self.event.check_rate() {
            return;
        }

        let limits = self.event.probe.capture_limits();
        let locals = locals.unwrap_or_else(|| self.event.frame.locals.clone());
        self.line_capture = Some(captured_context(
            &self.event.entry_args(),
            &locals,
            exc_info.as_ref(),
            &limits,
        ));
        self.event.state = CaptureState::Commit;
    }
}

/// A rendered dynamic log message
#[derive(Debug, Clone)]
pub struct LogMessage {
    pub event: EventContext,
    pub message: Option<String>,
    pub duration_ns: Option<u64>,
}

impl LogMessage {
    pub fn new(probe: Arc<Probe>, frame: FrameSnapshot, thread: ThreadInfo) -> Self {
        Self {
            event: EventContext::new(probe, frame, thread),
            message: None,
            duration_ns: None,
        }
    }

    /// Render the probe's template against the bindings. Segment failures
    /// are recorded and render as the literal `ERROR`.
    fn render(&mut self, bindings: &Bindings) -> String {
        let probe = Arc::clone(&self.event.probe);
        let limits = probe.capture_limits();
        let CaptureKind::Log { segments, .. } = &probe.capture else {
            return String::new();
        };

        let mut message = String::new();
        for segment in segments {
            match segment {
                TemplateSegment::Const(text) => message.push_str(text),
                TemplateSegment::Expr(expr) => match expr.eval(bindings) {
                    Ok(value) => {
                        message.push_str(&serialize(&value, limits.max_level as i64, &limits))
                    }
                    Err(err) => {
                        self.event.errors.push(EvaluationError {
                            expr: err.source,
                            message: err.message,
                        });
                        message.push_str("ERROR");
                    }
                },
            }
        }
        message
    }

    pub fn enter(&mut self) {
        if self.event.probe.evaluate_at() == EvaluateAt::Exit {
            return;
        }

        let bindings = bindings_from(&self.event.entry_args());
        if !self.event.eval_condition(&bindings) {
            return;
        }
        if !self.event.check_rate() {
            return;
        }

        self.message = Some(self.render(&bindings));
        self.event.state = CaptureState::Commit;
    }

    pub fn exit(&mut self, retval: RuntimeValue, exc_info: Option<ExceptionInfo>, duration_ns: u64) {
        if self.event.probe.evaluate_at() != EvaluateAt::Exit {
            return;
        }

        let bindings = self
            .event
            .enriched_bindings(&retval, exc_info.as_ref(), duration_ns);
        if !self.event.eval_condition(&bindings) {
            return;
        }
        if !self.event.check_rate() {
            return;
        }

        self.message = Some(self.render(&bindings));
        self.duration_ns = Some(duration_ns);
        self.event.state = CaptureState::Commit;
    }

    pub fn line(&mut self, locals: Option<Vec<(String, RuntimeValue)>>) {
        let bindings = match &locals {
            Some(pairs) => bindings_from(pairs),
            None => self.event.frame.bindings(),
        };
        if !self.event.eval_condition(&bindings) {
            return;
        }
        if !self.event.check_rate() {
            return;
        }

        self.message = Some(self.render(&bindings));
        self.event.state = CaptureState::Commit;
    }
}

/// A numeric sample destined for the metrics sink
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEmission {
    pub kind: MetricKind,
    pub name: String,
    pub value: f64,
}

/// A metric-probe firing
#[derive(Debug, Clone)]
pub struct MetricSample {
    pub event: EventContext,
    pub sample: Option<MetricEmission>,
}

impl MetricSample {
    pub fn new(probe: Arc<Probe>, frame: FrameSnapshot, thread: ThreadInfo) -> Self {
        Self {
            event: EventContext::new(probe, frame, thread),
            sample: None,
        }
    }

    /// Evaluate the value expression; a missing expression samples a unit
    /// count. Non-numeric or failing evaluations are recorded and skip the
    /// event.
    fn evaluate_sample(&mut self, bindings: &Bindings) -> bool {
        let probe = Arc::clone(&self.event.probe);
        let CaptureKind::Metric { kind, name, value } = &probe.capture else {
            return false;
        };

        let sampled = match value {
            None => 1.0,
            Some(expr) => match expr.eval(bindings) {
                Ok(result) => match result.as_f64() {
                    Some(number) => number,
                    None => {
                        self.event.errors.push(EvaluationError {
                            expr: expr.source.clone(),
                            message: format!(
                                "expression result is not numeric: {}",
                                result.type_name()
                            ),
                        });
                        self.event.state = CaptureState::SkipCondError;
                        return false;
                    }
                },
                Err(err) => {
                    self.event.errors.push(EvaluationError {
                        expr: err.source,
                        message: err.message,
                    });
                    self.event.state = CaptureState::SkipCondError;
                    return false;
                }
            },
        };

        self.sample = Some(MetricEmission {
            kind: *kind,
            name: name.clone(),
            value: sampled,
        });
        true
    }

    pub fn enter(&mut self) {
        if self.event.probe.evaluate_at() == EvaluateAt::Exit {
            return;
        }

        let bindings = bindings_from(&self.event.entry_args());
        if !self.event.eval_condition(&bindings) {
            return;
        }
        if !self.event.check_rate() {
            return;
        }
        if self.evaluate_sample(&bindings) {
            self.event.state = CaptureState::Commit;
        }
    }

    pub fn exit(&mut self, retval: RuntimeValue, exc_info: Option<ExceptionInfo>, duration_ns: u64) {
        if self.event.probe.evaluate_at() != EvaluateAt::Exit {
            return;
        }

        let bindings = self
            .event
            .enriched_bindings(&retval, exc_info.as_ref(), duration_ns);
        if !self.event.eval_condition(&bindings) {
            return;
        }
        if !self.event.check_rate() {
            return;
        }
        if self.evaluate_sample(&bindings) {
            self.event.state = CaptureState::Commit;
        }
    }

    pub fn line(&mut self, locals: Option<Vec<(String, RuntimeValue)>>) {
        let bindings = match &locals {
            Some(pairs) => bindings_from(pairs),
            None => self.event.frame.bindings(),
        };
        if !self.event.eval_condition(&bindings) {
            return;
        }
        if !self.event.check_rate() {
            return;
        }
        if self.evaluate_sample(&bindings) {
            self.event.state = CaptureState::Commit;
        }
    }
}

/// One probe firing, of whichever capture kind the probe carries
#[derive(Debug, Clone)]
pub enum CapturedEvent {
    Snapshot(Snapshot),
    Log(LogMessage),
    Metric(MetricSample),
}

impl CapturedEvent {
    /// Construct the event variant matching the probe's capture kind
    pub fn for_probe(probe: Arc<Probe>, frame: FrameSnapshot, thread: ThreadInfo) -> Self {
        match probe.capture {
            CaptureKind::Snapshot { .. } => Self::Snapshot(Snapshot::new(probe, frame, thread)),
            CaptureKind::Log { .. } => Self::Log(LogMessage::new(probe, frame, thread)),
            CaptureKind::Metric { .. } => Self::Metric(MetricSample::new(probe, frame, thread)),
        }
    }

    pub fn context(&self) -> &EventContext {
        match self {
            Self::Snapshot(s) => &s.event,
            Self::Log(l) => &l.event,
            Self::Metric(m) => &m.event,
        }
    }

    pub fn context_mut(&mut self) -> &mut EventContext {
        match self {
            Self::Snapshot(s) => &mut s.event,
            Self::Log(l) => &mut l.event,
            Self::Metric(m) => &mut m.event,
        }
    }

    pub fn probe(&self) -> &Arc<Probe> {
        &self.context().probe
    }

    pub fn state(&self) -> CaptureState {
        self.context().state
    }

    pub fn enter(&mut self) {
        match self {
            Self::Snapshot(s) => s.enter(),
            Self::Log(l) => l.enter(),
            Self::Metric(m) => m.enter(),
        }
    }

    pub fn exit(&mut self, retval: RuntimeValue, exc_info: Option<ExceptionInfo>, duration_ns: u64) {
        match self {
            Self::Snapshot(s) => s.exit(retval, exc_info, duration_ns),
            Self::Log(l) => l.exit(retval, exc_info, duration_ns),
            Self::Metric(m) => m.exit(retval, exc_info, duration_ns),
        }
    }

    pub fn line(
        &mut self,
        locals: Option<Vec<(String, RuntimeValue)>>,
        exc_info: Option<ExceptionInfo>,
    ) {
        match self {
            Self::Snapshot(s) => s.line(locals, exc_info),
            Self::Log(l) => l.line(locals),
            Self::Metric(m) => m.line(locals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spyglass_core::{CaptureLimits, ProbeExpression, ProbeLocation, SourceLanguage};

    fn snapshot_probe(condition: Option<ProbeExpression>) -> Arc<Probe> {
        let mut probe = Probe::new(
            "probe-1",
            SourceLanguage::Python,
            ProbeLocation::line("app.py", 10),
            CaptureKind::Snapshot {
                limits: CaptureLimits::default(),
            },
        )
        .unwrap()
        .with_rate(1_000_000.0)
        .unwrap();
        if let Some(condition) = condition {
            probe = probe.with_condition(condition);
        }
        Arc::new(probe)
    }

    fn function_probe(evaluate_at: EvaluateAt) -> Arc<Probe> {
        Arc::new(
            Probe::new(
                "probe-f",
                SourceLanguage::Python,
                ProbeLocation::function_at("shop.cart", "Cart.total", evaluate_at),
                CaptureKind::snapshot(),
            )
            .unwrap()
            .with_rate(1_000_000.0)
            .unwrap(),
        )
    }

    fn frame() -> FrameSnapshot {
        FrameSnapshot::new("app.py", "work", 10)
            .with_arg("a", RuntimeValue::Int(42))
            .with_local("b", RuntimeValue::from("local"))
    }

    fn thread() -> ThreadInfo {
        ThreadInfo::new(1, "MainThread")
    }

    fn true_condition() -> ProbeExpression {
        ProbeExpression::new("a not null", |b: &Bindings| {
            Ok(RuntimeValue::Bool(
                !matches!(b.get("a"), Some(RuntimeValue::Null) | None),
            ))
        })
    }

    fn raising_condition() -> ProbeExpression {
        ProbeExpression::new("a.b.c", |_: &Bindings| Err("no attribute 'b'".to_string()))
    }

    #[test]
    fn test_line_commit() {
        let mut snapshot = Snapshot::new(snapshot_probe(None), frame(), thread());
        snapshot.line(None, None);
        assert_eq!(snapshot.event.state, CaptureState::Commit);
        let capture = snapshot.line_capture.as_ref().unwrap();
        assert!(capture.arguments.get("a").is_some());
        assert!(capture.locals.get("b").is_some());
    }

    #[test]
    fn test_line_condition_false_skips() {
        let condition =
            ProbeExpression::new("false", |_: &Bindings| Ok(RuntimeValue::Bool(false)));
        let mut snapshot = Snapshot::new(snapshot_probe(Some(condition)), frame(), thread());
        snapshot.line(None, None);
        assert_eq!(snapshot.event.state, CaptureState::SkipCond);
        assert!(snapshot.line_capture.is_none());
    }

    #[test]
    fn test_condition_error_recorded_once() {
        let mut snapshot =
            Snapshot::new(snapshot_probe(Some(raising_condition())), frame(), thread());
        snapshot.line(None, None);
        assert_eq!(snapshot.event.state, CaptureState::SkipCondError);
        assert_eq!(snapshot.event.errors.len(), 1);
        assert_eq!(snapshot.event.errors[0].expr, "a.b.c");
    }

    #[test]
    fn test_rate_denied_skips() {
        let probe = Arc::new(
            Probe::new(
                "muted",
                SourceLanguage::Python,
                ProbeLocation::line("app.py", 1),
                CaptureKind::snapshot(),
            )
            .unwrap()
            .with_rate(0.0)
            .unwrap(),
        );
        let mut snapshot = Snapshot::new(probe, frame(), thread());
        snapshot.line(None, None);
        assert_eq!(snapshot.event.state, CaptureState::SkipRate);
    }

    #[test]
    fn test_enter_commits_and_exit_adds_return() {
        let mut snapshot = Snapshot::new(function_probe(EvaluateAt::Default), frame(), thread());
        snapshot.enter();
        assert_eq!(snapshot.event.state, CaptureState::Commit);
        assert!(snapshot.entry_capture.is_some());

        snapshot.exit(RuntimeValue::Int(7), None, 1_500);
        assert_eq!(snapshot.event.state, CaptureState::Commit);
        assert_eq!(snapshot.duration_ns, Some(1_500));
        let return_capture = snapshot.return_capture.as_ref().unwrap();
        assert!(return_capture.locals.get(RETURN_BINDING).is_some());
    }

    #[test]
    fn test_exit_does_not_override_entry_skip() {
        let condition =
            ProbeExpression::new("false", |_: &Bindings| Ok(RuntimeValue::Bool(false)));
        let probe = Arc::new(
            Probe::new(
                "probe-f",
                SourceLanguage::Python,
                ProbeLocation::function("shop.cart", "Cart.total"),
                CaptureKind::snapshot(),
            )
            .unwrap()
            .with_rate(1_000_000.0)
            .unwrap()
            .with_condition(condition),
        );
        let mut snapshot = Snapshot::new(probe, frame(), thread());
        snapshot.enter();
        assert_eq!(snapshot.event.state, CaptureState::SkipCond);

        snapshot.exit(RuntimeValue::Int(7), None, 100);
        assert_eq!(snapshot.event.state, CaptureState::SkipCond);
        assert!(snapshot.return_capture.is_none());
    }

    #[test]
    fn test_exit_timing_defers_gating_to_exit() {
        let mut snapshot = Snapshot::new(function_probe(EvaluateAt::Exit), frame(), thread());
        snapshot.enter();
        assert_eq!(snapshot.event.state, CaptureState::None);
        assert!(snapshot.entry_capture.is_none());

        snapshot.exit(RuntimeValue::Int(7), None, 100);
        assert_eq!(snapshot.event.state, CaptureState::Commit);
        assert!(snapshot.return_capture.is_some());
    }

    #[test]
    fn test_exit_timing_condition_sees_return_and_duration() {
        let condition = ProbeExpression::new("@return == 7", |b: &Bindings| {
            let has_return = matches!(b.get(RETURN_BINDING), Some(RuntimeValue::Int(7)));
            let has_duration = b.contains_key(DURATION_BINDING);
            Ok(RuntimeValue::Bool(has_return && has_duration))
        });
        let probe = Arc::new(
            Probe::new(
                "probe-f",
                SourceLanguage::Python,
                ProbeLocation::function_at("shop.cart", "Cart.total", EvaluateAt::Exit),
                CaptureKind::snapshot(),
            )
            .unwrap()
            .with_rate(1_000_000.0)
            .unwrap()
            .with_condition(condition),
        );
        let mut snapshot = Snapshot::new(probe, frame(), thread());
        snapshot.exit(RuntimeValue::Int(7), None, 2_000);
        assert_eq!(snapshot.event.state, CaptureState::Commit);
    }

    #[test]
    fn test_exit_with_exception_omits_return_binding() {
        let mut snapshot = Snapshot::new(function_probe(EvaluateAt::Default), frame(), thread());
        snapshot.enter();
        let exc = ExceptionInfo::new("ValueError", vec![RuntimeValue::from("bad")]);
        snapshot.exit(RuntimeValue::Null, Some(exc), 900);

        let capture = snapshot.return_capture.as_ref().unwrap();
        assert!(capture.locals.get(RETURN_BINDING).is_none());
        assert_eq!(capture.throwable.as_ref().unwrap().type_name, "ValueError");
    }

    #[test]
    fn test_log_message_renders_segments() {
        let probe = Arc::new(
            Probe::new(
                "log-1",
                SourceLanguage::Python,
                ProbeLocation::line("app.py", 10),
                CaptureKind::Log {
                    template: "a = {a}".to_string(),
                    segments: vec![
                        TemplateSegment::literal("a = "),
                        TemplateSegment::Expr(ProbeExpression::name_ref("a")),
                    ],
                },
            )
            .unwrap()
            .with_rate(1_000_000.0)
            .unwrap(),
        );
        let mut log = LogMessage::new(probe, frame(), thread());
        log.line(None);
        assert_eq!(log.event.state, CaptureState::Commit);
        assert_eq!(log.message.as_deref(), Some("a = 42"));
    }

    #[test]
    fn test_log_segment_error_renders_error_literal() {
        let probe = Arc::new(
            Probe::new(
                "log-2",
                SourceLanguage::Python,
                ProbeLocation::line("app.py", 10),
                CaptureKind::Log {
                    template: "value: {missing}".to_string(),
                    segments: vec![
                        TemplateSegment::literal("value: "),
                        TemplateSegment::Expr(ProbeExpression::name_ref("missing")),
                    ],
                },
            )
            .unwrap()
            .with_rate(1_000_000.0)
            .unwrap(),
        );
        let mut log = LogMessage::new(probe, frame(), thread());
        log.line(None);
        assert_eq!(log.event.state, CaptureState::Commit);
        assert_eq!(log.message.as_deref(), Some("value: ERROR"));
        assert_eq!(log.event.errors.len(), 1);
    }

    #[test]
    fn test_metric_sample_evaluates_value() {
        let probe = Arc::new(
            Probe::new(
                "metric-1",
                SourceLanguage::Python,
                ProbeLocation::line("app.py", 10),
                CaptureKind::Metric {
                    kind: MetricKind::Distribution,
                    name: "cart.total".to_string(),
                    value: Some(ProbeExpression::name_ref("a")),
                },
            )
            .unwrap()
            .with_rate(1_000_000.0)
            .unwrap(),
        );
        let mut sample = MetricSample::new(probe, frame(), thread());
        sample.line(None);
        assert_eq!(sample.event.state, CaptureState::Commit);
        assert_eq!(
            sample.sample,
            Some(MetricEmission {
                kind: MetricKind::Distribution,
                name: "cart.total".to_string(),
                value: 42.0,
            })
        );
    }

    #[test]
    fn test_metric_without_expression_counts_one() {
        let probe = Arc::new(
            Probe::new(
                "metric-2",
                SourceLanguage::Python,
                ProbeLocation::line("app.py", 10),
                CaptureKind::Metric {
                    kind: MetricKind::Count,
                    name: "hits".to_string(),
                    value: None,
                },
            )
            .unwrap()
            .with_rate(1_000_000.0)
            .unwrap(),
        );
        let mut sample = MetricSample::new(probe, frame(), thread());
        sample.line(None);
        assert_eq!(sample.sample.as_ref().unwrap().value, 1.0);
    }

    #[test]
    fn test_metric_non_numeric_result_skips_with_error() {
        let probe = Arc::new(
            Probe::new(
                "metric-3",
                SourceLanguage::Python,
                ProbeLocation::line("app.py", 10),
                CaptureKind::Metric {
                    kind: MetricKind::Gauge,
                    name: "size".to_string(),
                    value: Some(ProbeExpression::name_ref("b")),
                },
            )
            .unwrap()
            .with_rate(1_000_000.0)
            .unwrap(),
        );
        let mut sample = MetricSample::new(probe, frame(), thread());
        sample.line(None);
        assert_eq!(sample.event.state, CaptureState::SkipCondError);
        assert!(sample.sample.is_none());
        assert_eq!(sample.event.errors.len(), 1);
    }

    #[test]
    fn test_for_probe_picks_variant() {
        let event = CapturedEvent::for_probe(snapshot_probe(None), frame(), thread());
        assert!(matches!(event, CapturedEvent::Snapshot(_)));
    }

    #[test]
    fn test_event_ids_unique() {
        let a = Snapshot::new(snapshot_probe(None), frame(), thread());
        let b = Snapshot::new(snapshot_probe(None), frame(), thread());
        assert_ne!(a.event.event_id, b.event.event_id);
    }

    #[test]
    fn test_precaptured_args_take_precedence_over_frame() {
        let event = EventContext::new(snapshot_probe(None), frame(), thread())
            .with_args(vec![("a".to_string(), RuntimeValue::Int(99))])
            .with_correlation(TraceContext {
                trace_id: 11,
                span_id: 22,
            });
        let mut snapshot = Snapshot {
            event,
            entry_capture: None,
            return_capture: None,
            line_capture: None,
            duration_ns: None,
        };
        snapshot.enter();

        let capture = snapshot.entry_capture.as_ref().unwrap();
        match capture.arguments.get("a").unwrap() {
            spyglass_core::CapturedValue::Primitive(p) => assert_eq!(p.value, "99"),
            other => panic!("unexpected capture: {:?}", other),
        }
        assert_eq!(snapshot.event.correlation.unwrap().trace_id, 11);
    }

    #[test]
    fn test_capture_state_names() {
        assert_eq!(CaptureState::None.as_str(), "NONE");
        assert_eq!(CaptureState::SkipCondError.as_str(), "SKIP_COND_ERROR");
        assert_eq!(CaptureState::Commit.as_str(), "COMMIT");
        assert!(!CaptureState::None.is_terminal());
        assert!(CaptureState::SkipRate.is_terminal());
    }

    #[test]
    fn test_condition_gate_passes_with_true_condition() {
        let mut snapshot =
            Snapshot::new(snapshot_probe(Some(true_condition())), frame(), thread());
        snapshot.line(None, None);
        assert_eq!(snapshot.event.state, CaptureState::Commit);
        assert!(snapshot.event.errors.is_empty());
    }
}
