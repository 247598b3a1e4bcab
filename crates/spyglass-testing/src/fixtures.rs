//! Test fixtures and sample data factories
//!
//! Convenient builders for probes, frames, and the object graphs the
//! inspector tests lean on. All sample probes use an effectively unlimited
//! rate so tests exercise gating logic explicitly, not by accident of
//! timing.

use spyglass_core::{
    CaptureKind, CaptureLimits, FrameSnapshot, MetricKind, ObjectValue, Probe, ProbeExpression,
    ProbeLocation, RuntimeValue, SourceLanguage, TemplateSegment, ThreadInfo,
};
use std::sync::Arc;

/// Rate high enough that the limiter never interferes with a test
pub const UNLIMITED_RATE: f64 = 1_000_000_000.0;

/// A snapshot line probe at `app.py:42` with default limits
pub fn snapshot_line_probe(probe_id: &str) -> Arc<Probe> {
    Arc::new(
        Probe::new(
            probe_id,
            SourceLanguage::Python,
            ProbeLocation::line("app.py", 42),
            CaptureKind::snapshot(),
        )
        .expect("valid probe")
        .with_rate(UNLIMITED_RATE)
        .expect("valid rate"),
    )
}

/// A snapshot function probe for `shop.cart::Cart.total`
pub fn snapshot_function_probe(probe_id: &str) -> Arc<Probe> {
    Arc::new(
        Probe::new(
            probe_id,
            SourceLanguage::Python,
            ProbeLocation::function("shop.cart", "Cart.total"),
            CaptureKind::snapshot(),
        )
        .expect("valid probe")
        .with_rate(UNLIMITED_RATE)
        .expect("valid rate"),
    )
}

/// A snapshot line probe with explicit capture limits
pub fn snapshot_probe_with_limits(probe_id: &str, limits: CaptureLimits) -> Arc<Probe> {
    Arc::new(
        Probe::new(
            probe_id,
            SourceLanguage::Python,
            ProbeLocation::line("app.py", 42),
            CaptureKind::Snapshot { limits },
        )
        .expect("valid probe")
        .with_rate(UNLIMITED_RATE)
        .expect("valid rate"),
    )
}

/// A log probe rendering `"a = {a}"`
pub fn log_line_probe(probe_id: &str) -> Arc<Probe> {
    Arc::new(
        Probe::new(
            probe_id,
            SourceLanguage::Python,
            ProbeLocation::line("app.py", 42),
            CaptureKind::Log {
                template: "a = {a}".to_string(),
                segments: vec![
                    TemplateSegment::literal("a = "),
                    TemplateSegment::Expr(ProbeExpression::name_ref("a")),
                ],
            },
        )
        .expect("valid probe")
        .with_rate(UNLIMITED_RATE)
        .expect("valid rate"),
    )
}

/// A distribution metric probe sampling the local `a`
pub fn metric_line_probe(probe_id: &str, name: &str) -> Arc<Probe> {
    Arc::new(
        Probe::new(
            probe_id,
            SourceLanguage::Python,
            ProbeLocation::line("app.py", 42),
            CaptureKind::Metric {
                kind: MetricKind::Distribution,
                name: name.to_string(),
                value: Some(ProbeExpression::name_ref("a")),
            },
        )
        .expect("valid probe")
        .with_rate(UNLIMITED_RATE)
        .expect("valid rate"),
    )
}

/// A frame at `app.py:42` with one argument `a = 42` and one local
/// `b = "local"`
pub fn sample_frame() -> FrameSnapshot {
    FrameSnapshot::new("app.py", "work", 42)
        .with_arg("a", RuntimeValue::Int(42))
        .with_local("b", RuntimeValue::from("local"))
}

/// Main-thread info
pub fn sample_thread() -> ThreadInfo {
    ThreadInfo::new(1, "MainThread")
}

/// A condition that always evaluates false
pub fn false_condition() -> ProbeExpression {
    ProbeExpression::new("false", |_| Ok(RuntimeValue::Bool(false)))
}

/// A condition whose evaluation always fails
pub fn raising_condition(source: &str) -> ProbeExpression {
    let message = format!("cannot evaluate '{}'", source);
    ProbeExpression::new(source, move |_| Err(message.clone()))
}

/// The binary-tree object graph used by depth-limit tests:
/// `Tree("root", Node("0", Node("0l", Node("0ll"), Node("0lr")), Node("0r", Node("0rl"))))`
pub fn tree() -> RuntimeValue {
    fn node(name: &str, left: Option<RuntimeValue>, right: Option<RuntimeValue>) -> RuntimeValue {
        RuntimeValue::Object(
            ObjectValue::new("Node")
                .with_field("name", RuntimeValue::from(name))
                .with_field("left", left.unwrap_or(RuntimeValue::Null))
                .with_field("right", right.unwrap_or(RuntimeValue::Null)),
        )
    }

    RuntimeValue::Object(
        ObjectValue::new("Tree")
            .with_field("name", RuntimeValue::from("root"))
            .with_field(
                "root",
                node(
                    "0",
                    Some(node(
                        "0l",
                        Some(node("0ll", None, None)),
                        Some(node("0lr", None, None)),
                    )),
                    Some(node("0r", Some(node("0rl", None, None)), None)),
                ),
            ),
    )
}

/// An object whose every field read failed in the target
pub fn side_effects_object() -> RuntimeValue {
    RuntimeValue::Object(ObjectValue::new("SideEffects").with_failing_field(
        "property_with_side_effect",
        "SideEffect",
        "side effect triggered",
    ))
}

/// A value nested `depth` objects deep
pub fn deep_value(depth: usize) -> RuntimeValue {
    let mut value = RuntimeValue::from("bottom");
    for _ in 0..depth {
        value = RuntimeValue::Object(ObjectValue::new("Layer").with_field("inner", value));
    }
    value
}

/// A sequence of `len` integers
pub fn wide_seq(len: usize) -> RuntimeValue {
    RuntimeValue::Seq((0..len as i64).map(RuntimeValue::Int).collect())
}
