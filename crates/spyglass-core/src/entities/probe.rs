//! Probe model - configured instrumentation points
//!
//! A probe is assembled by composition rather than inheritance: one struct
//! holding a location discriminant (line vs function), an optional condition,
//! and a capture-kind discriminant (snapshot vs log vs metric), each variant
//! carrying its own data. Capability checks are pattern matches.

use super::language::SourceLanguage;
use super::limits::CaptureLimits;
use crate::error::{Error, Result};
use crate::expressions::{ProbeExpression, TemplateSegment};
use crate::rate_limit::RateLimiter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Default events-per-second budget for a probe
pub const DEFAULT_PROBE_RATE: f64 = 1.0;

/// When a function probe evaluates its condition and captures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvaluateAt {
    /// Runtime picks: gate at entry, enrich at exit
    #[default]
    Default,
    Enter,
    Exit,
}

impl EvaluateAt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Enter => "ENTER",
            Self::Exit => "EXIT",
        }
    }
}

impl fmt::Display for EvaluateAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a probe is installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeLocation {
    /// A specific line of a source file
    Line { source_file: String, line: u32 },
    /// A function boundary
    Function {
        module: String,
        func_qname: String,
        evaluate_at: EvaluateAt,
    },
}

impl ProbeLocation {
    pub fn line(source_file: impl Into<String>, line: u32) -> Self {
        Self::Line {
            source_file: source_file.into(),
            line,
        }
    }

    pub fn function(module: impl Into<String>, func_qname: impl Into<String>) -> Self {
        Self::Function {
            module: module.into(),
            func_qname: func_qname.into(),
            evaluate_at: EvaluateAt::Default,
        }
    }

    pub fn function_at(
        module: impl Into<String>,
        func_qname: impl Into<String>,
        evaluate_at: EvaluateAt,
    ) -> Self {
        Self::Function {
            module: module.into(),
            func_qname: func_qname.into(),
            evaluate_at,
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Self::Line { .. })
    }

    /// The probe's evaluation timing; line probes always use `Default`
    pub fn evaluate_at(&self) -> EvaluateAt {
        match self {
            Self::Line { .. } => EvaluateAt::Default,
            Self::Function { evaluate_at, .. } => *evaluate_at,
        }
    }
}

/// Kind of metric a metric probe emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Count,
    Gauge,
    Histogram,
    Distribution,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
            Self::Distribution => "distribution",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a probe captures when it commits
#[derive(Debug, Clone)]
pub enum CaptureKind {
    /// Full bounded state snapshot (arguments, locals, return, exception)
    Snapshot { limits: CaptureLimits },
    /// A templated log message rendered against the frame
    Log {
        template: String,
        segments: Vec<TemplateSegment>,
    },
    /// A numeric sample for the metrics sink; a missing value expression
    /// means a unit count
    Metric {
        kind: MetricKind,
        name: String,
        value: Option<ProbeExpression>,
    },
}

impl CaptureKind {
    pub fn snapshot() -> Self {
        Self::Snapshot {
            limits: CaptureLimits::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::Log { .. } => "log",
            Self::Metric { .. } => "metric",
        }
    }
}

/// A configured instrumentation point.
///
/// Created by the probe registry when a debugging configuration arrives and
/// dropped when it is withdrawn. Apart from the `active` flag, a probe is
/// never mutated after construction; events hold it behind an `Arc`.
#[derive(Debug)]
pub struct Probe {
    pub probe_id: String,
    pub tags: HashMap<String, String>,
    active: AtomicBool,
    /// Events-per-second budget the limiter was sized for
    pub rate: f64,
    pub limiter: RateLimiter,
    pub language: SourceLanguage,
    pub location: ProbeLocation,
    pub condition: Option<ProbeExpression>,
    pub capture: CaptureKind,
}

impl Probe {
    /// Create a probe with the default rate and no condition.
    ///
    /// The token-bucket limiter is sized from the rate at construction
    /// (`tau = 1/rate`, or 1.0 for a zero rate).
    pub fn new(
        probe_id: impl Into<String>,
        language: SourceLanguage,
        location: ProbeLocation,
        capture: CaptureKind,
    ) -> Result<Self> {
        let probe_id = probe_id.into();
        if probe_id.is_empty() {
            return Err(Error::InvalidProbe("probe id cannot be empty".to_string()));
        }
        if let ProbeLocation::Line { line: 0, .. } = location {
            return Err(Error::InvalidLocation(
                "line numbers start at 1".to_string(),
            ));
        }

        Ok(Self {
            limiter: Self::build_limiter(&probe_id, DEFAULT_PROBE_RATE),
            probe_id,
            tags: HashMap::new(),
            active: AtomicBool::new(true),
            rate: DEFAULT_PROBE_RATE,
            language,
            location,
            condition: None,
            capture,
        })
    }

    fn build_limiter(probe_id: &str, rate: f64) -> RateLimiter {
        let id = probe_id.to_string();
        RateLimiter::new(rate).with_on_exceed(move || {
            warn!(probe_id = %id, "Rate limit exceeded for probe");
        })
    }

    /// Replace the rate and rebuild the limiter accordingly
    pub fn with_rate(mut self, rate: f64) -> Result<Self> {
        if rate < 0.0 || !rate.is_finite() {
            return Err(Error::InvalidProbe(format!(
                "rate must be a finite non-negative number, got {}",
                rate
            )));
        }
        self.rate = rate;
        self.limiter = Self::build_limiter(&self.probe_id, rate);
        Ok(self)
    }

    pub fn with_condition(mut self, condition: ProbeExpression) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Allow the probe to fire
    pub fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    /// Stop the probe from firing without removing it
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// The probe's evaluation timing (line probes always `Default`)
    pub fn evaluate_at(&self) -> EvaluateAt {
        self.location.evaluate_at()
    }

    /// The inspection limits captures run under.
    ///
    /// Snapshot probes carry explicit limits; log and metric probes render
    /// through the defaults.
    pub fn capture_limits(&self) -> CaptureLimits {
        match &self.capture {
            CaptureKind::Snapshot { limits } => limits.clone(),
            _ => CaptureLimits::default(),
        }
    }
}
