//! Upload payload builders and per-kind encoders
//!
//! Committed events are serialized to the upload JSON shape here, once per
//! event and outside the encoder's buffer lock. Each event kind has its own
//! encoder registered with the batch encoder.

use crate::event::{CapturedEvent, EvaluationError, LogMessage, Snapshot};
use crate::inspect::capture_stack;
use serde::Serialize;
use spyglass_core::{CapturedContext, CapturedFields, CapturedValue, ProbeLocation, StackEntry};
use spyglass_output::{EncoderItem, Error, ItemEncoder, Result};
use std::collections::BTreeMap;

/// Discriminant for the encoder registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Snapshot,
    Log,
    Metric,
}

impl EventKind {
    pub fn of(event: &CapturedEvent) -> Self {
        match event {
            CapturedEvent::Snapshot(_) => Self::Snapshot,
            CapturedEvent::Log(_) => Self::Log,
            CapturedEvent::Metric(_) => Self::Metric,
        }
    }
}

impl EncoderItem for CapturedEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        EventKind::of(self)
    }
}

#[derive(Serialize)]
struct SnapshotPayload {
    id: String,
    timestamp: i64,
    duration: Option<u64>,
    stack: Vec<StackEntry>,
    captures: SnapshotCaptures,
    probe: ProbeRef,
    language: &'static str,
    message: String,
}

#[derive(Serialize)]
struct SnapshotCaptures {
    entry: CapturedContext,
    #[serde(rename = "return")]
    return_capture: CapturedContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<BTreeMap<String, CapturedContext>>,
}

#[derive(Serialize)]
struct ProbeRef {
    id: String,
    location: LocationRef,
}

#[derive(Serialize)]
#[serde(untagged)]
enum LocationRef {
    Line {
        file: String,
        lines: Vec<u32>,
    },
    Function {
        #[serde(rename = "type")]
        module: String,
        method: String,
    },
}

impl LocationRef {
    fn of(location: &ProbeLocation) -> Self {
        match location {
            ProbeLocation::Line { source_file, line } => Self::Line {
                file: source_file.clone(),
                lines: vec![*line],
            },
            ProbeLocation::Function {
                module, func_qname, ..
            } => Self::Function {
                module: module.clone(),
                method: func_qname.clone(),
            },
        }
    }
}

#[derive(Serialize)]
struct LogPayload {
    id: String,
    probe: ProbeRef,
    #[serde(rename = "evaluationErrors")]
    evaluation_errors: Vec<EvaluationError>,
    timestamp: i64,
    language: &'static str,
    message: Option<String>,
}

/// Single-line human summary of a captured value
pub fn format_captured_value(value: &CapturedValue) -> String {
    match value {
        CapturedValue::Null(_) => "null".to_string(),
        CapturedValue::Primitive(p) => p.value.clone(),
        CapturedValue::Sequence(seq) => format!(
            "{}({})",
            seq.type_name,
            seq.elements
                .iter()
                .map(format_captured_value)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        CapturedValue::Mapping(map) => format!(
            "{{{}}}",
            map.entries
                .iter()
                .map(|(k, v)| format!(
                    "{}: {}",
                    format_captured_value(k),
                    format_captured_value(v)
                ))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        CapturedValue::Object(obj) => format!(
            "{}({})",
            obj.type_name,
            obj.fields
                .iter()
                .map(|(name, v)| format!("{}={}", name, format_captured_value(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        CapturedValue::DepthCut(cut) => format!("{}()", cut.type_name),
    }
}

/// Single-line human summary of a call: `func(a=1, b=2)` plus the return
/// value when captured
pub fn format_message(
    function: &str,
    args: &CapturedFields,
    retval: Option<&CapturedValue>,
) -> String {
    let message = format!(
        "{}({})",
        function,
        args.iter()
            .map(|(name, value)| format!("{}={}", name, format_captured_value(value)))
            .collect::<Vec<_>>()
            .join(", ")
    );

    match retval {
        Some(value) => format!("{}\n@return={}", message, format_captured_value(value)),
        None => message,
    }
}

fn snapshot_message(snapshot: &Snapshot) -> String {
    let probe = &snapshot.event.probe;
    if probe.location.is_line() {
        let empty = CapturedFields::default();
        let arguments = snapshot
            .line_capture
            .as_ref()
            .map(|capture| &capture.arguments)
            .unwrap_or(&empty);
        format_message(&snapshot.event.frame.function, arguments, None)
    } else {
        let empty = CapturedFields::default();
        let arguments = snapshot
            .entry_capture
            .as_ref()
            .map(|capture| &capture.arguments)
            .unwrap_or(&empty);
        let retval = snapshot
            .return_capture
            .as_ref()
            .and_then(|capture| capture.locals.get(crate::event::RETURN_BINDING));
        let function = match &probe.location {
            ProbeLocation::Function { func_qname, .. } => func_qname.as_str(),
            ProbeLocation::Line { .. } => snapshot.event.frame.function.as_str(),
        };
        format_message(function, arguments, retval)
    }
}

fn build_snapshot_payload(snapshot: &Snapshot) -> SnapshotPayload {
    let probe = &snapshot.event.probe;

    let lines = match &probe.location {
        ProbeLocation::Line { line, .. } => {
            let mut map = BTreeMap::new();
            map.insert(
                line.to_string(),
                snapshot
                    .line_capture
                    .clone()
                    .unwrap_or_else(CapturedContext::empty),
            );
            Some(map)
        }
        ProbeLocation::Function { .. } => None,
    };

    SnapshotPayload {
        id: snapshot.event.event_id.clone(),
        timestamp: snapshot.event.timestamp_ms,
        duration: snapshot.duration_ns,
        stack: capture_stack(&snapshot.event.frame),
        captures: SnapshotCaptures {
            entry: snapshot
                .entry_capture
                .clone()
                .unwrap_or_else(CapturedContext::empty),
            return_capture: snapshot
                .return_capture
                .clone()
                .unwrap_or_else(CapturedContext::empty),
            lines,
        },
        probe: ProbeRef {
            id: probe.probe_id.clone(),
            location: LocationRef::of(&probe.location),
        },
        language: probe.language.as_str(),
        message: snapshot_message(snapshot),
    }
}

fn build_log_payload(log: &LogMessage) -> LogPayload {
    let probe = &log.event.probe;
    LogPayload {
        id: log.event.event_id.clone(),
        probe: ProbeRef {
            id: probe.probe_id.clone(),
            location: LocationRef::of(&probe.location),
        },
        evaluation_errors: log.event.errors.clone(),
        timestamp: log.event.timestamp_ms,
        language: probe.language.as_str(),
        message: log.message.clone(),
    }
}

/// Encoder for committed snapshots
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotJsonEncoder;

impl SnapshotJsonEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl ItemEncoder<CapturedEvent> for SnapshotJsonEncoder {
    fn encode(&self, item: &CapturedEvent) -> Result<Vec<u8>> {
        match item {
            CapturedEvent::Snapshot(snapshot) => serde_json::to_vec(&build_snapshot_payload(
                snapshot,
            ))
            .map_err(|err| Error::Serialization(err.to_string())),
            other => Err(Error::UnknownItemType(format!("{:?}", EventKind::of(other)))),
        }
    }
}

/// Encoder for committed log messages
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessageJsonEncoder;

impl LogMessageJsonEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl ItemEncoder<CapturedEvent> for LogMessageJsonEncoder {
    fn encode(&self, item: &CapturedEvent) -> Result<Vec<u8>> {
        match item {
            CapturedEvent::Log(log) => serde_json::to_vec(&build_log_payload(log))
                .map_err(|err| Error::Serialization(err.to_string())),
            other => Err(Error::UnknownItemType(format!("{:?}", EventKind::of(other)))),
        }
    }
}
