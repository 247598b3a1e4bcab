//! Safe value inspector
//!
//! Converts runtime values into bounded, depth-limited capture records and
//! bounded text. Inspection is total: it never fails outward, never invokes
//! anything in the target, and its cost is bounded by the capture limits
//! (depth x fan-out x field count), whatever the shape of the input.

use spyglass_core::{
    CaptureLimits, CapturedContext, CapturedValue, DepthCutCapture, ExceptionCapture,
    ExceptionInfo, FieldAccess, FrameSnapshot, MappingCapture, NotCapturedReason, ObjectCapture,
    PrimitiveCapture, RuntimeValue, SequenceCapture, StackEntry,
};

/// Maximum number of frames walked when capturing a stack, bounding cost on
/// pathological recursion
pub const MAX_STACK_HEIGHT: usize = 4096;

/// Capture a runtime value under the given limits.
///
/// The result tree is at most `max_level + 1` deep; values the recursion
/// budget does not reach surface as depth-cut markers.
pub fn capture_value(value: &RuntimeValue, limits: &CaptureLimits) -> CapturedValue {
    capture_at_level(value, limits.max_level as i64, limits)
}

fn capture_at_level(value: &RuntimeValue, level: i64, limits: &CaptureLimits) -> CapturedValue {
    if level < 0 {
        return CapturedValue::DepthCut(DepthCutCapture::new(
            value.type_name(),
            value.collection_len(),
        ));
    }

    match value {
        RuntimeValue::Null => CapturedValue::null(),
        RuntimeValue::Bool(_)
        | RuntimeValue::Int(_)
        | RuntimeValue::Float(_)
        | RuntimeValue::Str(_)
        | RuntimeValue::Bytes(_)
        | RuntimeValue::Callable { .. } => capture_primitive(value, limits),
        RuntimeValue::Seq(items) | RuntimeValue::Set(items) => {
            let elements = items
                .iter()
                .take(limits.max_size)
                .map(|item| capture_at_level(item, level - 1, limits))
                .collect();
            CapturedValue::Sequence(SequenceCapture {
                type_name: value.type_name().to_string(),
                elements,
                size: items.len(),
                not_captured_reason: (items.len() > limits.max_size)
                    .then_some(NotCapturedReason::CollectionSize),
            })
        }
        RuntimeValue::Map(pairs) => {
            let entries = pairs
                .iter()
                .take(limits.max_size)
                .map(|(key, val)| {
                    (
                        capture_at_level(key, level - 1, limits),
                        capture_at_level(val, level - 1, limits),
                    )
                })
                .collect();
            CapturedValue::Mapping(MappingCapture {
                type_name: value.type_name().to_string(),
                entries,
                size: pairs.len(),
                not_captured_reason: (pairs.len() > limits.max_size)
                    .then_some(NotCapturedReason::CollectionSize),
            })
        }
        RuntimeValue::Object(obj) => {
            let fields = obj
                .fields
                .iter()
                .take(limits.max_fields)
                .map(|(name, access)| {
                    let captured = match access {
                        FieldAccess::Value(field) => capture_at_level(field, level - 1, limits),
                        FieldAccess::Error { type_name, message } => {
                            capture_text(type_name, message, limits)
                        }
                    };
                    (name.clone(), captured)
                })
                .collect();
            CapturedValue::Object(ObjectCapture {
                type_name: obj.type_name.clone(),
                fields,
                not_captured_reason: (obj.fields.len() > limits.max_fields)
                    .then_some(NotCapturedReason::FieldCount),
            })
        }
    }
}

fn capture_primitive(value: &RuntimeValue, limits: &CaptureLimits) -> CapturedValue {
    let repr = value.repr();
    capture_text(value.type_name(), &repr, limits)
}

/// Bounded text capture; the placeholder path for failing field slots also
/// lands here, with the error type as the captured type.
fn capture_text(type_name: &str, text: &str, limits: &CaptureLimits) -> CapturedValue {
    let length = text.chars().count();
    if length <= limits.max_len {
        CapturedValue::Primitive(PrimitiveCapture::new(type_name, text))
    } else {
        CapturedValue::Primitive(PrimitiveCapture {
            type_name: type_name.to_string(),
            value: text.chars().take(limits.max_len).collect(),
            truncated: true,
            size: Some(length),
        })
    }
}

/// Render a runtime value as bounded repr-style text.
///
/// Used for log-message segments and exception messages. `level` counts down
/// per nesting level and cuts at zero; a negative starting level disables
/// the depth cut. Collections overflowing `max_size` end with `, ...`, an
/// empty set renders as the explicit `set()` marker, and depth-exhausted
/// values render as `<typename>`.
pub fn serialize(value: &RuntimeValue, level: i64, limits: &CaptureLimits) -> String {
    match value {
        RuntimeValue::Callable { name } => format!("<function {}>", name),
        RuntimeValue::Null
        | RuntimeValue::Bool(_)
        | RuntimeValue::Int(_)
        | RuntimeValue::Float(_)
        | RuntimeValue::Str(_)
        | RuntimeValue::Bytes(_) => {
            let repr = value.repr();
            if repr.chars().count() > limits.max_len {
                let mut out: String = repr.chars().take(limits.max_len).collect();
                out.push_str("...");
                if repr.starts_with('\'') {
                    out.push('\'');
                }
                out
            } else {
                repr
            }
        }
        _ if level == 0 => format!("<{}>", value.type_name()),
        RuntimeValue::Seq(items) => serialize_collection(items, ('[', ']'), level, limits),
        RuntimeValue::Set(items) => {
            if items.is_empty() {
                "set()".to_string()
            } else {
                serialize_collection(items, ('{', '}'), level, limits)
            }
        }
        RuntimeValue::Map(pairs) => {
            let ellipsis = if pairs.len() > limits.max_size {
                ", ..."
            } else {
                ""
            };
            let body = pairs
                .iter()
                .take(limits.max_size)
                .map(|(key, val)| {
                    format!(
                        "{}: {}",
                        serialize(key, level - 1, limits),
                        serialize(val, level - 1, limits)
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{}{}}}", body, ellipsis)
        }
        RuntimeValue::Object(obj) => {
            let body = obj
                .fields
                .iter()
                .take(limits.max_fields)
                .map(|(name, access)| match access {
                    FieldAccess::Value(field) => {
                        format!("{}={}", name, serialize(field, level - 1, limits))
                    }
                    FieldAccess::Error { type_name, .. } => format!("{}=<{}>", name, type_name),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}({})", obj.type_name, body)
        }
    }
}

fn serialize_collection(
    items: &[RuntimeValue],
    brackets: (char, char),
    level: i64,
    limits: &CaptureLimits,
) -> String {
    let ellipsis = if items.len() > limits.max_size {
        ", ..."
    } else {
        ""
    };
    let body = items
        .iter()
        .take(limits.max_size)
        .map(|item| serialize(item, level - 1, limits))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}{}{}{}", brackets.0, body, ellipsis, brackets.1)
}

/// Walk a frame's caller chain into stack entries, innermost first.
pub fn capture_stack(top: &FrameSnapshot) -> Vec<StackEntry> {
    let mut stack = Vec::new();
    let mut frame = Some(top);
    while let Some(current) = frame {
        if stack.len() >= MAX_STACK_HEIGHT {
            break;
        }
        stack.push(StackEntry {
            file_name: current.file.clone(),
            function: current.function.clone(),
            line_number: current.line,
        });
        frame = current.caller.as_deref();
    }
    stack
}

/// Capture an in-flight exception, if any.
///
/// The message is the serialized exception argument list; the stacktrace
/// starts at the deepest frame of the traceback and ascends outward.
pub fn capture_exception(
    exc_info: Option<&ExceptionInfo>,
    limits: &CaptureLimits,
) -> Option<ExceptionCapture> {
    let exc = exc_info?;
    Some(ExceptionCapture {
        type_name: exc.type_name.clone(),
        message: exc
            .args
            .iter()
            .map(|arg| serialize(arg, limits.max_level as i64, limits))
            .collect::<Vec<_>>()
            .join(", "),
        stacktrace: exc.frame.as_ref().map(capture_stack),
    })
}

/// Capture one probe leg: named arguments, named locals, and any in-flight
/// exception, all under the same limits.
pub fn captured_context(
    arguments: &[(String, RuntimeValue)],
    locals: &[(String, RuntimeValue)],
    throwable: Option<&ExceptionInfo>,
    limits: &CaptureLimits,
) -> CapturedContext {
    CapturedContext {
        arguments: arguments
            .iter()
            .map(|(name, value)| (name.clone(), capture_value(value, limits)))
            .collect(),
        locals: locals
            .iter()
            .map(|(name, value)| (name.clone(), capture_value(value, limits)))
            .collect(),
        throwable: capture_exception(throwable, limits),
    }
}
