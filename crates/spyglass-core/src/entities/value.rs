//! Runtime value tree - the dynamic representation of target-program values
//!
//! Host-runtime adapters translate whatever the paused target hands them into
//! this closed classification (primitive / sequence / set / mapping / callable
//! / object) before the inspector ever sees it. There is no open-ended
//! reflection here: an unrecognized shape arrives as an `Object` with whatever
//! raw field slots the adapter could read.

/// A single field slot of an object.
///
/// Slots come from the lowest-level attribute storage of the host runtime
/// (a raw attribute table or fixed slot list), bypassing any intercepting
/// accessor logic. A slot whose read failed carries the failure instead of a
/// value, so inspection never has to touch the target again.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAccess {
    /// The slot held a readable value.
    Value(RuntimeValue),
    /// Reading the slot raised in the target runtime.
    Error { type_name: String, message: String },
}

/// An object with named field slots in declaration order.
///
/// Declaration order is whatever order the host adapter enumerated the raw
/// attribute storage in; for slotted objects that is base-to-derived slot
/// declaration order. An object whose attribute storage could not be read at
/// all simply has no slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub type_name: String,
    pub fields: Vec<(String, FieldAccess)>,
}

impl ObjectValue {
    /// Create an object with no fields
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a readable field slot
    pub fn with_field(mut self, name: impl Into<String>, value: RuntimeValue) -> Self {
        self.fields.push((name.into(), FieldAccess::Value(value)));
        self
    }

    /// Append a field slot whose read failed in the target
    pub fn with_failing_field(
        mut self,
        name: impl Into<String>,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FieldAccess::Error {
                type_name: error_type.into(),
                message: message.into(),
            },
        ));
        self
    }
}

/// A target-program value as delivered by a host-runtime adapter
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Ordered sequence (lists, arrays, tuples)
    Seq(Vec<RuntimeValue>),
    /// Unordered collection, in the adapter's iteration order
    Set(Vec<RuntimeValue>),
    /// Key-value collection, in insertion order
    Map(Vec<(RuntimeValue, RuntimeValue)>),
    /// A callable; only its identity is ever rendered, it is never invoked
    Callable { name: String },
    Object(ObjectValue),
}

impl RuntimeValue {
    /// The wire-level type name of this value
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Seq(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "dict",
            Self::Callable { .. } => "function",
            Self::Object(obj) => &obj.type_name,
        }
    }

    /// Whether this value is a primitive (rendered as text, never recursed into)
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::Bool(_)
                | Self::Int(_)
                | Self::Float(_)
                | Self::Str(_)
                | Self::Bytes(_)
        )
    }

    /// Number of children for collections, `None` otherwise
    pub fn collection_len(&self) -> Option<usize> {
        match self {
            Self::Seq(v) | Self::Set(v) => Some(v.len()),
            Self::Map(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Truthiness as the source runtime defines it: null, false, zero and
    /// empty collections/strings are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Bytes(b) => !b.is_empty(),
            Self::Seq(v) | Self::Set(v) => !v.is_empty(),
            Self::Map(v) => !v.is_empty(),
            Self::Callable { .. } => true,
            Self::Object(_) => true,
        }
    }

    /// Numeric view of this value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Textual representation of a primitive value.
    ///
    /// Strings are single-quoted, byte strings rendered as `b'...'` with
    /// ASCII escaping, null/booleans use the wire spellings (`null`, `true`,
    /// `false`). Non-primitive values render their type name; callers are
    /// expected to handle collections and objects structurally.
    pub fn repr(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(true) => "true".to_string(),
            Self::Bool(false) => "false".to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => format!("'{}'", s),
            Self::Bytes(b) => format!("b'{}'", b.escape_ascii()),
            Self::Callable { name } => format!("<function {}>", name),
            other => format!("<{}>", other.type_name()),
        }
    }
}

impl From<&str> for RuntimeValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for RuntimeValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for RuntimeValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for RuntimeValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for RuntimeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
