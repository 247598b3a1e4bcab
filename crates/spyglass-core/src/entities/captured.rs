//! Captured value trees and contexts
//!
//! These are the bounded, already-inspected records that leave the process:
//! every variant serializes to the exact wire keys of the upload protocol
//! (`type`, `isNull`, `value`, `truncated`, `size`, `elements`, `entries`,
//! `fields`, `notCapturedReason`).

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Why a subtree was not captured in full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotCapturedReason {
    /// Recursion budget exhausted before inspecting contents
    Depth,
    /// Collection had more children than the size limit
    CollectionSize,
    /// Object had more fields than the field limit
    FieldCount,
}

/// Ordered name-to-capture map.
///
/// Serialized as a JSON object in insertion order; serde's derived maps
/// cannot keep tuple-vec ordering, so the `Serialize` impl is manual.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapturedFields(pub Vec<(String, CapturedValue)>);

impl CapturedFields {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look a capture up by name
    pub fn get(&self, name: &str) -> Option<&CapturedValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, CapturedValue)> {
        self.0.iter()
    }
}

impl Serialize for CapturedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, CapturedValue)> for CapturedFields {
    fn from_iter<I: IntoIterator<Item = (String, CapturedValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A bounded, depth-limited capture of a single runtime value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CapturedValue {
    Null(NullCapture),
    Primitive(PrimitiveCapture),
    Sequence(SequenceCapture),
    Mapping(MappingCapture),
    Object(ObjectCapture),
    DepthCut(DepthCutCapture),
}

impl CapturedValue {
    /// The captured type name, whatever the variant
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null(v) => &v.type_name,
            Self::Primitive(v) => &v.type_name,
            Self::Sequence(v) => &v.type_name,
            Self::Mapping(v) => &v.type_name,
            Self::Object(v) => &v.type_name,
            Self::DepthCut(v) => &v.type_name,
        }
    }

    pub fn null() -> Self {
        Self::Null(NullCapture::default())
    }
}

/// `{"type": "NoneType", "isNull": true}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullCapture {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "isNull")]
    pub is_null: bool,
}

impl Default for NullCapture {
    fn default() -> Self {
        Self {
            type_name: "NoneType".to_string(),
            is_null: true,
        }
    }
}

/// A primitive rendered as bounded text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveCapture {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
    /// Set when the text was cut at the length limit
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    /// Original text length, present only when truncated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl PrimitiveCapture {
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
            truncated: false,
            size: None,
        }
    }
}

/// A sequence or set with up to `max_size` captured children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceCapture {
    #[serde(rename = "type")]
    pub type_name: String,
    pub elements: Vec<CapturedValue>,
    /// Declared size of the source collection (may exceed `elements.len()`)
    pub size: usize,
    #[serde(rename = "notCapturedReason", skip_serializing_if = "Option::is_none")]
    pub not_captured_reason: Option<NotCapturedReason>,
}

/// A key-value collection with up to `max_size` captured pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingCapture {
    #[serde(rename = "type")]
    pub type_name: String,
    pub entries: Vec<(CapturedValue, CapturedValue)>,
    pub size: usize,
    #[serde(rename = "notCapturedReason", skip_serializing_if = "Option::is_none")]
    pub not_captured_reason: Option<NotCapturedReason>,
}

/// An object with up to `max_fields` captured fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectCapture {
    #[serde(rename = "type")]
    pub type_name: String,
    pub fields: CapturedFields,
    #[serde(rename = "notCapturedReason", skip_serializing_if = "Option::is_none")]
    pub not_captured_reason: Option<NotCapturedReason>,
}

/// Terminal marker for a value whose contents the recursion budget did not
/// reach
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthCutCapture {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "notCapturedReason")]
    pub not_captured_reason: NotCapturedReason,
    /// Declared size, when the cut value was a collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl DepthCutCapture {
    pub fn new(type_name: impl Into<String>, size: Option<usize>) -> Self {
        Self {
            type_name: type_name.into(),
            not_captured_reason: NotCapturedReason::Depth,
            size,
        }
    }
}

/// One stack frame entry of an upload payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackEntry {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub function: String,
    #[serde(rename = "lineNumber")]
    pub line_number: u32,
}

/// A captured exception: type, rendered message, and the traceback walked
/// from its deepest frame outward
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionCapture {
    #[serde(rename = "type")]
    pub type_name: String,
    pub message: String,
    pub stacktrace: Option<Vec<StackEntry>>,
}

/// The captured surroundings of one probe leg (entry, return, or line)
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CapturedContext {
    pub arguments: CapturedFields,
    pub locals: CapturedFields,
    pub throwable: Option<ExceptionCapture>,
}

impl CapturedContext {
    /// The payload shape for a leg that never ran
    pub fn empty() -> Self {
        Self::default()
    }
}
