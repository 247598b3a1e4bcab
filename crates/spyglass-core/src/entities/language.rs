//! Source language tag for probes and upload payloads

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of the instrumented target application.
///
/// Carried by every probe and stamped on upload payloads so the backend can
/// pick the right rendering for captured values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    Python,
    Go,
    Rust,
    JavaScript,
    Java,
    Ruby,
}

impl SourceLanguage {
    /// Lowercase string representation used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::JavaScript => "javascript",
            Self::Java => "java",
            Self::Ruby => "ruby",
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceLanguage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "go" => Ok(Self::Go),
            "rust" => Ok(Self::Rust),
            "javascript" => Ok(Self::JavaScript),
            "java" => Ok(Self::Java),
            "ruby" => Ok(Self::Ruby),
            other => Err(format!("Unknown source language: '{}'", other)),
        }
    }
}
