//! Capture limits value object

use serde::{Deserialize, Serialize};

/// Default maximum recursion depth for value inspection
pub const DEFAULT_MAX_LEVEL: usize = 2;
/// Default maximum number of collection children captured
pub const DEFAULT_MAX_SIZE: usize = 100;
/// Default maximum length of a primitive's textual form
pub const DEFAULT_MAX_LEN: usize = 255;
/// Default maximum number of object fields captured
pub const DEFAULT_MAX_FIELDS: usize = 20;

/// Bounds applied during value inspection.
///
/// Immutable value object threaded through the inspector. The recursion
/// budget (`max_level`) is decremented at each level; inspection of
/// collections and objects stops once the budget is exhausted, so the work
/// per capture is bounded by depth x fan-out x field count regardless of the
/// shape of the inspected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureLimits {
    /// Maximum recursion depth
    pub max_level: usize,
    /// Maximum number of collection children
    pub max_size: usize,
    /// Maximum length of a primitive's textual form, in characters
    pub max_len: usize,
    /// Maximum number of object fields
    pub max_fields: usize,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            max_size: DEFAULT_MAX_SIZE,
            max_len: DEFAULT_MAX_LEN,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl CaptureLimits {
    /// Create limits with an explicit depth, keeping the other defaults
    pub fn with_max_level(max_level: usize) -> Self {
        Self {
            max_level,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = CaptureLimits::default();
        assert_eq!(limits.max_level, 2);
        assert_eq!(limits.max_size, 100);
        assert_eq!(limits.max_len, 255);
        assert_eq!(limits.max_fields, 20);
    }

    #[test]
    fn test_with_max_level() {
        let limits = CaptureLimits::with_max_level(5);
        assert_eq!(limits.max_level, 5);
        assert_eq!(limits.max_size, DEFAULT_MAX_SIZE);
    }
}
