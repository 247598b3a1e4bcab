//! Configuration types for Spyglass
//!
//! Configuration is an infrastructure concern and lives outside the domain
//! layer; this crate depends on `spyglass-core` only for the domain types
//! the config converts into (`CaptureLimits`).

use crate::constants::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_FIELDS, DEFAULT_MAX_LEN, DEFAULT_MAX_LEVEL,
    DEFAULT_MAX_SIZE, DEFAULT_PROBE_RATE,
};
use serde::{Deserialize, Serialize};
use spyglass_core::CaptureLimits;

/// Main Spyglass configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub probes: ProbeDefaults,
}

/// Capture-limit defaults applied to probes that do not specify their own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_level")]
    pub max_level: usize,
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            max_size: DEFAULT_MAX_SIZE,
            max_len: DEFAULT_MAX_LEN,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl LimitsConfig {
    /// Convert into the domain value object
    pub fn to_capture_limits(&self) -> CaptureLimits {
        CaptureLimits {
            max_level: self.max_level,
            max_size: self.max_size,
            max_len: self.max_len,
            max_fields: self.max_fields,
        }
    }
}

/// Streaming encoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Fixed buffer capacity in bytes
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Defaults applied to newly created probes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeDefaults {
    /// Events-per-second budget
    #[serde(default = "default_probe_rate")]
    pub rate: f64,
}

impl Default for ProbeDefaults {
    fn default() -> Self {
        Self {
            rate: DEFAULT_PROBE_RATE,
        }
    }
}

fn default_max_level() -> usize {
    DEFAULT_MAX_LEVEL
}

fn default_max_size() -> usize {
    DEFAULT_MAX_SIZE
}

fn default_max_len() -> usize {
    DEFAULT_MAX_LEN
}

fn default_max_fields() -> usize {
    DEFAULT_MAX_FIELDS
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_probe_rate() -> f64 {
    DEFAULT_PROBE_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.max_level, 2);
        assert_eq!(config.limits.max_len, 255);
        assert_eq!(config.encoder.buffer_capacity, 4 * (1 << 20));
        assert_eq!(config.probes.rate, 1.0);
    }

    #[test]
    fn test_limits_convert_to_domain() {
        let limits = LimitsConfig {
            max_level: 3,
            max_size: 10,
            max_len: 64,
            max_fields: 5,
        }
        .to_capture_limits();
        assert_eq!(limits.max_level, 3);
        assert_eq!(limits.max_fields, 5);
    }
}
