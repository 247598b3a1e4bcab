//! Configuration types and loading for Spyglass
//!
//! This crate provides:
//! - Configuration structures for the capture core
//! - Config file loading (TOML format)
//!
//! Probe installation itself is configured elsewhere; this covers the
//! ambient knobs of the capture core: default capture limits, the encoder
//! buffer capacity, and probe rate defaults.

pub mod constants;
mod loader;
mod types;

pub use constants::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_FIELDS, DEFAULT_MAX_LEN, DEFAULT_MAX_LEVEL,
    DEFAULT_MAX_SIZE, DEFAULT_PROBE_RATE,
};
pub use loader::{load_config, load_config_from_str, ConfigError};
pub use types::{Config, EncoderConfig, LimitsConfig, ProbeDefaults};
