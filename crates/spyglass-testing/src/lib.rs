//! Spyglass Testing - fixtures and mocks
//!
//! Shared test tooling for the workspace: sample probes, frames and object
//! graphs (`fixtures`), and recording mock collaborators (`mocks`).

pub mod fixtures;
pub mod mocks;

pub use fixtures::{
    deep_value, false_condition, log_line_probe, metric_line_probe, raising_condition,
    sample_frame, sample_thread, side_effects_object, snapshot_function_probe,
    snapshot_line_probe, snapshot_probe_with_limits, tree, wide_seq, UNLIMITED_RATE,
};
pub use mocks::RecordingSink;
