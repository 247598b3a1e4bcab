//! Mock collaborators

use spyglass_capture::ports::MetricsSink;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
struct Recorded {
    op: &'static str,
    name: String,
    value: Option<f64>,
    tags: Vec<(String, String)>,
}

/// Metrics sink that records every emission for assertions
#[derive(Debug, Default)]
pub struct RecordingSink {
    recorded: Mutex<Vec<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, op: &'static str, name: &str, value: Option<f64>, tags: &[(&str, &str)]) {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Recorded {
                op,
                name: name.to_string(),
                value,
                tags: tags
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
    }

    fn snapshot(&self) -> Vec<Recorded> {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of `increment` calls for the named counter
    pub fn increments(&self, name: &str) -> usize {
        self.snapshot()
            .iter()
            .filter(|r| r.op == "increment" && r.name == name)
            .count()
    }

    /// Whether any emission for `name` carried the given tag
    pub fn has_tag(&self, name: &str, key: &str, value: &str) -> bool {
        self.snapshot().iter().any(|r| {
            r.name == name
                && r.tags
                    .iter()
                    .any(|(k, v)| k == key && v == value)
        })
    }

    /// All distribution samples recorded for `name`
    pub fn distributions(&self, name: &str) -> Vec<f64> {
        self.snapshot()
            .iter()
            .filter(|r| r.op == "distribution" && r.name == name)
            .filter_map(|r| r.value)
            .collect()
    }

    /// All count values recorded for `name`
    pub fn counts(&self, name: &str) -> Vec<f64> {
        self.snapshot()
            .iter()
            .filter(|r| r.op == "count" && r.name == name)
            .filter_map(|r| r.value)
            .collect()
    }

    /// All gauge values recorded for `name`
    pub fn gauges(&self, name: &str) -> Vec<f64> {
        self.snapshot()
            .iter()
            .filter(|r| r.op == "gauge" && r.name == name)
            .filter_map(|r| r.value)
            .collect()
    }

    /// Total number of recorded emissions
    pub fn total(&self) -> usize {
        self.snapshot().len()
    }
}

impl MetricsSink for RecordingSink {
    fn increment(&self, name: &str, tags: &[(&str, &str)]) {
        self.record("increment", name, None, tags);
    }

    fn count(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        self.record("count", name, Some(value), tags);
    }

    fn gauge(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        self.record("gauge", name, Some(value), tags);
    }

    fn histogram(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        self.record("histogram", name, Some(value), tags);
    }

    fn distribution(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        self.record("distribution", name, Some(value), tags);
    }
}
