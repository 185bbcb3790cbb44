//! Persisted snapshot — the `{value, max}` sequence written to storage.
//!
//! Decoding is tolerant: anything it cannot read at an index falls back to
//! the factory default for that index.

use serde::Serialize;
use serde_json::Value;

use super::{Metric, METRIC_COUNT};

/// One decoded snapshot slot. `None` means "use the factory default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub value: Option<u32>,
    pub max: Option<u32>,
}

/// A decoded snapshot, possibly shorter than `METRIC_COUNT`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

#[derive(Serialize)]
struct StoredEntry {
    value: u32,
    max: u32,
}

impl Snapshot {
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> SnapshotEntry {
        self.entries.get(index).copied().unwrap_or_default()
    }

    /// Parse stored JSON. Only a syntactically invalid document is an error;
    /// a well-formed document of the wrong shape decodes to an empty snapshot.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let document: Value = serde_json::from_str(raw)?;
        let entries = match document {
            Value::Array(items) => items
                .iter()
                .take(METRIC_COUNT)
                .map(|item| SnapshotEntry {
                    value: item.get("value").and_then(as_count),
                    max: item.get("max").and_then(as_count),
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self { entries })
    }

    /// Overlay this snapshot onto `base`. `current` is never restored.
    pub fn apply_to(&self, base: &[Metric; METRIC_COUNT]) -> [Metric; METRIC_COUNT] {
        let mut restored = *base;
        for (i, metric) in restored.iter_mut().enumerate() {
            let entry = self.get(i);
            metric.value = entry.value.unwrap_or(metric.value);
            metric.max = entry.max.unwrap_or(metric.max);
            metric.current = 0;
        }
        restored
    }
}

/// Serialize the full six-entry snapshot for storage.
pub fn encode(metrics: &[Metric; METRIC_COUNT]) -> Result<String, serde_json::Error> {
    let stored: Vec<StoredEntry> = metrics
        .iter()
        .map(|m| StoredEntry {
            value: m.value,
            max: m.max,
        })
        .collect();
    serde_json::to_string(&stored)
}

/// A non-negative whole number that fits `u32`.
fn as_count(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}
