//! Metric state manager — owns the six metrics and persists every value/max change.

use tracing::{debug, info, warn};

use super::preset::GoalPreset;
use super::snapshot::{self, Snapshot};
use super::{factory_defaults, Metric, MetricKind, METRIC_COUNT, STORAGE_KEY};
use crate::store::KeyValueStore;

/// Completion signal of a daily-total commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Amount added to each metric, canonical order.
    pub added: [u32; METRIC_COUNT],
    /// Running totals after the commit.
    pub totals: [u32; METRIC_COUNT],
}

impl CommitReceipt {
    /// Whether the commit changed any total.
    pub fn is_empty(&self) -> bool {
        self.added.iter().all(|&n| n == 0)
    }
}

/// The ordered metric list plus its persistence port.
pub struct MetricState {
    metrics: [Metric; METRIC_COUNT],
    store: Box<dyn KeyValueStore>,
}

impl MetricState {
    /// Start a session: factory defaults overlaid by the stored snapshot.
    ///
    /// A missing, unreadable or corrupt snapshot silently yields factory defaults.
    pub fn restore(store: Box<dyn KeyValueStore>) -> Self {
        let defaults = factory_defaults();
        let metrics = match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => match Snapshot::decode(&raw) {
                Ok(snapshot) => {
                    debug!(entries = snapshot.entries().len(), "restored metric snapshot");
                    snapshot.apply_to(&defaults)
                }
                Err(e) => {
                    warn!(error = %e, "stored metric snapshot is corrupt, using defaults");
                    defaults
                }
            },
            Ok(None) => defaults,
            Err(e) => {
                warn!(error = %e, "failed to read metric snapshot, using defaults");
                defaults
            }
        };
        Self { metrics, store }
    }

    /// Metrics in canonical order.
    pub fn metrics(&self) -> &[Metric; METRIC_COUNT] {
        &self.metrics
    }

    pub fn metric(&self, kind: MetricKind) -> &Metric {
        &self.metrics[kind.index()]
    }

    /// The persistence port.
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Whether any max differs from its factory default. Always derived, never cached.
    pub fn has_non_default_max(&self) -> bool {
        self.metrics.iter().any(Metric::is_max_customized)
    }

    /// Overlay a preset's ceilings. Values and current readings are untouched.
    pub fn apply_preset(&mut self, preset: GoalPreset) {
        for (metric, max) in self.metrics.iter_mut().zip(preset.maxes()) {
            metric.max = max.unwrap_or(metric.max);
        }
        info!(preset = preset.wire_name(), "applied goal preset");
        self.persist();
    }

    /// Edit one metric's max from free text. Returns whether the edit was applied.
    pub fn set_max(&mut self, index: usize, raw: &str) -> bool {
        let Some(max) = parse_max(raw) else {
            debug!(index, raw, "rejected non-numeric max");
            return false;
        };
        let Some(metric) = self.metrics.get_mut(index) else {
            debug!(index, "max edit index out of range");
            return false;
        };
        metric.max = max;
        self.persist();
        true
    }

    /// Add every current reading to its running total. Current readings stay visible.
    pub fn commit(&mut self) -> CommitReceipt {
        let mut added = [0; METRIC_COUNT];
        let mut totals = [0; METRIC_COUNT];
        for (i, metric) in self.metrics.iter_mut().enumerate() {
            metric.value = metric.value.saturating_add(metric.current);
            added[i] = metric.current;
            totals[i] = metric.value;
        }
        info!(calories = totals[0], "committed readings to daily total");
        self.persist();
        CommitReceipt { added, totals }
    }

    /// Zero every running total.
    pub fn reset_values(&mut self) {
        for metric in &mut self.metrics {
            metric.value = 0;
        }
        info!("reset daily progress");
        self.persist();
    }

    /// Restore every max to its factory default.
    pub fn reset_max(&mut self) {
        for metric in &mut self.metrics {
            metric.max = metric.kind.default_max();
        }
        info!("reset daily limits");
        self.persist();
    }

    /// Replace every current reading with a classification result.
    pub fn ingest(&mut self, readings: &[u32; METRIC_COUNT]) {
        for (metric, &reading) in self.metrics.iter_mut().zip(readings) {
            metric.current = reading;
        }
    }

    /// Zero every current reading.
    pub fn clear_current(&mut self) {
        for metric in &mut self.metrics {
            metric.current = 0;
        }
    }

    /// Rewrite the whole snapshot from the post-mutation state.
    fn persist(&mut self) {
        let encoded = match snapshot::encode(&self.metrics) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "failed to encode metric snapshot");
                return;
            }
        };
        if let Err(e) = self.store.set(STORAGE_KEY, &encoded) {
            warn!(error = %e, "failed to persist metric snapshot");
        }
    }
}

impl std::fmt::Debug for MetricState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricState")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// Parse a free-text max: `""` is 0, negatives clamp to 0, no leading digits is rejected.
pub fn parse_max(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    if negative {
        return Some(0);
    }
    let digits = &rest[..digits_len];
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}
