//! Nutrition metrics — the six tracked facts, their fixed order, and defaults.
//!
//! `MetricKind::ALL` is the canonical ordered key list. Metrics, presets,
//! snapshots and classification vectors are all index-aligned to it.

pub mod preset;
pub mod snapshot;
pub mod state;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use preset::GoalPreset;
pub use snapshot::{Snapshot, SnapshotEntry};
pub use state::{CommitReceipt, MetricState};

/// Number of tracked metrics.
pub const METRIC_COUNT: usize = 6;

/// Key under which the snapshot lives in the persistence medium.
pub const STORAGE_KEY: &str = "nutriLensMetrics";

/// One of the six tracked nutrition facts, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Calories,
    TotalFat,
    Cholesterol,
    Sodium,
    TotalCarbohydrates,
    Protein,
}

impl MetricKind {
    /// Canonical order. Never reorder.
    pub const ALL: [MetricKind; METRIC_COUNT] = [
        Self::Calories,
        Self::TotalFat,
        Self::Cholesterol,
        Self::Sodium,
        Self::TotalCarbohydrates,
        Self::Protein,
    ];

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        match self {
            Self::Calories => 0,
            Self::TotalFat => 1,
            Self::Cholesterol => 2,
            Self::Sodium => 3,
            Self::TotalCarbohydrates => 4,
            Self::Protein => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Calories => "Calories",
            Self::TotalFat => "Total Fat",
            Self::Cholesterol => "Cholesterol",
            Self::Sodium => "Sodium",
            Self::TotalCarbohydrates => "Total Carbohydrates",
            Self::Protein => "Protein",
        }
    }

    /// Display unit.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Calories => "kcal",
            Self::TotalFat | Self::TotalCarbohydrates | Self::Protein => "g",
            Self::Cholesterol | Self::Sodium => "mg",
        }
    }

    /// Factory daily ceiling.
    pub fn default_max(self) -> u32 {
        match self {
            Self::Calories => 2000,
            Self::TotalFat => 78,
            Self::Cholesterol => 300,
            Self::Sodium => 2300,
            Self::TotalCarbohydrates => 275,
            Self::Protein => 50,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single tracked metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub kind: MetricKind,
    /// Committed running total for the day.
    pub value: u32,
    /// Latest single-upload reading, not yet committed.
    pub current: u32,
    /// Daily ceiling.
    pub max: u32,
}

impl Metric {
    /// Factory state for a metric.
    pub fn factory(kind: MetricKind) -> Self {
        Self {
            kind,
            value: 0,
            current: 0,
            max: kind.default_max(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn unit(&self) -> &'static str {
        self.kind.unit()
    }

    /// Fraction of the ring to fill, clamped to `[0, 1]`.
    ///
    /// A zero ceiling reads as full once anything has been committed.
    pub fn progress(&self) -> f64 {
        if self.max == 0 {
            return if self.value > 0 { 1.0 } else { 0.0 };
        }
        (f64::from(self.value) / f64::from(self.max)).clamp(0.0, 1.0)
    }

    /// Whether the ceiling differs from the factory default.
    pub fn is_max_customized(&self) -> bool {
        self.max != self.kind.default_max()
    }
}

/// The factory-default metric list in canonical order.
pub fn factory_defaults() -> [Metric; METRIC_COUNT] {
    MetricKind::ALL.map(Metric::factory)
}
