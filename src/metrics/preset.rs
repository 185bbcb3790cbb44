//! Goal presets — named bundles of daily ceilings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::METRIC_COUNT;

/// A dietary goal whose ceilings overlay the current maxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalPreset {
    Fit,
    BodyBuilder,
    GainWeight,
    LoseWeight,
}

impl GoalPreset {
    pub const ALL: [GoalPreset; 4] = [
        Self::Fit,
        Self::BodyBuilder,
        Self::GainWeight,
        Self::LoseWeight,
    ];

    /// Identifier used by the original goal selector.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::BodyBuilder => "bodyBuilder",
            Self::GainWeight => "gainWeight",
            Self::LoseWeight => "loseWeight",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fit => "Fit",
            Self::BodyBuilder => "Body-Builder",
            Self::GainWeight => "Gain Weight",
            Self::LoseWeight => "Lose Weight",
        }
    }

    /// Ceilings in canonical metric order. `None` leaves that metric's max alone.
    pub fn maxes(self) -> [Option<u32>; METRIC_COUNT] {
        match self {
            Self::Fit => [
                Some(1800),
                Some(60),
                Some(200),
                Some(2000),
                Some(250),
                Some(60),
            ],
            Self::BodyBuilder => [
                Some(2500),
                Some(80),
                Some(300),
                Some(2400),
                Some(300),
                Some(120),
            ],
            Self::GainWeight => [
                Some(3000),
                Some(100),
                Some(350),
                Some(2500),
                Some(350),
                Some(100),
            ],
            Self::LoseWeight => [
                Some(1500),
                Some(50),
                Some(200),
                Some(1800),
                Some(200),
                Some(70),
            ],
        }
    }
}

impl fmt::Display for GoalPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognized preset name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown preset '{0}' (expected one of: {valid})", valid = wire_names())]
pub struct UnknownPreset(pub String);

fn wire_names() -> String {
    GoalPreset::ALL.map(GoalPreset::wire_name).join(", ")
}

impl FromStr for GoalPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        GoalPreset::ALL
            .into_iter()
            .find(|p| p.wire_name() == trimmed || p.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownPreset(trimmed.to_string()))
    }
}
