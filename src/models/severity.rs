//! AQI severity bands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six ordered severity bands partitioning the non-negative AQI range.
///
/// The derived `Ord` follows declaration order, so `Good < Moderate < ... <
/// Hazardous` and bands can be compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityBand {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl SeverityBand {
    /// All bands, from least to most severe.
    pub const ALL: [SeverityBand; 6] = [
        SeverityBand::Good,
        SeverityBand::Moderate,
        SeverityBand::UnhealthySensitive,
        SeverityBand::Unhealthy,
        SeverityBand::VeryUnhealthy,
        SeverityBand::Hazardous,
    ];

    /// Inclusive AQI range covered by this band. The top band has no upper
    /// bound.
    pub fn range(&self) -> (i64, Option<i64>) {
        match self {
            SeverityBand::Good => (0, Some(50)),
            SeverityBand::Moderate => (51, Some(100)),
            SeverityBand::UnhealthySensitive => (101, Some(150)),
            SeverityBand::Unhealthy => (151, Some(200)),
            SeverityBand::VeryUnhealthy => (201, Some(300)),
            SeverityBand::Hazardous => (301, None),
        }
    }

    /// Human-readable category name.
    pub fn label(&self) -> &'static str {
        match self {
            SeverityBand::Good => "Good",
            SeverityBand::Moderate => "Moderate",
            SeverityBand::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            SeverityBand::Unhealthy => "Unhealthy",
            SeverityBand::VeryUnhealthy => "Very Unhealthy",
            SeverityBand::Hazardous => "Hazardous",
        }
    }

    /// Hex color associated with the band in dashboards.
    pub fn color(&self) -> &'static str {
        match self {
            SeverityBand::Good => "#4CAF50",
            SeverityBand::Moderate => "#FFEB3B",
            SeverityBand::UnhealthySensitive => "#FF9800",
            SeverityBand::Unhealthy => "#F44336",
            SeverityBand::VeryUnhealthy => "#9C27B0",
            SeverityBand::Hazardous => "#800000",
        }
    }

    /// True for bands at or above Unhealthy for Sensitive Groups.
    pub fn is_elevated(&self) -> bool {
        *self >= SeverityBand::UnhealthySensitive
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
