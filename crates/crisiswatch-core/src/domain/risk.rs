//! Risk vocabularies shared by every pipeline stage.
//!
//! All lookup tables (level scores, domain weights, tier thresholds) are
//! exhaustive `match`es so a new variant cannot silently fall through to a
//! default.

use serde::{Deserialize, Serialize};

/// Risk level reported by a single normalized source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl RiskLevel {
    /// Numeric weight used by the aggregator.
    pub fn score(self) -> f64 {
        match self {
            Self::Critical => 100.0,
            Self::High => 75.0,
            Self::Medium => 50.0,
            Self::Low => 25.0,
            Self::Unknown => 0.0,
        }
    }

    /// Parse an upstream level word. Accepts any casing and the common
    /// synonyms used by source feeds ("severe", "moderate", "minimal").
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" | "extreme" | "severe" => Some(Self::Critical),
            "high" | "elevated" => Some(Self::High),
            "medium" | "moderate" => Some(Self::Medium),
            "low" | "minimal" | "none" => Some(Self::Low),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn is_elevated(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Fused risk tier of a whole assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallRisk {
    Critical,
    High,
    Medium,
    Low,
    Minimal,
    Unknown,
}

impl OverallRisk {
    /// Threshold a completeness-adjusted score into a tier.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Critical
        } else if score >= 60.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else if score >= 20.0 {
            Self::Low
        } else {
            Self::Minimal
        }
    }

    /// Position on the ordinal scale `MINIMAL < LOW < MEDIUM < HIGH < CRITICAL`.
    /// `UNKNOWN` has no position.
    pub fn ordinal(self) -> Option<u8> {
        match self {
            Self::Minimal => Some(0),
            Self::Low => Some(1),
            Self::Medium => Some(2),
            Self::High => Some(3),
            Self::Critical => Some(4),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for OverallRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
            Self::Minimal => write!(f, "MINIMAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Risk tier produced by the AI pass. Deliberately has no `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AiRisk {
    Low,
    Medium,
    High,
    Critical,
}

impl AiRisk {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Some(Self::Critical),
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }

    /// Same scale as [`OverallRisk::ordinal`].
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Project a heuristic tier onto the AI vocabulary.
    ///
    /// `MINIMAL` collapses to `LOW`; `UNKNOWN` becomes `MEDIUM` so a region
    /// with no data is never reported as safe.
    pub fn from_heuristic(risk: OverallRisk) -> Self {
        match risk {
            OverallRisk::Critical => Self::Critical,
            OverallRisk::High => Self::High,
            OverallRisk::Medium | OverallRisk::Unknown => Self::Medium,
            OverallRisk::Low | OverallRisk::Minimal => Self::Low,
        }
    }
}

impl std::fmt::Display for AiRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// Overall data quality, derived from how many sources were usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl DataQuality {
    pub fn from_availability(available: usize, total: usize) -> Self {
        if total == 0 {
            return Self::Poor;
        }
        let ratio = available as f64 / total as f64;
        if ratio >= 1.0 {
            Self::Excellent
        } else if ratio >= 0.75 {
            Self::Good
        } else if ratio >= 0.5 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// The four monitored signal domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Conflict,
    Economic,
    Climate,
    News,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Conflict,
        Domain::Economic,
        Domain::Climate,
        Domain::News,
    ];

    /// Fixed aggregation weight. The four weights sum to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Self::Conflict => 0.35,
            Self::Economic => 0.25,
            Self::Climate => 0.15,
            Self::News => 0.25,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::Economic => "economic",
            Self::Climate => "climate",
            Self::News => "news",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
