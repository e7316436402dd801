//! The fused per-region assessment and its sub-structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{CrisisError, Result};
use super::record::SourceSet;
use super::risk::{DataQuality, Domain, OverallRisk, RiskLevel};

/// Monitored region, identified by its ISO 3166-1 alpha-3 code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    /// Validate and upper-case a region code.
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CrisisError::InvalidRegion(raw.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Region {
    type Error = CrisisError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A piece of text tagged with where it came from and how severe it is.
///
/// `source` is `None` for notes that summarize several sources at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedFactor {
    pub source: Option<Domain>,
    pub severity: RiskLevel,
    pub description: String,
}

impl TaggedFactor {
    pub fn new(source: Domain, severity: RiskLevel, description: impl Into<String>) -> Self {
        Self {
            source: Some(source),
            severity,
            description: description.into(),
        }
    }

    pub fn cross_source(severity: RiskLevel, description: impl Into<String>) -> Self {
        Self {
            source: None,
            severity,
            description: description.into(),
        }
    }
}

/// Expected onset window for displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplacementTimeline {
    Immediate,
    OneToFourWeeks,
    OneToThreeMonths,
    ThreeToSixMonths,
    SixMonthsPlus,
}

impl DisplacementTimeline {
    pub fn label(self) -> &'static str {
        match self {
            Self::Immediate => "Immediate (0-2 weeks)",
            Self::OneToFourWeeks => "1-4 weeks",
            Self::OneToThreeMonths => "1-3 months",
            Self::ThreeToSixMonths => "3-6 months",
            Self::SixMonthsPlus => "6+ months",
        }
    }
}

/// Displacement outlook derived from the same four records as the risk.
///
/// `estimated_numbers` is a heuristic built from fixed multipliers. It is
/// not a calibrated forecast and should be read as an order of magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplacementRisk {
    pub level: RiskLevel,
    pub confidence: f64,
    pub timeline: DisplacementTimeline,
    pub timeline_label: String,
    pub estimated_numbers: u64,
    pub primary_causes: Vec<String>,
    pub likely_destinations: Vec<String>,
    pub trigger_events: Vec<String>,
}

/// Trajectory label for one domain or for the region as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendLabel {
    Stable,
    Increasing,
    Decreasing,
    Worsening,
    Improving,
    Deteriorating,
    Unknown,
}

impl TrendLabel {
    /// Whether this label counts towards an overall deterioration.
    pub fn is_worsening(self) -> bool {
        matches!(self, Self::Worsening | Self::Increasing | Self::Deteriorating)
    }

    pub fn is_improving(self) -> bool {
        matches!(self, Self::Improving | Self::Decreasing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendMap {
    pub conflict: TrendLabel,
    pub economic: TrendLabel,
    pub climate: TrendLabel,
    pub news: TrendLabel,
    pub overall: TrendLabel,
}

impl TrendMap {
    pub fn get(&self, domain: Domain) -> TrendLabel {
        match domain {
            Domain::Conflict => self.conflict,
            Domain::Economic => self.economic,
            Domain::Climate => self.climate,
            Domain::News => self.news,
        }
    }
}

/// The fused output of one monitoring cycle for one region.
///
/// Built once by [`crate::aggregator::build_assessment`] and never patched;
/// the next cycle produces a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisAssessment {
    pub id: Uuid,
    pub region: Region,
    pub assessed_at: DateTime<Utc>,
    pub overall_risk: OverallRisk,
    pub risk_score: f64,
    pub confidence: f64,
    pub data_quality: DataQuality,
    pub sources: SourceSet,
    pub risk_factors: Vec<TaggedFactor>,
    pub protective_factors: Vec<TaggedFactor>,
    pub immediate_threats: Vec<TaggedFactor>,
    pub emerging_concerns: Vec<TaggedFactor>,
    pub displacement_risk: DisplacementRisk,
    pub trends: TrendMap,
}

impl CrisisAssessment {
    pub fn available_sources(&self) -> usize {
        self.sources.available_count()
    }
}
