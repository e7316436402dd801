//! Canonical per-source record produced by the normalizers.

use serde::{Deserialize, Serialize};

use super::risk::{Domain, RiskLevel};

/// Confidence assigned to a source that produced no usable data.
pub const UNAVAILABLE_CONFIDENCE: f64 = 0.1;

/// Upper bound on the confidence of an unavailable record.
pub const MAX_UNAVAILABLE_CONFIDENCE: f64 = 0.3;

/// Direction of a tracked value over the reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increasing,
    Decreasing,
    Stable,
}

impl Direction {
    /// Parse a trend word where "worsening" means the tracked quantity
    /// (violence, hazards, coverage) goes up.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "increasing" | "rising" | "up" | "worsening" | "escalating" => Some(Self::Increasing),
            "decreasing" | "falling" | "down" | "improving" | "declining" => Some(Self::Decreasing),
            "stable" | "flat" | "steady" | "unchanged" => Some(Self::Stable),
            _ => None,
        }
    }

    /// Parse a trend word for an outcome measure (GDP growth, currency
    /// strength) where "improving" means the value goes up.
    pub fn parse_outcome(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "improving" | "recovering" => Some(Self::Increasing),
            "worsening" | "deteriorating" => Some(Self::Decreasing),
            other => Self::parse(other),
        }
    }
}

/// Conflict-specific signals kept for displacement and trend analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDetail {
    pub total_events: u64,
    pub fatalities: u64,
    pub increasing: bool,
    pub decreasing: bool,
    pub hotspots: Vec<String>,
}

/// One tracked macroeconomic indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicIndicator {
    pub name: String,
    pub value: Option<f64>,
    pub trend: Option<Direction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicDetail {
    pub indicators: Vec<EconomicIndicator>,
    pub stability: Option<String>,
}

/// A natural hazard or climate alert affecting the region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hazard {
    pub kind: String,
    pub severity: RiskLevel,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateDetail {
    pub hazards: Vec<Hazard>,
    pub trend: Option<Direction>,
}

impl ClimateDetail {
    pub fn has_hazard_at(&self, severity: RiskLevel) -> bool {
        self.hazards.iter().any(|h| h.severity == severity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDetail {
    pub article_count: u32,
    pub breaking_count: u32,
    pub average_sentiment: Option<f64>,
    pub coverage: Option<Direction>,
}

/// Typed per-domain detail attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDetail {
    Conflict(ConflictDetail),
    Economic(EconomicDetail),
    Climate(ClimateDetail),
    News(NewsDetail),
    None,
}

/// Domain-agnostic view of one source's assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalSourceRecord {
    pub domain: Domain,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub score: f64,
    pub indicators: Vec<String>,
    pub available: bool,
    pub detail: SourceDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CanonicalSourceRecord {
    /// Record for a source that failed or returned nothing usable.
    ///
    /// This is the only way to build an unavailable record, which keeps
    /// `risk_level == Unknown` and `confidence <= 0.3` true by construction.
    pub fn unavailable(domain: Domain, reason: impl Into<String>) -> Self {
        Self {
            domain,
            risk_level: RiskLevel::Unknown,
            confidence: UNAVAILABLE_CONFIDENCE,
            score: 0.0,
            indicators: Vec::new(),
            available: false,
            detail: SourceDetail::None,
            error: Some(reason.into()),
        }
    }

    /// Record for a source with usable data. Confidence is clamped into
    /// `[0, 1]` and the score to a finite non-negative value.
    pub fn available(
        domain: Domain,
        risk_level: RiskLevel,
        confidence: f64,
        score: f64,
        indicators: Vec<String>,
        detail: SourceDetail,
    ) -> Self {
        Self {
            domain,
            risk_level,
            confidence: clamp_unit(confidence),
            score: if score.is_finite() { score.max(0.0) } else { 0.0 },
            indicators,
            available: true,
            detail,
            error: None,
        }
    }

    /// `true` when the record respects the unavailable-record invariant.
    pub fn is_consistent(&self) -> bool {
        self.available
            || (self.risk_level == RiskLevel::Unknown
                && self.confidence <= MAX_UNAVAILABLE_CONFIDENCE)
    }

    pub fn conflict_detail(&self) -> Option<&ConflictDetail> {
        match &self.detail {
            SourceDetail::Conflict(d) if self.available => Some(d),
            _ => None,
        }
    }

    pub fn economic_detail(&self) -> Option<&EconomicDetail> {
        match &self.detail {
            SourceDetail::Economic(d) if self.available => Some(d),
            _ => None,
        }
    }

    pub fn climate_detail(&self) -> Option<&ClimateDetail> {
        match &self.detail {
            SourceDetail::Climate(d) if self.available => Some(d),
            _ => None,
        }
    }

    pub fn news_detail(&self) -> Option<&NewsDetail> {
        match &self.detail {
            SourceDetail::News(d) if self.available => Some(d),
            _ => None,
        }
    }
}

/// The fixed set of four records consumed by one assessment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSet {
    pub conflict: CanonicalSourceRecord,
    pub economic: CanonicalSourceRecord,
    pub climate: CanonicalSourceRecord,
    pub news: CanonicalSourceRecord,
}

impl SourceSet {
    /// A set in which every source is unavailable.
    pub fn empty() -> Self {
        Self {
            conflict: CanonicalSourceRecord::unavailable(Domain::Conflict, "not fetched"),
            economic: CanonicalSourceRecord::unavailable(Domain::Economic, "not fetched"),
            climate: CanonicalSourceRecord::unavailable(Domain::Climate, "not fetched"),
            news: CanonicalSourceRecord::unavailable(Domain::News, "not fetched"),
        }
    }

    pub fn get(&self, domain: Domain) -> &CanonicalSourceRecord {
        match domain {
            Domain::Conflict => &self.conflict,
            Domain::Economic => &self.economic,
            Domain::Climate => &self.climate,
            Domain::News => &self.news,
        }
    }

    /// Replace the record for its own domain.
    pub fn set(&mut self, record: CanonicalSourceRecord) {
        match record.domain {
            Domain::Conflict => self.conflict = record,
            Domain::Economic => self.economic = record,
            Domain::Climate => self.climate = record,
            Domain::News => self.news = record,
        }
    }

    /// Records in fixed domain order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalSourceRecord> {
        Domain::ALL.into_iter().map(move |d| self.get(d))
    }

    pub fn available_count(&self) -> usize {
        self.iter().filter(|r| r.available).count()
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
