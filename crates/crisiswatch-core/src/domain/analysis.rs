//! AI-augmented analysis of a [`CrisisAssessment`](super::CrisisAssessment).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::Region;
use super::risk::{AiRisk, OverallRisk};

/// `model_used` value of an analysis built without any model response.
pub const FALLBACK_MODEL: &str = "fallback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl Likelihood {
    pub fn parse(raw: &str) -> Option<Self> {
        let norm = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match norm.as_str() {
            "VERY_HIGH" => Some(Self::VeryHigh),
            "HIGH" => Some(Self::High),
            "MEDIUM" | "MODERATE" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            "VERY_LOW" => Some(Self::VeryLow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplacementType {
    Internal,
    CrossBorder,
    Mixed,
}

impl DisplacementType {
    pub fn parse(raw: &str) -> Option<Self> {
        let norm = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match norm.as_str() {
            "INTERNAL" | "IDP" => Some(Self::Internal),
            "CROSS_BORDER" | "EXTERNAL" | "REFUGEE" => Some(Self::CrossBorder),
            "MIXED" | "BOTH" => Some(Self::Mixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Immediate,
    High,
    Moderate,
    Low,
}

impl Urgency {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "IMMEDIATE" | "CRITICAL" => Some(Self::Immediate),
            "HIGH" => Some(Self::High),
            "MODERATE" | "MEDIUM" => Some(Self::Moderate),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplacementPrediction {
    pub likelihood: Likelihood,
    pub timeframe: String,
    pub estimated_population: u64,
    pub primary_triggers: Vec<String>,
    pub likely_destinations: Vec<String>,
    pub displacement_type: DisplacementType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyWarning {
    pub triggered: bool,
    pub urgency: Urgency,
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}

/// Ordinal closeness of the heuristic and AI tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Agreement {
    Perfect,
    High,
    Moderate,
    Low,
}

impl Agreement {
    pub fn from_distance(distance: Option<u8>) -> Self {
        match distance {
            Some(0) => Self::Perfect,
            Some(1) => Self::High,
            Some(2) => Self::Moderate,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub heuristic_risk: OverallRisk,
    pub ai_risk: AiRisk,
    /// `None` when the heuristic tier is `UNKNOWN`.
    pub ordinal_distance: Option<u8>,
    pub agreement: Agreement,
}

/// How the model output turned into this analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseStatus {
    Valid,
    Repaired,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Timeout,
    Failed,
}

/// One call made to one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAttempt {
    pub model: String,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub model_used: String,
    pub parse_status: ParseStatus,
    pub attempts: Vec<ModelAttempt>,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl AnalysisMetadata {
    pub fn is_degraded(&self) -> bool {
        self.model_used == FALLBACK_MODEL
    }
}

/// Output of the AI orchestrator. Always structurally complete, even when
/// every model failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub region: Region,
    pub assessment_id: Uuid,
    pub ai_risk_assessment: AiRisk,
    pub confidence: f64,
    pub reasoning: String,
    pub displacement_prediction: DisplacementPrediction,
    pub critical_factors: Vec<String>,
    pub early_warning: EarlyWarning,
    pub recommendations: Recommendations,
    pub comparison: Comparison,
    pub priority_score: f64,
    pub requires_escalation: bool,
    pub metadata: AnalysisMetadata,
}
