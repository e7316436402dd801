//! Domain models for CrisisWatch.
//!
//! Canonical definitions for the pipeline's data contract:
//! - `CanonicalSourceRecord`: one normalized source
//! - `CrisisAssessment`: the fused per-region judgment
//! - `AiAnalysis`: the AI-augmented reading of an assessment
//! - `ResponsePlan`: the costed response

pub mod analysis;
pub mod assessment;
pub mod error;
pub mod plan;
pub mod record;
pub mod risk;

// Re-export main types and errors
pub use analysis::{
    Agreement, AiAnalysis, AnalysisMetadata, AttemptOutcome, Comparison, DisplacementPrediction,
    DisplacementType, EarlyWarning, Likelihood, ModelAttempt, ParseStatus, Recommendations,
    Urgency, FALLBACK_MODEL,
};
pub use assessment::{
    CrisisAssessment, DisplacementRisk, DisplacementTimeline, Region, TaggedFactor, TrendLabel,
    TrendMap,
};
pub use error::{CrisisError, Result};
pub use plan::{
    CostAnalysis, CostBreakdown, CostComparison, DurationUnit, FundingStrategy, PhaseDuration,
    PhaseKind, PhaseStaffing, PlanPhase, PlanType, ResponsePlan, RoleHeadcount, StaffingPlan,
};
pub use record::{
    CanonicalSourceRecord, ClimateDetail, ConflictDetail, Direction, EconomicDetail,
    EconomicIndicator, Hazard, NewsDetail, SourceDetail, SourceSet, MAX_UNAVAILABLE_CONFIDENCE,
    UNAVAILABLE_CONFIDENCE,
};
pub use risk::{AiRisk, DataQuality, Domain, OverallRisk, RiskLevel};
