//! CrisisWatch Core Library
//!
//! Crisis risk aggregation for a region: normalizes four source feeds,
//! fuses them into a [`CrisisAssessment`], augments it with an AI analysis
//! (with a heuristic safe default) and costs a phased [`ResponsePlan`].

pub mod aggregator;
pub mod ai;
pub mod artifact;
pub mod cache;
pub mod config;
pub mod displacement;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod monitor;
pub mod normalize;
pub mod obs;
pub mod plan;
pub mod sources;
pub mod telemetry;
pub mod trends;

pub use domain::{
    AiAnalysis, AiRisk, CanonicalSourceRecord, CrisisAssessment, CrisisError, DataQuality, Domain,
    OverallRisk, PlanType, Region, ResponsePlan, Result, RiskLevel, SourceSet, TrendLabel,
};

pub use aggregator::{aggregate_risk, build_assessment, weighted_score, RiskSummary};
pub use ai::{AiConfig, AiOrchestrator, HttpTransport, ModelSpec, ModelTransport};
pub use artifact::{read_run_artifact, write_run_artifact, RunReport};
pub use cache::{CacheStats, TtlCache};
pub use config::{CacheConfig, PipelineConfig};
pub use displacement::{predict_displacement, DisplacementConstants};
pub use monitor::CrisisMonitor;
pub use normalize::normalize;
pub use plan::{generate_plan, FundingSplit, PhaseDurations, PlanEngine, PlanRequest};
pub use sources::{FetchError, SourceFetcher, SourcePayloads, StaticSourceFetcher};
pub use trends::analyze_trends;

pub use metrics::METRICS;
pub use obs::AssessmentSpan;
pub use telemetry::init_tracing;

/// CrisisWatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
