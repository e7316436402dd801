//! Structured observability hooks for pipeline lifecycle events.
//!
//! This module provides:
//! - Region-scoped tracing spans via the `AssessmentSpan` RAII guard
//! - Emission functions for source, model, analysis and plan events
//!
//! Events are emitted at `info!` (failures at `warn!`). Verbosity follows
//! `RUST_LOG`; pass `--json` to the CLI for JSON lines.

use tracing::{info, warn};

use crate::domain::{AttemptOutcome, Domain, ParseStatus, PlanType};

/// RAII guard that enters a region-scoped span for one pipeline run.
///
/// # Example
///
/// ```ignore
/// let _span = AssessmentSpan::enter("SYR");
/// // tracing calls below carry region = "SYR"
/// ```
pub struct AssessmentSpan {
    _span: tracing::span::EnteredSpan,
}

impl AssessmentSpan {
    pub fn enter(region: &str) -> Self {
        Self {
            _span: assessment_span(region).entered(),
        }
    }
}

/// The region span itself, for `.instrument()` on futures that hold it
/// across awaits.
pub fn assessment_span(region: &str) -> tracing::Span {
    tracing::info_span!("crisiswatch.assessment", region = %region)
}

/// Emit event: a source could not be used and was marked unavailable.
pub fn emit_source_unavailable(region: &str, domain: Domain, reason: &str) {
    warn!(event = "source.unavailable", region = %region, domain = %domain, reason = %reason);
}

/// Emit event: an assessment was built.
///
/// ```ignore
/// emit_assessment_completed("SYR", "HIGH", 67.5, 4);
/// // logs: event=assessment.completed region=SYR overall_risk=HIGH ...
/// ```
pub fn emit_assessment_completed(region: &str, overall_risk: &str, risk_score: f64, available: usize) {
    info!(
        event = "assessment.completed",
        region = %region,
        overall_risk = %overall_risk,
        risk_score = risk_score,
        available_sources = available,
    );
}

/// Emit event: one model call finished, whatever its outcome.
pub fn emit_model_attempt(region: &str, model: &str, attempt: u32, outcome: AttemptOutcome) {
    info!(
        event = "model.attempt",
        region = %region,
        model = %model,
        attempt = attempt,
        outcome = ?outcome,
    );
}

/// Emit event: a model call failed or timed out (warning level).
pub fn emit_model_failure(region: &str, model: &str, attempt: u32, error: &dyn std::fmt::Display) {
    warn!(
        event = "model.failure",
        region = %region,
        model = %model,
        attempt = attempt,
        error = %error,
    );
}

/// Emit event: AI analysis finished, degraded or not.
pub fn emit_analysis_completed(
    region: &str,
    model_used: &str,
    parse_status: ParseStatus,
    attempts: usize,
    elapsed_ms: u64,
) {
    info!(
        event = "analysis.completed",
        region = %region,
        model_used = %model_used,
        parse_status = ?parse_status,
        attempts = attempts,
        elapsed_ms = elapsed_ms,
    );
}

/// Emit event: response plan generated.
pub fn emit_plan_generated(region: &str, plan_type: PlanType, population: u64, total_cost: f64) {
    info!(
        event = "plan.generated",
        region = %region,
        plan_type = ?plan_type,
        target_population = population,
        total_cost = total_cost,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_span_create() {
        // Just ensure AssessmentSpan::enter doesn't panic
        let _span = AssessmentSpan::enter("SYR");
        emit_source_unavailable("SYR", Domain::News, "timeout");
        emit_analysis_completed("SYR", "fallback", ParseStatus::Fallback, 0, 0);
    }
}
