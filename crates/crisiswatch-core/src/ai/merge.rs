//! Merging a model response with the heuristic assessment.

use crate::domain::{
    Agreement, AiAnalysis, AiRisk, AnalysisMetadata, Comparison, CrisisAssessment,
    DisplacementPrediction, DisplacementType, EarlyWarning, Likelihood, OverallRisk,
    Recommendations, RiskLevel, Urgency,
};

use super::parse::{urgency_for, ModelResponse};

/// Confidence removed from the heuristic when no model answered.
pub const FALLBACK_CONFIDENCE_PENALTY: f64 = 0.2;

const MAX_CRITICAL_FACTORS: usize = 8;

pub fn compare(heuristic: OverallRisk, ai: AiRisk) -> Comparison {
    let ordinal_distance = heuristic.ordinal().map(|h| h.abs_diff(ai.ordinal()));
    Comparison {
        heuristic_risk: heuristic,
        ai_risk: ai,
        ordinal_distance,
        agreement: Agreement::from_distance(ordinal_distance),
    }
}

fn tier_points(risk: AiRisk) -> f64 {
    match risk {
        AiRisk::Critical => 40.0,
        AiRisk::High => 30.0,
        AiRisk::Medium => 20.0,
        AiRisk::Low => 10.0,
    }
}

fn urgency_points(urgency: Urgency) -> f64 {
    match urgency {
        Urgency::Immediate => 25.0,
        Urgency::High => 18.0,
        Urgency::Moderate => 10.0,
        Urgency::Low => 5.0,
    }
}

fn likelihood_points(likelihood: Likelihood) -> f64 {
    match likelihood {
        Likelihood::VeryHigh => 20.0,
        Likelihood::High => 15.0,
        Likelihood::Medium => 10.0,
        Likelihood::Low => 5.0,
        Likelihood::VeryLow => 2.0,
    }
}

/// 0–100 triage priority.
pub fn priority_score(
    risk: AiRisk,
    urgency: Urgency,
    likelihood: Likelihood,
    confidence: f64,
) -> f64 {
    let raw = tier_points(risk)
        + urgency_points(urgency)
        + likelihood_points(likelihood)
        + confidence.clamp(0.0, 1.0) * 15.0;
    raw.min(100.0)
}

pub fn requires_escalation(heuristic: OverallRisk, ai: AiRisk, urgency: Urgency) -> bool {
    let jumped = heuristic
        .ordinal()
        .is_some_and(|h| ai.ordinal() >= h.saturating_add(2));
    ai == AiRisk::Critical || urgency == Urgency::Immediate || jumped
}

/// Combine a model response and the heuristic assessment into the final
/// analysis.
pub fn merge(
    assessment: &CrisisAssessment,
    response: ModelResponse,
    metadata: AnalysisMetadata,
) -> AiAnalysis {
    let comparison = compare(assessment.overall_risk, response.ai_risk);
    let confidence = response.confidence.clamp(0.0, 1.0);
    let priority_score = priority_score(
        response.ai_risk,
        response.early_warning.urgency,
        response.displacement.likelihood,
        confidence,
    );
    let requires_escalation = requires_escalation(
        assessment.overall_risk,
        response.ai_risk,
        response.early_warning.urgency,
    );

    AiAnalysis {
        region: assessment.region.clone(),
        assessment_id: assessment.id,
        ai_risk_assessment: response.ai_risk,
        confidence,
        reasoning: response.reasoning,
        displacement_prediction: response.displacement,
        critical_factors: response.critical_factors,
        early_warning: response.early_warning,
        recommendations: response.recommendations,
        comparison,
        priority_score,
        requires_escalation,
        metadata,
    }
}

fn likelihood_from_level(level: RiskLevel) -> Likelihood {
    match level {
        RiskLevel::Critical => Likelihood::VeryHigh,
        RiskLevel::High => Likelihood::High,
        RiskLevel::Medium => Likelihood::Medium,
        RiskLevel::Low => Likelihood::Low,
        RiskLevel::Unknown => Likelihood::VeryLow,
    }
}

fn fallback_recommendations(risk: AiRisk, assessment: &CrisisAssessment) -> Recommendations {
    let mut rec = match risk {
        AiRisk::Critical | AiRisk::High => Recommendations {
            immediate: vec![
                "Activate emergency response coordination".to_string(),
                "Pre-position food, water and shelter supplies".to_string(),
            ],
            short_term: vec!["Scale up protection and health services".to_string()],
            long_term: vec!["Plan durable solutions for displaced populations".to_string()],
        },
        AiRisk::Medium => Recommendations {
            immediate: vec!["Increase monitoring frequency".to_string()],
            short_term: vec!["Update contingency plans".to_string()],
            long_term: vec!["Invest in community resilience".to_string()],
        },
        AiRisk::Low => Recommendations {
            immediate: Vec::new(),
            short_term: vec!["Maintain routine monitoring".to_string()],
            long_term: vec!["Invest in community resilience".to_string()],
        },
    };
    if assessment.available_sources() < 3 {
        rec.immediate
            .push("Restore coverage for unavailable data sources".to_string());
    }
    rec
}

/// Deterministic response derived only from the heuristic assessment.
pub fn fallback_response(assessment: &CrisisAssessment) -> ModelResponse {
    let ai_risk = AiRisk::from_heuristic(assessment.overall_risk);
    let displacement = &assessment.displacement_risk;

    let critical_factors: Vec<String> = assessment
        .immediate_threats
        .iter()
        .chain(assessment.risk_factors.iter())
        .map(|f| f.description.clone())
        .take(MAX_CRITICAL_FACTORS)
        .collect();
    let signals: Vec<String> = assessment
        .immediate_threats
        .iter()
        .chain(assessment.emerging_concerns.iter())
        .map(|f| f.description.clone())
        .collect();

    ModelResponse {
        ai_risk,
        confidence: (assessment.confidence - FALLBACK_CONFIDENCE_PENALTY).max(0.0),
        reasoning: format!(
            "Heuristic fallback, not AI-generated: no model produced a usable response. \
             Weighted score {:.1} from {}/4 available sources gives overall risk {}.",
            assessment.risk_score,
            assessment.available_sources(),
            assessment.overall_risk,
        ),
        displacement: DisplacementPrediction {
            likelihood: likelihood_from_level(displacement.level),
            timeframe: displacement.timeline_label.clone(),
            estimated_population: displacement.estimated_numbers,
            primary_triggers: displacement.primary_causes.clone(),
            likely_destinations: displacement.likely_destinations.clone(),
            displacement_type: DisplacementType::Mixed,
        },
        critical_factors,
        early_warning: EarlyWarning {
            triggered: matches!(ai_risk, AiRisk::Critical | AiRisk::High)
                || !assessment.immediate_threats.is_empty(),
            urgency: urgency_for(ai_risk),
            signals,
        },
        recommendations: fallback_recommendations(ai_risk, assessment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agreement_by_ordinal_distance() {
        assert_eq!(compare(OverallRisk::High, AiRisk::High).agreement, Agreement::Perfect);
        assert_eq!(compare(OverallRisk::Minimal, AiRisk::Low).agreement, Agreement::High);
        assert_eq!(compare(OverallRisk::Low, AiRisk::High).agreement, Agreement::Moderate);
        assert_eq!(compare(OverallRisk::Minimal, AiRisk::Critical).agreement, Agreement::Low);
        let unknown = compare(OverallRisk::Unknown, AiRisk::Medium);
        assert_eq!(unknown.ordinal_distance, None);
        assert_eq!(unknown.agreement, Agreement::Low);
    }

    #[test]
    fn test_priority_score_components() {
        // 40 + 25 + 20 + 15
        let max = priority_score(AiRisk::Critical, Urgency::Immediate, Likelihood::VeryHigh, 1.0);
        assert_eq!(max, 100.0);
        // 10 + 5 + 2 + 0
        let min = priority_score(AiRisk::Low, Urgency::Low, Likelihood::VeryLow, 0.0);
        assert_eq!(min, 17.0);
        let mid = priority_score(AiRisk::High, Urgency::Moderate, Likelihood::Medium, 0.5);
        assert_eq!(mid, 57.5);
    }

    #[test]
    fn test_escalation_rules() {
        assert!(requires_escalation(OverallRisk::Critical, AiRisk::Critical, Urgency::High));
        assert!(requires_escalation(OverallRisk::Low, AiRisk::Low, Urgency::Immediate));
        assert!(requires_escalation(OverallRisk::Low, AiRisk::High, Urgency::Moderate));
        assert!(!requires_escalation(OverallRisk::Medium, AiRisk::High, Urgency::High));
        assert!(!requires_escalation(OverallRisk::Unknown, AiRisk::High, Urgency::High));
    }
}
