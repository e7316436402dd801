//! Risk aggregation: four canonical records to one [`CrisisAssessment`].
//!
//! Scoring:
//! 1. Each available record's level maps to a score (CRITICAL 100 … LOW 25).
//! 2. Scores are weighted by domain and summed over available sources.
//! 3. The sum is multiplied by `available / 4`, penalizing sparse data.
//! 4. The result is thresholded into a tier, except that any CRITICAL
//!    source forces the tier to CRITICAL.

use chrono::Utc;
use uuid::Uuid;

use crate::displacement::{predict_displacement, DisplacementConstants};
use crate::domain::{
    CrisisAssessment, DataQuality, Domain, OverallRisk, Region, RiskLevel, SourceSet,
    TaggedFactor, TrendMap,
};
use crate::trends::analyze_trends;

/// Confidence gained per available source.
const CONFIDENCE_PER_SOURCE: f64 = 0.06;

/// The risk/confidence/factor part of an assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    pub overall_risk: OverallRisk,
    pub risk_score: f64,
    pub confidence: f64,
    pub data_quality: DataQuality,
    pub available: usize,
    pub critical_override: bool,
    pub risk_factors: Vec<TaggedFactor>,
    pub protective_factors: Vec<TaggedFactor>,
    pub immediate_threats: Vec<TaggedFactor>,
}

/// `(base, cap)` for the confidence formula. Stronger tiers are capped higher.
fn confidence_tier(risk: OverallRisk) -> (f64, f64) {
    match risk {
        OverallRisk::Critical => (0.70, 0.95),
        OverallRisk::High => (0.65, 0.90),
        OverallRisk::Medium => (0.60, 0.85),
        OverallRisk::Low => (0.55, 0.80),
        OverallRisk::Minimal => (0.50, 0.75),
        OverallRisk::Unknown => (0.10, 0.10),
    }
}

/// Weighted, completeness-adjusted score over the available records.
pub fn weighted_score(sources: &SourceSet) -> f64 {
    let available = sources.available_count();
    let sum: f64 = sources
        .iter()
        .filter(|r| r.available)
        .map(|r| r.domain.weight() * r.risk_level.score())
        .sum();
    sum * (available as f64 / Domain::ALL.len() as f64)
}

pub fn aggregate_risk(sources: &SourceSet) -> RiskSummary {
    let available = sources.available_count();
    let risk_score = weighted_score(sources);

    let critical: Vec<Domain> = sources
        .iter()
        .filter(|r| r.available && r.risk_level == RiskLevel::Critical)
        .map(|r| r.domain)
        .collect();
    let critical_override = !critical.is_empty();

    let overall_risk = if available == 0 {
        OverallRisk::Unknown
    } else if critical_override {
        OverallRisk::Critical
    } else {
        OverallRisk::from_score(risk_score)
    };

    let (base, cap) = confidence_tier(overall_risk);
    let confidence = (base + available as f64 * CONFIDENCE_PER_SOURCE).min(cap);

    let risk_factors = sources
        .iter()
        .filter(|r| r.available)
        .flat_map(|r| {
            r.indicators
                .iter()
                .map(move |i| TaggedFactor::new(r.domain, r.risk_level, i.clone()))
        })
        .collect();

    let mut immediate_threats: Vec<TaggedFactor> = critical
        .iter()
        .map(|d| {
            let rec = sources.get(*d);
            let lead = rec
                .indicators
                .first()
                .map(String::as_str)
                .unwrap_or("no indicator detail");
            TaggedFactor::new(*d, RiskLevel::Critical, format!("CRITICAL {d} risk: {lead}"))
        })
        .collect();
    if critical_override {
        let names: Vec<&str> = critical.iter().map(|d| d.as_str()).collect();
        immediate_threats.push(TaggedFactor::cross_source(
            RiskLevel::Critical,
            format!(
                "Overall risk forced to CRITICAL by {} source(s): {}",
                critical.len(),
                names.join(", ")
            ),
        ));
    }

    RiskSummary {
        overall_risk,
        risk_score,
        confidence,
        data_quality: DataQuality::from_availability(available, Domain::ALL.len()),
        available,
        critical_override,
        risk_factors,
        protective_factors: protective_factors(sources),
        immediate_threats,
    }
}

fn protective_factors(sources: &SourceSet) -> Vec<TaggedFactor> {
    let mut out = Vec::new();
    let low = |d: Domain| sources.get(d).available && sources.get(d).risk_level == RiskLevel::Low;

    if low(Domain::Conflict)
        && sources
            .conflict
            .conflict_detail()
            .is_some_and(|d| !d.increasing)
    {
        out.push(TaggedFactor::new(
            Domain::Conflict,
            RiskLevel::Low,
            "Low conflict activity with no escalation",
        ));
    }
    if low(Domain::Economic)
        && sources
            .economic
            .economic_detail()
            .and_then(|d| d.stability.as_deref())
            .is_some_and(|s| matches!(s, "stable" | "improving"))
    {
        out.push(TaggedFactor::new(
            Domain::Economic,
            RiskLevel::Low,
            "Stable economic conditions",
        ));
    }
    if low(Domain::Climate)
        && sources
            .climate
            .climate_detail()
            .is_some_and(|d| d.hazards.is_empty())
    {
        out.push(TaggedFactor::new(
            Domain::Climate,
            RiskLevel::Low,
            "No active natural hazards",
        ));
    }
    if low(Domain::News)
        && sources
            .news
            .news_detail()
            .and_then(|d| d.average_sentiment)
            .is_some_and(|s| s >= 0.2)
    {
        out.push(TaggedFactor::new(
            Domain::News,
            RiskLevel::Low,
            "Positive media sentiment",
        ));
    }
    out
}

/// HIGH sources, plus MEDIUM/LOW sources whose trend is worsening.
fn emerging_concerns(sources: &SourceSet, trends: &TrendMap) -> Vec<TaggedFactor> {
    sources
        .iter()
        .filter(|r| r.available)
        .filter_map(|r| match r.risk_level {
            RiskLevel::High => Some(TaggedFactor::new(
                r.domain,
                RiskLevel::High,
                format!("{} risk elevated to HIGH", r.domain),
            )),
            RiskLevel::Medium | RiskLevel::Low if trends.get(r.domain).is_worsening() => {
                Some(TaggedFactor::new(
                    r.domain,
                    r.risk_level,
                    format!("{} trend worsening from {} level", r.domain, r.risk_level),
                ))
            }
            _ => None,
        })
        .collect()
}

/// Build the complete assessment for one cycle.
///
/// This is the only constructor of [`CrisisAssessment`] in the crate.
pub fn build_assessment(
    region: Region,
    sources: SourceSet,
    constants: &DisplacementConstants,
) -> CrisisAssessment {
    let summary = aggregate_risk(&sources);
    let trends = analyze_trends(&sources);
    let displacement_risk = predict_displacement(&region, &sources, constants);
    let emerging_concerns = emerging_concerns(&sources, &trends);

    CrisisAssessment {
        id: Uuid::new_v4(),
        region,
        assessed_at: Utc::now(),
        overall_risk: summary.overall_risk,
        risk_score: summary.risk_score,
        confidence: summary.confidence,
        data_quality: summary.data_quality,
        sources,
        risk_factors: summary.risk_factors,
        protective_factors: summary.protective_factors,
        immediate_threats: summary.immediate_threats,
        emerging_concerns,
        displacement_risk,
        trends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn test_weighted_example_is_low() {
        let mut sources = SourceSet::empty();
        sources.set(normalize(Domain::Conflict, &json!({"riskLevel": "HIGH"})));
        sources.set(normalize(Domain::Climate, &json!({"riskLevel": "LOW"})));
        sources.set(normalize(Domain::News, &json!({"riskLevel": "MEDIUM"})));
        let summary = aggregate_risk(&sources);
        assert!((summary.risk_score - 31.875).abs() < 1e-9);
        assert_eq!(summary.overall_risk, OverallRisk::Low);
        assert_eq!(summary.data_quality, DataQuality::Good);
        // LOW tier: min(0.80, 0.55 + 3 * 0.06)
        assert!((summary.confidence - 0.73).abs() < 1e-9);
    }

    #[test]
    fn test_no_sources_is_unknown() {
        let summary = aggregate_risk(&SourceSet::empty());
        assert_eq!(summary.overall_risk, OverallRisk::Unknown);
        assert_eq!(summary.risk_score, 0.0);
        assert_eq!(summary.confidence, 0.10);
        assert_eq!(summary.data_quality, DataQuality::Poor);
    }

    #[test]
    fn test_single_critical_overrides_weighted_score() {
        let mut sources = SourceSet::empty();
        sources.set(normalize(Domain::Climate, &json!({"riskLevel": "critical"})));
        let summary = aggregate_risk(&sources);
        // 0.15 * 100 * 0.25 would be MINIMAL
        assert!(summary.risk_score < 20.0);
        assert_eq!(summary.overall_risk, OverallRisk::Critical);
        assert!(summary.critical_override);
        assert_eq!(summary.immediate_threats.len(), 2);
        assert!(summary.immediate_threats[1].source.is_none());
    }

    #[test]
    fn test_confidence_capped_by_tier() {
        let mut sources = SourceSet::empty();
        for d in Domain::ALL {
            sources.set(normalize(d, &json!({"riskLevel": "critical"})));
        }
        let summary = aggregate_risk(&sources);
        // 0.70 + 4 * 0.06 = 0.94, under the 0.95 cap
        assert!((summary.confidence - 0.94).abs() < 1e-9);
        assert!((summary.risk_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_factors_tagged_by_source() {
        let mut sources = SourceSet::empty();
        sources.set(normalize(
            Domain::Conflict,
            &json!({"riskLevel": "HIGH", "hotspots": ["Goma"]}),
        ));
        let summary = aggregate_risk(&sources);
        assert_eq!(summary.risk_factors.len(), 1);
        assert_eq!(summary.risk_factors[0].source, Some(Domain::Conflict));
        assert_eq!(summary.risk_factors[0].severity, RiskLevel::High);
    }

    #[test]
    fn test_protective_factors() {
        let sources = SourceSet {
            conflict: normalize(Domain::Conflict, &json!({"totalEvents": 1})),
            economic: normalize(Domain::Economic, &json!({"stability": "stable"})),
            climate: normalize(Domain::Climate, &json!({"hazards": []})),
            news: normalize(Domain::News, &json!({"sentiment": 0.3})),
        };
        let summary = aggregate_risk(&sources);
        assert_eq!(summary.protective_factors.len(), 4);
        assert_eq!(summary.overall_risk, OverallRisk::Low);
    }

    #[test]
    fn test_emerging_concerns_include_worsening_medium() {
        let sources = SourceSet {
            conflict: normalize(
                Domain::Conflict,
                &json!({"riskLevel": "MEDIUM", "trends": {"increasing": true}}),
            ),
            economic: normalize(Domain::Economic, &json!({"riskLevel": "HIGH"})),
            climate: normalize(Domain::Climate, &json!({"riskLevel": "LOW"})),
            news: normalize(Domain::News, &json!(null)),
        };
        let region = Region::parse("SSD").unwrap();
        let assessment = build_assessment(region, sources, &DisplacementConstants::default());
        let domains: Vec<_> = assessment
            .emerging_concerns
            .iter()
            .map(|f| f.source)
            .collect();
        assert_eq!(domains, vec![Some(Domain::Conflict), Some(Domain::Economic)]);
        assert_eq!(assessment.available_sources(), 3);
    }
}
