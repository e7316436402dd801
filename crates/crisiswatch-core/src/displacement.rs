//! Displacement outlook from the normalized source records.
//!
//! The population estimate is a sum of fixed multipliers over source
//! scores. The multipliers have no empirical calibration; they live in
//! [`DisplacementConstants`] so operators can tune them, and the output
//! should be read as an order of magnitude only.

use serde::{Deserialize, Serialize};

use crate::domain::{
    DisplacementRisk, DisplacementTimeline, Region, RiskLevel, SourceSet, UNAVAILABLE_CONFIDENCE,
};

/// Tunable multipliers for the displacement estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplacementConstants {
    /// People per conflict score point when conflict is HIGH or CRITICAL.
    pub conflict_per_point: f64,
    pub economic_critical_per_point: f64,
    pub economic_high_per_point: f64,
    /// Flat addition for a CRITICAL natural hazard, applied once.
    pub critical_hazard_flat: f64,
}

impl Default for DisplacementConstants {
    fn default() -> Self {
        Self {
            conflict_per_point: 500.0,
            economic_critical_per_point: 200.0,
            economic_high_per_point: 100.0,
            critical_hazard_flat: 10_000.0,
        }
    }
}

/// Origin → neighbouring destinations, keyed by ISO alpha-3.
fn destination_table(origin: &str) -> Option<&'static [&'static str]> {
    let dests: &'static [&'static str] = match origin {
        "SYR" => &["Turkey", "Lebanon", "Jordan", "Iraq", "Germany"],
        "AFG" => &["Pakistan", "Iran", "Turkey"],
        "UKR" => &["Poland", "Romania", "Moldova", "Germany", "Slovakia", "Hungary"],
        "SDN" => &["Chad", "South Sudan", "Egypt", "Ethiopia"],
        "SSD" => &["Uganda", "Sudan", "Ethiopia", "Kenya"],
        "MMR" => &["Bangladesh", "Thailand", "Malaysia", "India"],
        "VEN" => &["Colombia", "Peru", "Brazil", "Ecuador", "Chile"],
        "YEM" => &["Saudi Arabia", "Oman", "Djibouti"],
        "SOM" => &["Kenya", "Ethiopia", "Yemen"],
        "COD" => &["Uganda", "Rwanda", "Burundi", "Tanzania"],
        "ETH" => &["Sudan", "Kenya", "Djibouti"],
        "HTI" => &["Dominican Republic", "United States"],
        _ => return None,
    };
    Some(dests)
}

pub fn likely_destinations(region: &Region) -> Vec<String> {
    match destination_table(region.code()) {
        Some(dests) => dests.iter().map(|d| d.to_string()).collect(),
        None => vec!["Neighboring countries".to_string()],
    }
}

/// Scan the records for displacement triggers.
pub fn predict_displacement(
    region: &Region,
    sources: &SourceSet,
    constants: &DisplacementConstants,
) -> DisplacementRisk {
    let mut causes: Vec<String> = Vec::new();
    let mut triggers: Vec<String> = Vec::new();
    let mut estimate = 0.0_f64;
    let mut armed_conflict = false;
    let mut immediate = false;

    let conflict = &sources.conflict;
    if conflict.available && conflict.risk_level.is_elevated() {
        causes.push(format!("Armed conflict ({})", conflict.risk_level));
        estimate += conflict.score * constants.conflict_per_point;
        armed_conflict = conflict.risk_level == RiskLevel::Critical;
        if let Some(detail) = conflict.conflict_detail() {
            triggers.extend(detail.hotspots.iter().map(|h| format!("Fighting in {h}")));
            if detail.increasing {
                triggers.push("Escalating conflict activity".to_string());
            }
        }
    }

    let economic = &sources.economic;
    match economic.risk_level {
        RiskLevel::Critical if economic.available => {
            causes.push("Economic collapse".to_string());
            estimate += economic.score * constants.economic_critical_per_point;
        }
        RiskLevel::High if economic.available => {
            causes.push("Severe economic stress".to_string());
            estimate += economic.score * constants.economic_high_per_point;
        }
        _ => {}
    }

    if let Some(climate) = sources.climate.climate_detail() {
        let critical: Vec<_> = climate
            .hazards
            .iter()
            .filter(|h| h.severity == RiskLevel::Critical)
            .collect();
        if !critical.is_empty() {
            causes.push("Critical natural hazard".to_string());
            estimate += constants.critical_hazard_flat;
            immediate = true;
            triggers.extend(critical.iter().map(|h| format!("Critical {} event", h.kind)));
        } else if climate.has_hazard_at(RiskLevel::High) {
            causes.push("Severe natural hazard".to_string());
        }
    }

    if let Some(news) = sources.news.news_detail() {
        if sources.news.risk_level == RiskLevel::Critical && news.breaking_count > 0 {
            causes.push("Breaking crisis reports".to_string());
        }
    }

    let (level, mut timeline) = if causes.len() >= 3 || armed_conflict {
        (RiskLevel::Critical, DisplacementTimeline::OneToFourWeeks)
    } else if causes.len() == 2 {
        (RiskLevel::High, DisplacementTimeline::OneToThreeMonths)
    } else if causes.len() == 1 {
        (RiskLevel::Medium, DisplacementTimeline::ThreeToSixMonths)
    } else {
        (RiskLevel::Low, DisplacementTimeline::SixMonthsPlus)
    };
    if immediate {
        timeline = DisplacementTimeline::Immediate;
    }

    DisplacementRisk {
        level,
        confidence: displacement_confidence(sources),
        timeline,
        timeline_label: timeline.label().to_string(),
        estimated_numbers: if estimate.is_finite() {
            estimate.max(0.0).round() as u64
        } else {
            0
        },
        primary_causes: causes,
        likely_destinations: likely_destinations(region),
        trigger_events: triggers,
    }
}

/// Mean confidence of the available records.
fn displacement_confidence(sources: &SourceSet) -> f64 {
    let available: Vec<f64> = sources
        .iter()
        .filter(|r| r.available)
        .map(|r| r.confidence)
        .collect();
    if available.is_empty() {
        return UNAVAILABLE_CONFIDENCE;
    }
    (available.iter().sum::<f64>() / available.len() as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::normalize::normalize;
    use serde_json::json;

    fn region(code: &str) -> Region {
        Region::parse(code).unwrap()
    }

    #[test]
    fn test_no_triggers_is_low_six_months() {
        let risk = predict_displacement(
            &region("CHE"),
            &SourceSet::empty(),
            &DisplacementConstants::default(),
        );
        assert_eq!(risk.level, RiskLevel::Low);
        assert_eq!(risk.timeline, DisplacementTimeline::SixMonthsPlus);
        assert_eq!(risk.estimated_numbers, 0);
        assert_eq!(risk.likely_destinations, vec!["Neighboring countries"]);
        assert_eq!(risk.confidence, UNAVAILABLE_CONFIDENCE);
    }

    #[test]
    fn test_critical_conflict_is_armed_conflict_trigger() {
        let mut sources = SourceSet::empty();
        sources.set(normalize(
            Domain::Conflict,
            &json!({"riskLevel": "CRITICAL", "riskScore": 90, "hotspots": ["Aleppo"]}),
        ));
        let risk = predict_displacement(&region("SYR"), &sources, &DisplacementConstants::default());
        assert_eq!(risk.level, RiskLevel::Critical);
        assert_eq!(risk.timeline, DisplacementTimeline::OneToFourWeeks);
        assert_eq!(risk.estimated_numbers, 45_000);
        assert_eq!(risk.trigger_events, vec!["Fighting in Aleppo"]);
        assert_eq!(risk.likely_destinations[0], "Turkey");
    }

    #[test]
    fn test_critical_hazard_forces_immediate_timeline() {
        let mut sources = SourceSet::empty();
        sources.set(normalize(
            Domain::Climate,
            &json!({"hazards": [
                {"type": "cyclone", "severity": "red"},
                {"type": "flood", "severity": "red"}
            ]}),
        ));
        let risk = predict_displacement(&region("MMR"), &sources, &DisplacementConstants::default());
        assert_eq!(risk.level, RiskLevel::Medium);
        assert_eq!(risk.timeline, DisplacementTimeline::Immediate);
        assert_eq!(risk.timeline_label, "Immediate (0-2 weeks)");
        // Flat addition applies once regardless of hazard count.
        assert_eq!(risk.estimated_numbers, 10_000);
    }

    #[test]
    fn test_economic_and_news_causes() {
        let mut sources = SourceSet::empty();
        sources.set(normalize(
            Domain::Economic,
            &json!({"riskLevel": "HIGH", "riskScore": 40}),
        ));
        sources.set(normalize(
            Domain::News,
            &json!({"riskLevel": "CRITICAL", "articles": [{"title": "x", "breaking": true}]}),
        ));
        let risk = predict_displacement(&region("VEN"), &sources, &DisplacementConstants::default());
        assert_eq!(risk.primary_causes.len(), 2);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.timeline, DisplacementTimeline::OneToThreeMonths);
        assert_eq!(risk.estimated_numbers, 4_000);
    }

    #[test]
    fn test_constants_are_tunable() {
        let mut sources = SourceSet::empty();
        sources.set(normalize(
            Domain::Conflict,
            &json!({"riskLevel": "HIGH", "riskScore": 10}),
        ));
        let constants = DisplacementConstants {
            conflict_per_point: 1.0,
            ..DisplacementConstants::default()
        };
        let risk = predict_displacement(&region("AFG"), &sources, &constants);
        assert_eq!(risk.estimated_numbers, 10);
        assert_eq!(risk.level, RiskLevel::Medium);
    }
}
