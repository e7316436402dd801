//! Climate and natural-hazard feed.

use serde_json::{Map, Value};

use super::{
    explicit_confidence, explicit_level, explicit_score, recognised_object, severity_rank, string,
};
use crate::domain::{CanonicalSourceRecord, ClimateDetail, Direction, Domain, Hazard, RiskLevel, SourceDetail};

const FIELDS: &[&str] = &["riskLevel", "riskScore", "hazards", "alerts", "conditions", "trend"];

const DEFAULT_CONFIDENCE: f64 = 0.7;

pub fn normalize_climate(payload: &Value) -> CanonicalSourceRecord {
    let obj = match recognised_object(payload, FIELDS) {
        Ok(obj) => obj,
        Err(reason) => return CanonicalSourceRecord::unavailable(Domain::Climate, reason),
    };

    let mut hazards = read_hazards(obj.get("hazards"));
    hazards.extend(read_hazards(obj.get("alerts")));
    let trend = string(obj, "trend").and_then(Direction::parse);

    let worst = hazards
        .iter()
        .map(|h| h.severity)
        .max_by_key(|s| severity_rank(*s))
        .unwrap_or(RiskLevel::Low);
    let risk_level = explicit_level(obj).unwrap_or(worst);

    let score = explicit_score(obj).unwrap_or_else(|| {
        hazards
            .iter()
            .map(|h| hazard_score(h.severity))
            .sum::<f64>()
            .min(100.0)
    });

    let indicators = hazards
        .iter()
        .map(|h| {
            if h.description.is_empty() {
                format!("{} {} alert", h.severity, h.kind)
            } else {
                format!("{}: {}", h.kind, h.description)
            }
        })
        .collect();

    CanonicalSourceRecord::available(
        Domain::Climate,
        risk_level,
        explicit_confidence(obj).unwrap_or(DEFAULT_CONFIDENCE),
        score,
        indicators,
        SourceDetail::Climate(ClimateDetail { hazards, trend }),
    )
}

fn hazard_score(severity: RiskLevel) -> f64 {
    match severity {
        RiskLevel::Critical => 40.0,
        RiskLevel::High => 25.0,
        RiskLevel::Medium => 10.0,
        RiskLevel::Low => 5.0,
        RiskLevel::Unknown => 0.0,
    }
}

/// Severity word or GDACS alert colour. Unrecognised severities are read
/// as `MEDIUM` so an active but unclassified hazard still counts.
fn parse_severity(raw: Option<&str>) -> RiskLevel {
    let Some(raw) = raw else {
        return RiskLevel::Medium;
    };
    match raw.to_ascii_lowercase().as_str() {
        "red" => RiskLevel::Critical,
        "orange" => RiskLevel::High,
        "yellow" => RiskLevel::Medium,
        "green" => RiskLevel::Low,
        _ => match RiskLevel::parse(raw) {
            Some(RiskLevel::Unknown) | None => RiskLevel::Medium,
            Some(level) => level,
        },
    }
}

fn read_hazards(value: Option<&Value>) -> Vec<Hazard> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|h: &Map<String, Value>| Hazard {
            kind: string(h, "type")
                .or_else(|| string(h, "eventType"))
                .unwrap_or("hazard")
                .to_string(),
            severity: parse_severity(string(h, "severity").or_else(|| string(h, "alertLevel"))),
            description: string(h, "description").unwrap_or_default().to_string(),
        })
        .collect()
}
