//! Armed-conflict event feed.

use serde_json::{Map, Value};

use super::{count, explicit_confidence, explicit_level, explicit_score, labels, recognised_object, string};
use crate::domain::{CanonicalSourceRecord, ConflictDetail, Direction, Domain, RiskLevel, SourceDetail};

const FIELDS: &[&str] = &[
    "riskLevel",
    "riskScore",
    "fatalities",
    "totalEvents",
    "trends",
    "hotspots",
];

const CONFIDENCE_EXPLICIT: f64 = 0.8;
const CONFIDENCE_DERIVED: f64 = 0.6;

pub fn normalize_conflict(payload: &Value) -> CanonicalSourceRecord {
    let obj = match recognised_object(payload, FIELDS) {
        Ok(obj) => obj,
        Err(reason) => return CanonicalSourceRecord::unavailable(Domain::Conflict, reason),
    };

    let fatalities = count(obj, "fatalities").unwrap_or(0);
    let total_events = count(obj, "totalEvents").unwrap_or(0);
    let (increasing, decreasing) = trend_flags(obj);
    let hotspots = labels(obj.get("hotspots"), &["location", "name", "admin1"]);

    let explicit = explicit_level(obj);
    let risk_level = explicit.unwrap_or_else(|| derive_level(fatalities, total_events));
    let confidence = explicit_confidence(obj).unwrap_or(if explicit.is_some() {
        CONFIDENCE_EXPLICIT
    } else {
        CONFIDENCE_DERIVED
    });
    let score = explicit_score(obj)
        .unwrap_or_else(|| (total_events as f64 + fatalities as f64 * 0.5).min(100.0));

    let mut indicators = Vec::new();
    if total_events > 0 {
        indicators.push(format!("{total_events} conflict events recorded"));
    }
    if fatalities > 0 {
        indicators.push(format!("{fatalities} conflict fatalities reported"));
    }
    if increasing {
        indicators.push("Escalating conflict activity".to_string());
    }
    indicators.extend(hotspots.iter().map(|h| format!("Active hotspot: {h}")));

    CanonicalSourceRecord::available(
        Domain::Conflict,
        risk_level,
        confidence,
        score,
        indicators,
        SourceDetail::Conflict(ConflictDetail {
            total_events,
            fatalities,
            increasing,
            decreasing,
            hotspots,
        }),
    )
}

fn derive_level(fatalities: u64, events: u64) -> RiskLevel {
    if fatalities >= 100 || events >= 50 {
        RiskLevel::Critical
    } else if fatalities >= 25 || events >= 20 {
        RiskLevel::High
    } else if fatalities >= 5 || events >= 5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// `trends` is either `{increasing, decreasing}` flags or a direction word.
fn trend_flags(obj: &Map<String, Value>) -> (bool, bool) {
    match obj.get("trends") {
        Some(Value::Object(t)) => {
            let flag = |k: &str| t.get(k).and_then(Value::as_bool).unwrap_or(false);
            (flag("increasing"), flag("decreasing"))
        }
        Some(Value::String(_)) => match string(obj, "trends").and_then(Direction::parse) {
            Some(Direction::Increasing) => (true, false),
            Some(Direction::Decreasing) => (false, true),
            _ => (false, false),
        },
        _ => (false, false),
    }
}
