//! Macroeconomic indicator feed.
//!
//! `indicators` is a map of `{name: {value, trend}}`; a bare number is
//! accepted in place of the inner object.

use serde_json::{Map, Value};

use super::{explicit_confidence, explicit_level, explicit_score, recognised_object, string, value_number};
use crate::domain::{
    CanonicalSourceRecord, Direction, Domain, EconomicDetail, EconomicIndicator, RiskLevel,
    SourceDetail,
};

const FIELDS: &[&str] = &["riskLevel", "riskScore", "indicators", "stability"];

const DEFAULT_CONFIDENCE: f64 = 0.75;

pub fn normalize_economic(payload: &Value) -> CanonicalSourceRecord {
    let obj = match recognised_object(payload, FIELDS) {
        Ok(obj) => obj,
        Err(reason) => return CanonicalSourceRecord::unavailable(Domain::Economic, reason),
    };

    let tracked = read_indicators(obj);
    let stability = string(obj, "stability").map(|s| s.to_ascii_lowercase());

    let mut points = 0u32;
    let mut indicators = Vec::new();
    for ind in &tracked {
        let Some(value) = ind.value else { continue };
        let (pts, note) = stress(&ind.name, value);
        if pts > 0 {
            points += pts;
            indicators.extend(note);
        }
    }
    if let Some(s) = stability.as_deref() {
        if !matches!(s, "stable" | "improving") {
            indicators.push(format!("Economic stability: {s}"));
        }
    }

    let risk_level = explicit_level(obj).unwrap_or(match points {
        6.. => RiskLevel::Critical,
        4..=5 => RiskLevel::High,
        2..=3 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    });
    let score = explicit_score(obj).unwrap_or(f64::from(points) * 10.0);

    CanonicalSourceRecord::available(
        Domain::Economic,
        risk_level,
        explicit_confidence(obj).unwrap_or(DEFAULT_CONFIDENCE),
        score,
        indicators,
        SourceDetail::Economic(EconomicDetail {
            indicators: tracked,
            stability,
        }),
    )
}

fn read_indicators(obj: &Map<String, Value>) -> Vec<EconomicIndicator> {
    let Some(Value::Object(map)) = obj.get("indicators") else {
        return Vec::new();
    };
    map.iter()
        .map(|(name, raw)| match raw {
            Value::Object(inner) => EconomicIndicator {
                name: name.clone(),
                value: inner.get("value").and_then(value_number),
                trend: string(inner, "trend").and_then(Direction::parse_outcome),
            },
            other => EconomicIndicator {
                name: name.clone(),
                value: value_number(other),
                trend: None,
            },
        })
        .collect()
}

/// Stress points contributed by one indicator, with its descriptor.
fn stress(name: &str, value: f64) -> (u32, Option<String>) {
    let pts = match name {
        "inflation" => match value {
            v if v > 50.0 => 3,
            v if v > 20.0 => 2,
            v if v > 10.0 => 1,
            _ => 0,
        },
        "gdpGrowth" => match value {
            v if v < -5.0 => 3,
            v if v < -2.0 => 2,
            v if v < 0.0 => 1,
            _ => 0,
        },
        "unemployment" => match value {
            v if v > 25.0 => 2,
            v if v > 15.0 => 1,
            _ => 0,
        },
        "foodPriceIndex" => match value {
            v if v > 150.0 => 2,
            v if v > 120.0 => 1,
            _ => 0,
        },
        _ => 0,
    };
    let note = match name {
        "inflation" => format!("Inflation at {value:.1}%"),
        "gdpGrowth" => format!("GDP contraction of {value:.1}%"),
        "unemployment" => format!("Unemployment at {value:.1}%"),
        "foodPriceIndex" => format!("Food price index at {value:.1}"),
        _ => return (0, None),
    };
    (pts, Some(note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stress_points_derive_level_and_score() {
        let rec = normalize_economic(&json!({
            "indicators": {
                "inflation": {"value": 65.0, "trend": "increasing"},
                "gdpGrowth": {"value": -3.0, "trend": "decreasing"},
                "unemployment": 18
            }
        }));
        // 3 + 2 + 1
        assert_eq!(rec.risk_level, RiskLevel::Critical);
        assert_eq!(rec.score, 60.0);
        assert_eq!(rec.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(rec.indicators.len(), 3);
    }

    #[test]
    fn test_mild_indicators_are_low() {
        let rec = normalize_economic(&json!({
            "indicators": {"inflation": {"value": 4.0}, "gdpGrowth": {"value": 2.1}},
            "stability": "Stable"
        }));
        assert_eq!(rec.risk_level, RiskLevel::Low);
        assert_eq!(rec.score, 0.0);
        assert!(rec.indicators.is_empty());
        assert_eq!(
            rec.economic_detail().unwrap().stability.as_deref(),
            Some("stable")
        );
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let rec = normalize_economic(&json!({
            "indicators": {"inflation": 20.0, "foodPriceIndex": 150.0}
        }));
        // inflation 20 -> 1 point, food 150 -> 1 point
        assert_eq!(rec.score, 20.0);
        assert_eq!(rec.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_explicit_fields_override() {
        let rec = normalize_economic(&json!({
            "riskLevel": "HIGH",
            "riskScore": 72.5,
            "confidence": 0.5,
            "indicators": {}
        }));
        assert_eq!(rec.risk_level, RiskLevel::High);
        assert_eq!(rec.score, 72.5);
        assert_eq!(rec.confidence, 0.5);
    }

    #[test]
    fn test_indicator_trends_kept_in_detail() {
        let rec = normalize_economic(&json!({
            "indicators": {"currency": {"value": 1.2, "trend": "decreasing"}}
        }));
        let detail = rec.economic_detail().unwrap();
        assert_eq!(detail.indicators[0].trend, Some(Direction::Decreasing));
    }

    #[test]
    fn test_indicator_trend_words_read_as_outcomes() {
        let rec = normalize_economic(&json!({
            "indicators": {
                "gdpGrowth": {"value": 3.0, "trend": "improving"},
                "currency": {"value": 0.9, "trend": "worsening"}
            }
        }));
        let detail = rec.economic_detail().unwrap();
        let trend = |name: &str| {
            detail
                .indicators
                .iter()
                .find(|i| i.name == name)
                .and_then(|i| i.trend)
        };
        assert_eq!(trend("gdpGrowth"), Some(Direction::Increasing));
        assert_eq!(trend("currency"), Some(Direction::Decreasing));
    }
}
