//! Source normalizers: raw per-domain payloads to [`CanonicalSourceRecord`].
//!
//! Every normalizer is a pure function that never fails. A payload that is
//! `null`, not an object, empty, or lacks every field the domain recognises
//! becomes an unavailable record.

pub mod climate;
pub mod conflict;
pub mod economic;
pub mod news;

use serde_json::{Map, Value};

use crate::domain::{CanonicalSourceRecord, Domain, RiskLevel};

pub use climate::normalize_climate;
pub use conflict::normalize_conflict;
pub use economic::normalize_economic;
pub use news::normalize_news;

/// Dispatch a payload to the normalizer for `domain`.
pub fn normalize(domain: Domain, payload: &Value) -> CanonicalSourceRecord {
    match domain {
        Domain::Conflict => normalize_conflict(payload),
        Domain::Economic => normalize_economic(payload),
        Domain::Climate => normalize_climate(payload),
        Domain::News => normalize_news(payload),
    }
}

/// Borrow the payload as an object that carries at least one of `fields`.
///
/// Returns the reason the payload is unusable otherwise.
pub(crate) fn recognised_object<'a>(
    payload: &'a Value,
    fields: &[&str],
) -> Result<&'a Map<String, Value>, &'static str> {
    let obj = match payload {
        Value::Null => return Err("no data returned"),
        Value::Object(obj) => obj,
        _ => return Err("payload is not an object"),
    };
    if obj.is_empty() {
        return Err("empty payload");
    }
    if !fields.iter().any(|f| obj.get(*f).is_some_and(|v| !v.is_null())) {
        return Err("payload has no recognised fields");
    }
    Ok(obj)
}

/// Numeric field; numeric strings are accepted because several feeds
/// quote their numbers.
pub(crate) fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    value_number(obj.get(key)?)
}

pub(crate) fn value_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-negative integer count, truncating fractional values.
pub(crate) fn count(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    number(obj, key).map(|n| n.max(0.0) as u64)
}

pub(crate) fn string<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)?.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Explicit `riskLevel`. An explicit `UNKNOWN` is ignored so the level is
/// derived from the data instead.
pub(crate) fn explicit_level(obj: &Map<String, Value>) -> Option<RiskLevel> {
    string(obj, "riskLevel")
        .and_then(RiskLevel::parse)
        .filter(|level| *level != RiskLevel::Unknown)
}

pub(crate) fn explicit_confidence(obj: &Map<String, Value>) -> Option<f64> {
    number(obj, "confidence").map(|c| c.clamp(0.0, 1.0))
}

pub(crate) fn explicit_score(obj: &Map<String, Value>) -> Option<f64> {
    number(obj, "riskScore").map(|s| s.max(0.0))
}

/// Label list from an array of strings or of objects carrying one of
/// `name_keys`.
pub(crate) fn labels(value: Option<&Value>, name_keys: &[&str]) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(obj) => name_keys
                .iter()
                .find_map(|k| string(obj, k))
                .map(str::to_string),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Ordering of levels by severity, `Unknown` lowest.
pub(crate) fn severity_rank(level: RiskLevel) -> u8 {
    match level {
        RiskLevel::Critical => 4,
        RiskLevel::High => 3,
        RiskLevel::Medium => 2,
        RiskLevel::Low => 1,
        RiskLevel::Unknown => 0,
    }
}
