//! News and media coverage feed.

use serde_json::{Map, Value};

use super::{explicit_confidence, explicit_level, explicit_score, number, recognised_object, string, value_number};
use crate::domain::{CanonicalSourceRecord, Direction, Domain, NewsDetail, RiskLevel, SourceDetail};

const FIELDS: &[&str] = &["riskLevel", "riskScore", "articles", "sentiment", "coverageTrend"];

const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Breaking headlines copied into the indicator list.
const MAX_HEADLINES: usize = 5;

pub fn normalize_news(payload: &Value) -> CanonicalSourceRecord {
    let obj = match recognised_object(payload, FIELDS) {
        Ok(obj) => obj,
        Err(reason) => return CanonicalSourceRecord::unavailable(Domain::News, reason),
    };

    let articles: Vec<&Map<String, Value>> = match obj.get("articles") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    };
    let breaking: Vec<&Map<String, Value>> = articles
        .iter()
        .copied()
        .filter(|a| a.get("breaking").and_then(Value::as_bool).unwrap_or(false))
        .collect();

    let article_count = articles.len() as u32;
    let breaking_count = breaking.len() as u32;
    let average_sentiment = aggregate_sentiment(obj).or_else(|| mean_sentiment(&articles));
    let coverage = string(obj, "coverageTrend").and_then(Direction::parse);

    let avg = average_sentiment.unwrap_or(0.0);
    let risk_level = explicit_level(obj).unwrap_or(if avg <= -0.6 && breaking_count >= 3 {
        RiskLevel::Critical
    } else if avg <= -0.4 {
        RiskLevel::High
    } else if avg <= -0.1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    });
    let score = explicit_score(obj)
        .unwrap_or_else(|| (f64::from(article_count) + f64::from(breaking_count) * 5.0).min(100.0));

    let mut indicators: Vec<String> = breaking
        .iter()
        .filter_map(|a| string(a, "title"))
        .take(MAX_HEADLINES)
        .map(|t| format!("Breaking: {t}"))
        .collect();
    if avg <= -0.1 {
        indicators.push(format!("Negative media sentiment ({avg:.2})"));
    }
    if coverage == Some(Direction::Increasing) {
        indicators.push("Rising media coverage".to_string());
    }

    CanonicalSourceRecord::available(
        Domain::News,
        risk_level,
        explicit_confidence(obj).unwrap_or(DEFAULT_CONFIDENCE),
        score,
        indicators,
        SourceDetail::News(NewsDetail {
            article_count,
            breaking_count,
            average_sentiment,
            coverage,
        }),
    )
}

/// `sentiment` is either `{average}` or a bare number.
fn aggregate_sentiment(obj: &Map<String, Value>) -> Option<f64> {
    let raw = match obj.get("sentiment")? {
        Value::Object(s) => number(s, "average"),
        other => value_number(other),
    };
    raw.map(|s| s.clamp(-1.0, 1.0))
}

fn mean_sentiment(articles: &[&Map<String, Value>]) -> Option<f64> {
    let scores: Vec<f64> = articles.iter().filter_map(|a| number(a, "sentiment")).collect();
    if scores.is_empty() {
        return None;
    }
    Some((scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(sentiment: f64, breaking: bool) -> Value {
        json!({"title": "Clashes reported", "sentiment": sentiment, "breaking": breaking})
    }

    #[test]
    fn test_critical_needs_breaking_and_very_negative() {
        let rec = normalize_news(&json!({
            "articles": [article(-0.8, true), article(-0.7, true), article(-0.9, true), article(-0.6, false)]
        }));
        assert_eq!(rec.risk_level, RiskLevel::Critical);
        // 4 articles + 3 breaking * 5
        assert_eq!(rec.score, 19.0);
        assert_eq!(rec.confidence, DEFAULT_CONFIDENCE);
        let detail = rec.news_detail().unwrap();
        assert_eq!(detail.breaking_count, 3);
        assert_eq!(rec.indicators.iter().filter(|i| i.starts_with("Breaking")).count(), 3);
    }

    #[test]
    fn test_negative_without_breaking_is_high() {
        let rec = normalize_news(&json!({
            "articles": [article(-0.8, false)],
            "sentiment": {"average": -0.65}
        }));
        assert_eq!(rec.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_sentiment_thresholds() {
        let level = |avg: f64| normalize_news(&json!({"sentiment": avg})).risk_level;
        assert_eq!(level(-0.4), RiskLevel::High);
        assert_eq!(level(-0.1), RiskLevel::Medium);
        assert_eq!(level(0.0), RiskLevel::Low);
        assert_eq!(level(0.5), RiskLevel::Low);
    }

    #[test]
    fn test_score_capped() {
        let articles: Vec<Value> = (0..30).map(|_| article(-0.2, true)).collect();
        let rec = normalize_news(&json!({ "articles": articles }));
        assert_eq!(rec.score, 100.0);
    }

    #[test]
    fn test_coverage_trend() {
        let rec = normalize_news(&json!({"articles": [], "coverageTrend": "rising"}));
        assert_eq!(rec.news_detail().unwrap().coverage, Some(Direction::Increasing));
        assert!(rec.indicators.contains(&"Rising media coverage".to_string()));
    }
}
