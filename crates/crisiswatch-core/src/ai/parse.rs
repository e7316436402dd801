//! Two-stage parsing of model output.
//!
//! Stage one is a strict JSON parse plus validation of the required fields.
//! When that fails, stage two pulls the essentials out of the raw text with
//! regular expressions and degrades the confidence. The outcome is a tagged
//! value; nothing here returns an error.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::{
    AiRisk, DisplacementPrediction, DisplacementType, EarlyWarning, Likelihood, Recommendations,
    Urgency,
};

/// Multiplier applied to the confidence of a repaired response.
pub const REPAIR_CONFIDENCE_FACTOR: f64 = 0.75;

/// Confidence assumed when a repaired response states none.
const REPAIR_DEFAULT_CONFIDENCE: f64 = 0.5;

const MAX_REASONING_EXCERPT: usize = 400;

/// The model's answer once read into typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub ai_risk: AiRisk,
    pub confidence: f64,
    pub reasoning: String,
    pub displacement: DisplacementPrediction,
    pub critical_factors: Vec<String>,
    pub early_warning: EarlyWarning,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Valid(ModelResponse),
    Repaired(ModelResponse, Vec<String>),
    Failed(String),
}

/// Remove surrounding Markdown code fences, with or without a language tag.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(nl) => &rest[nl + 1..],
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

pub fn parse_response(raw: &str) -> ParseOutcome {
    let text = strip_fences(raw);
    let problem = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => match validate(&obj) {
            Ok(resp) => return ParseOutcome::Valid(resp),
            Err(problem) => return repair_object(&obj, text, problem),
        },
        Ok(_) => "response is not a JSON object".to_string(),
        Err(e) => format!("response is not valid JSON: {e}"),
    };
    repair(text, problem)
}

fn validate(obj: &Map<String, Value>) -> Result<ModelResponse, String> {
    let ai_risk = obj
        .get("aiRiskAssessment")
        .and_then(Value::as_str)
        .and_then(AiRisk::parse)
        .ok_or("aiRiskAssessment missing or not CRITICAL/HIGH/MEDIUM/LOW")?;
    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| (0.0..=1.0).contains(c))
        .ok_or("confidence missing or outside [0, 1]")?;
    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or("reasoning missing or empty")?
        .to_string();
    let displacement = match obj.get("displacementPrediction") {
        Some(Value::Object(d)) => read_displacement(d, ai_risk),
        _ => return Err("displacementPrediction missing".to_string()),
    };

    Ok(ModelResponse {
        ai_risk,
        confidence,
        reasoning,
        displacement,
        critical_factors: strings(obj.get("criticalFactors")),
        early_warning: read_early_warning(obj.get("earlyWarning"), ai_risk),
        recommendations: read_recommendations(obj.get("recommendations")),
    })
}

fn read_displacement(d: &Map<String, Value>, risk: AiRisk) -> DisplacementPrediction {
    DisplacementPrediction {
        likelihood: d
            .get("likelihood")
            .and_then(Value::as_str)
            .and_then(Likelihood::parse)
            .unwrap_or_else(|| likelihood_for(risk)),
        timeframe: d
            .get("timeframe")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        estimated_population: d
            .get("estimatedPopulation")
            .and_then(population_value)
            .unwrap_or(0),
        primary_triggers: strings(d.get("primaryTriggers")),
        likely_destinations: strings(d.get("likelyDestinations")),
        displacement_type: d
            .get("displacementType")
            .and_then(Value::as_str)
            .and_then(DisplacementType::parse)
            .unwrap_or(DisplacementType::Mixed),
    }
}

fn read_early_warning(value: Option<&Value>, risk: AiRisk) -> EarlyWarning {
    let obj = value.and_then(Value::as_object);
    let urgency = obj
        .and_then(|o| o.get("urgency"))
        .and_then(Value::as_str)
        .and_then(Urgency::parse)
        .unwrap_or_else(|| urgency_for(risk));
    EarlyWarning {
        triggered: obj
            .and_then(|o| o.get("triggered"))
            .and_then(Value::as_bool)
            .unwrap_or(matches!(risk, AiRisk::Critical | AiRisk::High)),
        urgency,
        signals: strings(obj.and_then(|o| o.get("signals"))),
    }
}

fn read_recommendations(value: Option<&Value>) -> Recommendations {
    let obj = value.and_then(Value::as_object);
    Recommendations {
        immediate: strings(obj.and_then(|o| o.get("immediate"))),
        short_term: strings(obj.and_then(|o| o.get("shortTerm"))),
        long_term: strings(obj.and_then(|o| o.get("longTerm"))),
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn population_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64),
        Value::String(s) => parse_population(s),
        _ => None,
    }
}

fn parse_population(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub(crate) fn likelihood_for(risk: AiRisk) -> Likelihood {
    match risk {
        AiRisk::Critical => Likelihood::VeryHigh,
        AiRisk::High => Likelihood::High,
        AiRisk::Medium => Likelihood::Medium,
        AiRisk::Low => Likelihood::Low,
    }
}

pub(crate) fn urgency_for(risk: AiRisk) -> Urgency {
    match risk {
        AiRisk::Critical => Urgency::Immediate,
        AiRisk::High => Urgency::High,
        AiRisk::Medium => Urgency::Moderate,
        AiRisk::Low => Urgency::Low,
    }
}

fn risk_keyed_regex() -> Option<&'static Regex> {
    static INSTANCE: OnceLock<Option<Regex>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| {
            Regex::new(r#"(?i)risk[_ ]?(?:assessment|level)?"?\s*[:=]\s*"?(critical|high|medium|low)\b"#)
                .ok()
        })
        .as_ref()
}

fn risk_word_regex() -> Option<&'static Regex> {
    static INSTANCE: OnceLock<Option<Regex>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| Regex::new(r"(?i)\b(critical|high|medium|low)\b").ok())
        .as_ref()
}

fn confidence_regex() -> Option<&'static Regex> {
    static INSTANCE: OnceLock<Option<Regex>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| Regex::new(r#"(?i)confidence"?\s*(?:[:=]|of|is)?\s*"?(\d+(?:\.\d+)?)\s*(%)?"#).ok())
        .as_ref()
}

fn likelihood_regex() -> Option<&'static Regex> {
    static INSTANCE: OnceLock<Option<Regex>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| {
            Regex::new(r#"(?i)likelihood"?\s*(?:[:=]|is)?\s*"?(very[ _-]high|very[ _-]low|high|medium|moderate|low)\b"#)
                .ok()
        })
        .as_ref()
}

fn population_regex() -> Option<&'static Regex> {
    static INSTANCE: OnceLock<Option<Regex>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| {
            Regex::new(r#"(?i)(?:population"?\s*[:=]?\s*"?(\d[\d,]*)|(\d[\d,]*)\s+(?:people|persons|individuals))"#)
                .ok()
        })
        .as_ref()
}

fn capture<'t>(re: Option<&Regex>, text: &'t str, group: usize) -> Option<&'t str> {
    re?.captures(text)?.get(group).map(|m| m.as_str())
}

/// Read a stated confidence. Whole numbers above 1 are percentages;
/// anything else outside [0, 1] is clamped.
fn confidence_value(value: &Value) -> Option<f64> {
    let (number, percent) = match value {
        Value::Number(n) => (n.as_f64()?, false),
        Value::String(s) => {
            let trimmed = s.trim();
            let percent = trimmed.ends_with('%');
            (trimmed.trim_end_matches('%').trim().parse().ok()?, percent)
        }
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    let unit = if percent || (number > 1.0 && number <= 100.0 && number.fract() == 0.0) {
        number / 100.0
    } else {
        number
    };
    Some(unit.clamp(0.0, 1.0))
}

/// Field-by-field repair of a JSON object that failed validation. Fields
/// that read cleanly are kept; the rest are defaulted from the risk level.
fn repair_object(obj: &Map<String, Value>, text: &str, problem: String) -> ParseOutcome {
    let mut warnings = vec![format!("strict parse failed: {problem}")];

    let ai_risk = match obj
        .get("aiRiskAssessment")
        .and_then(Value::as_str)
        .and_then(AiRisk::parse)
    {
        Some(risk) => risk,
        None => {
            let word = capture(risk_keyed_regex(), text, 1)
                .or_else(|| capture(risk_word_regex(), text, 1));
            let Some(risk) = word.and_then(AiRisk::parse) else {
                return ParseOutcome::Failed(format!("{problem}; no risk level found in response"));
            };
            warnings.push(format!("risk level {risk} recovered by pattern match"));
            risk
        }
    };

    let confidence = match obj.get("confidence").and_then(confidence_value) {
        Some(c) => c,
        None => {
            warnings.push("no usable confidence; assumed 0.5".to_string());
            REPAIR_DEFAULT_CONFIDENCE
        }
    };

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            warnings.push("no reasoning given".to_string());
            "Model response was missing its reasoning.".to_string()
        });

    let displacement = match obj.get("displacementPrediction") {
        Some(Value::Object(d)) => read_displacement(d, ai_risk),
        _ => {
            warnings.push("no displacement prediction; derived from risk".to_string());
            DisplacementPrediction {
                likelihood: likelihood_for(ai_risk),
                timeframe: String::new(),
                estimated_population: 0,
                primary_triggers: Vec::new(),
                likely_destinations: Vec::new(),
                displacement_type: DisplacementType::Mixed,
            }
        }
    };

    let response = ModelResponse {
        ai_risk,
        confidence: confidence * REPAIR_CONFIDENCE_FACTOR,
        reasoning,
        displacement,
        critical_factors: strings(obj.get("criticalFactors")),
        early_warning: read_early_warning(obj.get("earlyWarning"), ai_risk),
        recommendations: read_recommendations(obj.get("recommendations")),
    };
    ParseOutcome::Repaired(response, warnings)
}

/// Best-effort extraction from text that failed strict validation.
fn repair(text: &str, problem: String) -> ParseOutcome {
    let mut warnings = vec![format!("strict parse failed: {problem}")];

    let risk_word =
        capture(risk_keyed_regex(), text, 1).or_else(|| capture(risk_word_regex(), text, 1));
    let Some(ai_risk) = risk_word.and_then(AiRisk::parse) else {
        return ParseOutcome::Failed(format!("{problem}; no risk level found in response text"));
    };
    warnings.push(format!("risk level {ai_risk} recovered by pattern match"));

    let confidence = match confidence_regex().and_then(|re| re.captures(text)) {
        Some(caps) => {
            let value: f64 = caps[1].parse().unwrap_or(REPAIR_DEFAULT_CONFIDENCE);
            let unit = if caps.get(2).is_some() || value > 1.0 {
                value / 100.0
            } else {
                value
            };
            unit.clamp(0.0, 1.0)
        }
        None => {
            warnings.push("no confidence found; assumed 0.5".to_string());
            REPAIR_DEFAULT_CONFIDENCE
        }
    };

    let likelihood = capture(likelihood_regex(), text, 1)
        .and_then(Likelihood::parse)
        .unwrap_or_else(|| {
            warnings.push("no displacement likelihood found; derived from risk".to_string());
            likelihood_for(ai_risk)
        });

    let estimated_population = population_regex()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .and_then(|m| parse_population(m.as_str()))
        .unwrap_or(0);

    let excerpt: String = text.chars().take(MAX_REASONING_EXCERPT).collect();
    let response = ModelResponse {
        ai_risk,
        confidence: confidence * REPAIR_CONFIDENCE_FACTOR,
        reasoning: format!("Recovered from unstructured model output: {}", excerpt.trim()),
        displacement: DisplacementPrediction {
            likelihood,
            timeframe: String::new(),
            estimated_population,
            primary_triggers: Vec::new(),
            likely_destinations: Vec::new(),
            displacement_type: DisplacementType::Mixed,
        },
        critical_factors: Vec::new(),
        early_warning: EarlyWarning {
            triggered: matches!(ai_risk, AiRisk::Critical | AiRisk::High),
            urgency: urgency_for(ai_risk),
            signals: Vec::new(),
        },
        recommendations: Recommendations::default(),
    };
    ParseOutcome::Repaired(response, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "aiRiskAssessment": "HIGH",
        "confidence": 0.8,
        "reasoning": "Escalating violence and currency collapse.",
        "displacementPrediction": {
            "likelihood": "HIGH",
            "timeframe": "1-3 months",
            "estimatedPopulation": 25000,
            "primaryTriggers": ["conflict"],
            "likelyDestinations": ["Chad"],
            "displacementType": "CROSS_BORDER"
        },
        "criticalFactors": ["fighting near Khartoum"],
        "earlyWarning": {"triggered": true, "urgency": "HIGH", "signals": ["troop movements"]},
        "recommendations": {"immediate": ["pre-position food"], "shortTerm": [], "longTerm": []}
    }"#;

    #[test]
    fn test_valid_response() {
        let ParseOutcome::Valid(resp) = parse_response(VALID) else {
            panic!("expected valid");
        };
        assert_eq!(resp.ai_risk, AiRisk::High);
        assert_eq!(resp.confidence, 0.8);
        assert_eq!(resp.displacement.estimated_population, 25_000);
        assert_eq!(resp.displacement.displacement_type, DisplacementType::CrossBorder);
        assert_eq!(resp.early_warning.urgency, Urgency::High);
        assert_eq!(resp.recommendations.immediate, vec!["pre-position food"]);
    }

    #[test]
    fn test_fenced_response_is_valid() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(matches!(parse_response(&fenced), ParseOutcome::Valid(_)));
    }

    #[test]
    fn test_strip_fences_variants() {
        assert_eq!(strip_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_fences("```json\n{}```"), "{}");
    }

    #[test]
    fn test_percentage_confidence_is_repaired() {
        let raw = VALID.replace("\"confidence\": 0.8", "\"confidence\": 80");
        let ParseOutcome::Repaired(resp, warnings) = parse_response(&raw) else {
            panic!("expected repaired");
        };
        assert_eq!(resp.ai_risk, AiRisk::High);
        assert!((resp.confidence - 0.8 * REPAIR_CONFIDENCE_FACTOR).abs() < 1e-9);
        assert!(warnings[0].contains("confidence"));
    }

    #[test]
    fn test_prose_response_is_repaired() {
        let raw = "Overall risk: CRITICAL. Confidence is 70%. Displacement likelihood: very high, \
                   with roughly 120,000 people expected to move.";
        let ParseOutcome::Repaired(resp, warnings) = parse_response(raw) else {
            panic!("expected repaired");
        };
        assert_eq!(resp.ai_risk, AiRisk::Critical);
        assert!((resp.confidence - 0.7 * REPAIR_CONFIDENCE_FACTOR).abs() < 1e-9);
        assert_eq!(resp.displacement.likelihood, Likelihood::VeryHigh);
        assert_eq!(resp.displacement.estimated_population, 120_000);
        assert_eq!(resp.early_warning.urgency, Urgency::Immediate);
        assert!(!warnings.is_empty());
        assert!(resp.reasoning.starts_with("Recovered from unstructured model output"));
    }

    #[test]
    fn test_out_of_range_confidence_keeps_other_fields() {
        let raw = VALID.replace("\"confidence\": 0.8", "\"confidence\": 1.5");
        let ParseOutcome::Repaired(resp, warnings) = parse_response(&raw) else {
            panic!("expected repaired");
        };
        assert_eq!(resp.ai_risk, AiRisk::High);
        assert!((resp.confidence - REPAIR_CONFIDENCE_FACTOR).abs() < 1e-9);
        assert_eq!(resp.reasoning, "Escalating violence and currency collapse.");
        assert_eq!(resp.critical_factors, vec!["fighting near Khartoum"]);
        assert_eq!(resp.recommendations.immediate, vec!["pre-position food"]);
        assert_eq!(resp.early_warning.signals, vec!["troop movements"]);
        assert_eq!(resp.displacement.estimated_population, 25_000);
        assert_eq!(resp.displacement.likely_destinations, vec!["Chad"]);
        assert!(warnings[0].contains("confidence"));
    }

    #[test]
    fn test_object_without_risk_field_uses_text() {
        let raw = r#"{"summary": "risk level: medium", "confidence": 0.4}"#;
        let ParseOutcome::Repaired(resp, _) = parse_response(raw) else {
            panic!("expected repaired");
        };
        assert_eq!(resp.ai_risk, AiRisk::Medium);
        assert!((resp.confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_unrecoverable_response_fails() {
        let outcome = parse_response("I cannot help with that request.");
        assert!(matches!(outcome, ParseOutcome::Failed(_)));
    }

    #[test]
    fn test_missing_displacement_triggers_repair() {
        let raw = r#"{"aiRiskAssessment": "LOW", "confidence": 0.6, "reasoning": "calm"}"#;
        let ParseOutcome::Repaired(resp, warnings) = parse_response(raw) else {
            panic!("expected repaired");
        };
        assert_eq!(resp.ai_risk, AiRisk::Low);
        assert!(warnings[0].contains("displacementPrediction"));
        assert!((resp.confidence - 0.45).abs() < 1e-9);
    }
}
