//! Prompt construction.

use crate::domain::CrisisAssessment;

/// Response shape the model is asked to produce.
pub const RESPONSE_SCHEMA: &str = r#"{
  "aiRiskAssessment": "CRITICAL | HIGH | MEDIUM | LOW",
  "confidence": 0.0,
  "reasoning": "string",
  "displacementPrediction": {
    "likelihood": "VERY_HIGH | HIGH | MEDIUM | LOW | VERY_LOW",
    "timeframe": "string",
    "estimatedPopulation": 0,
    "primaryTriggers": ["string"],
    "likelyDestinations": ["string"],
    "displacementType": "INTERNAL | CROSS_BORDER | MIXED"
  },
  "criticalFactors": ["string"],
  "earlyWarning": {
    "triggered": false,
    "urgency": "IMMEDIATE | HIGH | MODERATE | LOW",
    "signals": ["string"]
  },
  "recommendations": {
    "immediate": ["string"],
    "shortTerm": ["string"],
    "longTerm": ["string"]
  }
}"#;

pub fn system_prompt() -> String {
    format!(
        "You are a humanitarian crisis analyst. You receive a heuristic risk \
         assessment fused from conflict, economic, climate and news sources, \
         and you return your own independent judgment.\n\n\
         Respond with a single JSON object and nothing else. Required fields:\n{RESPONSE_SCHEMA}\n\n\
         `confidence` is a number between 0 and 1. `reasoning` must not be empty."
    )
}

/// User prompt embedding the whole assessment.
pub fn build_prompt(assessment: &CrisisAssessment) -> serde_json::Result<String> {
    let body = serde_json::to_string_pretty(assessment)?;
    Ok(format!(
        "Region: {region}\n\
         Heuristic overall risk: {risk} (score {score:.1}, confidence {conf:.2}, data quality {quality:?})\n\
         Available sources: {available}/4\n\n\
         Full assessment:\n{body}\n\n\
         Return the JSON object described in the instructions.",
        region = assessment.region,
        risk = assessment.overall_risk,
        score = assessment.risk_score,
        conf = assessment.confidence,
        quality = assessment.data_quality,
        available = assessment.available_sources(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_assessment;
    use crate::displacement::DisplacementConstants;
    use crate::domain::{Region, SourceSet};

    #[test]
    fn test_prompt_embeds_assessment_json() {
        let assessment = build_assessment(
            Region::parse("HTI").unwrap(),
            SourceSet::empty(),
            &DisplacementConstants::default(),
        );
        let prompt = build_prompt(&assessment).unwrap();
        assert!(prompt.contains("Region: HTI"));
        assert!(prompt.contains("\"overallRisk\": \"UNKNOWN\""));
        assert!(prompt.contains(&assessment.id.to_string()));
    }

    #[test]
    fn test_system_prompt_lists_required_fields() {
        let sys = system_prompt();
        for field in ["aiRiskAssessment", "confidence", "reasoning", "displacementPrediction"] {
            assert!(sys.contains(field), "missing {field}");
        }
    }
}
