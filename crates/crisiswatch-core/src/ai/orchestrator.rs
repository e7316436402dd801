//! Ordered model chain with timeout, retry and a heuristic safe default.
//!
//! The orchestrator is an explicit state machine:
//!
//! ```text
//! BuildPrompt -> CallModel(i, attempt) -> Parse -> Merge -> Done
//!                  |  failure: retry with backoff, then CallModel(i + 1, 1)
//!                  |  chain exhausted: AllFailed -> Done (safe default)
//! Parse: Valid -> Merge | Repaired -> Merge | Failed -> AllFailed
//! ```
//!
//! Models are tried strictly in configured order and never concurrently.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::merge::{fallback_response, merge};
use super::parse::{parse_response, ModelResponse, ParseOutcome};
use super::prompt::{build_prompt, system_prompt};
use super::transport::{CompletionRequest, ModelTransport};
use crate::domain::{
    AiAnalysis, AnalysisMetadata, AttemptOutcome, CrisisAssessment, ModelAttempt, ParseStatus,
    FALLBACK_MODEL,
};
use crate::metrics::METRICS;
use crate::obs;

/// One entry of the model chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_temperature() -> f32 {
    0.3
}

impl ModelSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// AI chain configuration. `models` is in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub models: Vec<ModelSpec>,
    /// Full chat-completions URL.
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Maximum wall-clock time for a single call (milliseconds).
    pub timeout_ms: u64,
    /// Retries per model (0 = one call per model).
    pub max_retries: u32,
    /// Base delay for linear backoff between retries (milliseconds).
    pub backoff_base_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            models: vec![ModelSpec::new("gpt-4o"), ModelSpec::new("gpt-4o-mini")],
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            timeout_ms: 30_000,
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}

impl AiConfig {
    /// Backoff before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(u64::from(attempt)))
    }

    /// Worst-case time spent on one model that times out on every call:
    /// every attempt's timeout plus every backoff in between.
    pub fn retry_budget(&self) -> Duration {
        let attempts = u64::from(self.max_retries) + 1;
        let retries = u64::from(self.max_retries);
        let backoff_total = self
            .backoff_base_ms
            .saturating_mul(retries.saturating_mul(retries + 1) / 2);
        Duration::from_millis(
            self.timeout_ms
                .saturating_mul(attempts)
                .saturating_add(backoff_total),
        )
    }
}

enum State {
    BuildPrompt,
    CallModel { model: usize, attempt: u32 },
    Parse { model: usize, text: String },
    Merge {
        model: usize,
        response: ModelResponse,
        status: ParseStatus,
    },
    AllFailed { reason: String },
    Done(AiAnalysis),
}

/// Runs the model chain for one assessment at a time.
pub struct AiOrchestrator {
    config: AiConfig,
    transport: Arc<dyn ModelTransport>,
}

impl AiOrchestrator {
    pub fn new(config: AiConfig, transport: Arc<dyn ModelTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Produce an analysis. Never fails: every environmental failure ends
    /// in the heuristic safe default.
    pub async fn analyze(&self, assessment: &CrisisAssessment) -> AiAnalysis {
        let started = Instant::now();
        let region = assessment.region.code();
        let system = system_prompt();
        let mut prompt = String::new();
        let mut attempts: Vec<ModelAttempt> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        let mut state = State::BuildPrompt;
        loop {
            state = match state {
                State::BuildPrompt => match build_prompt(assessment) {
                    Ok(p) if !self.config.models.is_empty() => {
                        prompt = p;
                        State::CallModel { model: 0, attempt: 1 }
                    }
                    Ok(_) => State::AllFailed {
                        reason: "no models configured".to_string(),
                    },
                    Err(e) => State::AllFailed {
                        reason: format!("prompt serialization failed: {e}"),
                    },
                },

                State::CallModel { model, attempt } => {
                    let spec = &self.config.models[model];
                    let request = CompletionRequest {
                        model: spec.id.clone(),
                        system: system.clone(),
                        prompt: prompt.clone(),
                        max_tokens: spec.max_tokens,
                        temperature: spec.temperature,
                    };
                    METRICS.inc_model_calls();
                    let timeout = Duration::from_millis(self.config.timeout_ms);
                    let failure = match tokio::time::timeout(timeout, self.transport.complete(&request)).await {
                        Ok(Ok(text)) => {
                            obs::emit_model_attempt(
                                region,
                                &spec.id,
                                attempt,
                                AttemptOutcome::Success,
                            );
                            attempts.push(ModelAttempt {
                                model: spec.id.clone(),
                                attempt,
                                outcome: AttemptOutcome::Success,
                                detail: None,
                            });
                            Ok(text)
                        }
                        Ok(Err(e)) => Err((AttemptOutcome::Failed, e.to_string())),
                        Err(_elapsed) => Err((
                            AttemptOutcome::Timeout,
                            format!("no response within {}ms", self.config.timeout_ms),
                        )),
                    };
                    match failure {
                        Ok(text) => State::Parse { model, text },
                        Err((outcome, detail)) => {
                            obs::emit_model_attempt(region, &spec.id, attempt, outcome);
                            METRICS.inc_model_failures();
                            obs::emit_model_failure(region, &spec.id, attempt, &detail);
                            attempts.push(ModelAttempt {
                                model: spec.id.clone(),
                                attempt,
                                outcome,
                                detail: Some(detail),
                            });
                            self.after_failure(model, attempt).await
                        }
                    }
                }

                State::Parse { model, text } => match parse_response(&text) {
                    ParseOutcome::Valid(response) => State::Merge {
                        model,
                        response,
                        status: ParseStatus::Valid,
                    },
                    ParseOutcome::Repaired(response, repair_warnings) => {
                        METRICS.inc_repaired();
                        warnings.extend(repair_warnings);
                        State::Merge {
                            model,
                            response,
                            status: ParseStatus::Repaired,
                        }
                    }
                    ParseOutcome::Failed(reason) => State::AllFailed {
                        reason: format!(
                            "response from {} could not be parsed or repaired: {reason}",
                            self.config.models[model].id
                        ),
                    },
                },

                State::Merge {
                    model,
                    response,
                    status,
                } => {
                    let metadata = AnalysisMetadata {
                        model_used: self.config.models[model].id.clone(),
                        parse_status: status,
                        attempts: std::mem::take(&mut attempts),
                        warnings: std::mem::take(&mut warnings),
                        generated_at: Utc::now(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    };
                    State::Done(merge(assessment, response, metadata))
                }

                State::AllFailed { reason } => {
                    METRICS.inc_fallbacks();
                    warnings.push(reason);
                    let metadata = AnalysisMetadata {
                        model_used: FALLBACK_MODEL.to_string(),
                        parse_status: ParseStatus::Fallback,
                        attempts: std::mem::take(&mut attempts),
                        warnings: std::mem::take(&mut warnings),
                        generated_at: Utc::now(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    };
                    State::Done(merge(assessment, fallback_response(assessment), metadata))
                }

                State::Done(analysis) => {
                    obs::emit_analysis_completed(
                        region,
                        &analysis.metadata.model_used,
                        analysis.metadata.parse_status,
                        analysis.metadata.attempts.len(),
                        analysis.metadata.elapsed_ms,
                    );
                    return analysis;
                }
            };
        }
    }

    /// Retry the same model after a backoff, or move down the chain.
    async fn after_failure(&self, model: usize, attempt: u32) -> State {
        if attempt <= self.config.max_retries {
            tokio::time::sleep(self.config.backoff(attempt)).await;
            State::CallModel {
                model,
                attempt: attempt + 1,
            }
        } else if model + 1 < self.config.models.len() {
            State::CallModel {
                model: model + 1,
                attempt: 1,
            }
        } else {
            State::AllFailed {
                reason: format!(
                    "all {} configured models failed",
                    self.config.models.len()
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_default() {
        let cfg = AiConfig::default();
        assert_eq!(cfg.timeout_ms, 30_000);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.backoff_base_ms, 1_000);
        assert_eq!(cfg.models.len(), 2);
    }

    #[test]
    fn test_linear_backoff() {
        let cfg = AiConfig {
            backoff_base_ms: 250,
            ..AiConfig::default()
        };
        assert_eq!(cfg.backoff(1), Duration::from_millis(250));
        assert_eq!(cfg.backoff(2), Duration::from_millis(500));
        assert_eq!(cfg.backoff(3), Duration::from_millis(750));
    }

    #[test]
    fn test_retry_budget() {
        let cfg = AiConfig {
            timeout_ms: 1_000,
            max_retries: 2,
            backoff_base_ms: 100,
            ..AiConfig::default()
        };
        // three timeouts + 100ms + 200ms of backoff
        assert_eq!(cfg.retry_budget(), Duration::from_millis(3_300));

        let no_retry = AiConfig {
            max_retries: 0,
            ..cfg
        };
        assert_eq!(no_retry.retry_budget(), Duration::from_millis(1_000));
    }

    #[test]
    fn test_retry_budget_saturates() {
        let cfg = AiConfig {
            timeout_ms: u64::MAX,
            max_retries: u32::MAX,
            backoff_base_ms: u64::MAX,
            ..AiConfig::default()
        };
        assert_eq!(cfg.retry_budget(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_model_spec_serde_defaults() {
        let spec: ModelSpec = serde_json::from_str(r#"{"id": "backup"}"#).unwrap();
        assert_eq!(spec, ModelSpec::new("backup"));
    }
}
