//! Pipeline configuration: defaults, TOML files and `CRISISWATCH_*`
//! environment overrides.
//!
//! Resolution order is defaults, then TOML (if given), then environment.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::{AiConfig, ModelSpec};
use crate::displacement::DisplacementConstants;
use crate::domain::{CrisisError, Result};
use crate::plan::{FundingSplit, PhaseDurations};

/// Cache windows in seconds. Zero disables the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub assessment_ttl_secs: u64,
    pub analysis_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            assessment_ttl_secs: 15 * 60,
            analysis_ttl_secs: 60 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ai: AiConfig,
    pub cache: CacheConfig,
    /// Per-source fetch timeout (milliseconds).
    pub source_timeout_ms: u64,
    pub displacement: DisplacementConstants,
    pub funding: FundingSplit,
    pub plan: PhaseDurations,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            cache: CacheConfig::default(),
            source_timeout_ms: 10_000,
            displacement: DisplacementConstants::default(),
            funding: FundingSplit::default(),
            plan: PhaseDurations::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| CrisisError::InvalidConfig(format!("parse TOML failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&content)
    }

    /// Overlay `CRISISWATCH_*` variables resolved through `lookup`, then
    /// validate the result.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(models) = lookup("CRISISWATCH_AI_MODELS") {
            self.ai.models = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(ModelSpec::new)
                .collect();
        }
        if let Some(endpoint) = lookup("CRISISWATCH_AI_ENDPOINT") {
            self.ai.endpoint = endpoint;
        }
        if let Some(key) = lookup("CRISISWATCH_AI_API_KEY") {
            self.ai.api_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        set_parsed(&lookup, "CRISISWATCH_AI_TIMEOUT_MS", &mut self.ai.timeout_ms)?;
        set_parsed(&lookup, "CRISISWATCH_AI_MAX_RETRIES", &mut self.ai.max_retries)?;
        set_parsed(&lookup, "CRISISWATCH_AI_BACKOFF_MS", &mut self.ai.backoff_base_ms)?;
        set_parsed(&lookup, "CRISISWATCH_SOURCE_TIMEOUT_MS", &mut self.source_timeout_ms)?;
        set_parsed(
            &lookup,
            "CRISISWATCH_ASSESSMENT_TTL_SECS",
            &mut self.cache.assessment_ttl_secs,
        )?;
        set_parsed(
            &lookup,
            "CRISISWATCH_ANALYSIS_TTL_SECS",
            &mut self.cache.analysis_ttl_secs,
        )?;
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.ai.timeout_ms == 0 {
            return Err(CrisisError::InvalidConfig(
                "ai.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.source_timeout_ms == 0 {
            return Err(CrisisError::InvalidConfig(
                "source_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(m) = self.ai.models.iter().find(|m| m.id.trim().is_empty()) {
            return Err(CrisisError::InvalidConfig(format!(
                "model identifier must not be blank (got {:?})",
                m.id
            )));
        }
        let d = &self.displacement;
        let multipliers = [
            d.conflict_per_point,
            d.economic_critical_per_point,
            d.economic_high_per_point,
            d.critical_hazard_flat,
        ];
        if multipliers.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(CrisisError::InvalidConfig(
                "displacement constants must be finite and non-negative".to_string(),
            ));
        }
        self.funding.validate()?;
        self.plan.validate()
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.ai.api_key.is_some() {
            copy.ai.api_key = Some("***".to_string());
        }
        copy
    }
}

fn set_parsed<T, F>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| CrisisError::InvalidConfig(format!("{key}={raw:?}: {e}")))?;
    }
    Ok(())
}
