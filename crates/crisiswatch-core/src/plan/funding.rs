//! Funding split across donor channels.
//!
//! The default percentages are illustrative, not derived from context.
//! They are configuration, validated to sum to one.

use serde::{Deserialize, Serialize};

use crate::domain::{CrisisError, FundingStrategy, Result};

const SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingSplit {
    pub bilateral: f64,
    pub multilateral: f64,
    pub private: f64,
    pub host_country: f64,
}

impl Default for FundingSplit {
    fn default() -> Self {
        Self {
            bilateral: 0.40,
            multilateral: 0.35,
            private: 0.15,
            host_country: 0.10,
        }
    }
}

impl FundingSplit {
    fn shares(&self) -> [f64; 4] {
        [self.bilateral, self.multilateral, self.private, self.host_country]
    }

    pub fn validate(&self) -> Result<()> {
        let shares = self.shares();
        let sum: f64 = shares.iter().sum();
        if shares.iter().any(|s| !s.is_finite() || *s < 0.0) || (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(CrisisError::InvalidFundingSplit { sum });
        }
        Ok(())
    }

    pub fn apply(&self, total: f64) -> FundingStrategy {
        FundingStrategy {
            bilateral: total * self.bilateral,
            multilateral: total * self.multilateral,
            private: total * self.private,
            host_country: total * self.host_country,
        }
    }
}
