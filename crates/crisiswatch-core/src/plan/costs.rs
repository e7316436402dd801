//! Per-person cost tables and phase durations.
//!
//! Rates are USD per person per unit of time: emergency per day,
//! stabilization per month, integration per year.

use serde::{Deserialize, Serialize};

use crate::domain::{CrisisError, DurationUnit, PhaseDuration, PhaseKind, Result};

/// Share of the operational cost added as overhead.
pub const OVERHEAD_RATE: f64 = 0.15;

/// Share of the operational cost held as contingency.
pub const CONTINGENCY_RATE: f64 = 0.10;

/// Cost of responding after the fact relative to the planned response.
pub const REACTIVE_MULTIPLIER: f64 = 1.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyCategory {
    Food,
    WaterSanitation,
    Shelter,
    Health,
    Protection,
    Logistics,
}

impl EmergencyCategory {
    pub const ALL: [EmergencyCategory; 6] = [
        Self::Food,
        Self::WaterSanitation,
        Self::Shelter,
        Self::Health,
        Self::Protection,
        Self::Logistics,
    ];

    pub fn daily_rate(self) -> f64 {
        match self {
            Self::Food => 2.50,
            Self::WaterSanitation => 0.75,
            Self::Shelter => 1.25,
            Self::Health => 1.00,
            Self::Protection => 0.50,
            Self::Logistics => 0.75,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::WaterSanitation => "Water and sanitation",
            Self::Shelter => "Shelter",
            Self::Health => "Health",
            Self::Protection => "Protection",
            Self::Logistics => "Logistics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilizationCategory {
    Food,
    Shelter,
    Health,
    Education,
    Livelihoods,
    Protection,
}

impl StabilizationCategory {
    pub const ALL: [StabilizationCategory; 6] = [
        Self::Food,
        Self::Shelter,
        Self::Health,
        Self::Education,
        Self::Livelihoods,
        Self::Protection,
    ];

    pub fn monthly_rate(self) -> f64 {
        match self {
            Self::Food => 45.0,
            Self::Shelter => 30.0,
            Self::Health => 20.0,
            Self::Education => 15.0,
            Self::Livelihoods => 25.0,
            Self::Protection => 10.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Shelter => "Shelter",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Livelihoods => "Livelihoods",
            Self::Protection => "Protection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationCategory {
    Housing,
    Education,
    Livelihoods,
    Health,
    SocialCohesion,
}

impl IntegrationCategory {
    pub const ALL: [IntegrationCategory; 5] = [
        Self::Housing,
        Self::Education,
        Self::Livelihoods,
        Self::Health,
        Self::SocialCohesion,
    ];

    pub fn yearly_rate(self) -> f64 {
        match self {
            Self::Housing => 600.0,
            Self::Education => 300.0,
            Self::Livelihoods => 500.0,
            Self::Health => 250.0,
            Self::SocialCohesion => 100.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Education => "Education",
            Self::Livelihoods => "Livelihoods",
            Self::Health => "Health",
            Self::SocialCohesion => "Social cohesion",
        }
    }
}

/// `(label, rate)` rows for a phase, rate per person per phase unit.
pub fn rate_table(phase: PhaseKind) -> Vec<(&'static str, f64)> {
    match phase {
        PhaseKind::Emergency => EmergencyCategory::ALL
            .iter()
            .map(|c| (c.label(), c.daily_rate()))
            .collect(),
        PhaseKind::Stabilization => StabilizationCategory::ALL
            .iter()
            .map(|c| (c.label(), c.monthly_rate()))
            .collect(),
        PhaseKind::Integration => IntegrationCategory::ALL
            .iter()
            .map(|c| (c.label(), c.yearly_rate()))
            .collect(),
    }
}

/// Sum of a phase's per-person rates.
pub fn unit_rate(phase: PhaseKind) -> f64 {
    rate_table(phase).iter().map(|(_, r)| r).sum()
}

/// Length of each phase in its own unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    pub emergency_days: f64,
    pub stabilization_months: f64,
    pub integration_years: f64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            emergency_days: 28.0,
            stabilization_months: 6.0,
            integration_years: 1.5,
        }
    }
}

impl PhaseDurations {
    pub fn duration(&self, phase: PhaseKind) -> PhaseDuration {
        match phase {
            PhaseKind::Emergency => PhaseDuration {
                value: self.emergency_days,
                unit: DurationUnit::Days,
            },
            PhaseKind::Stabilization => PhaseDuration {
                value: self.stabilization_months,
                unit: DurationUnit::Months,
            },
            PhaseKind::Integration => PhaseDuration {
                value: self.integration_years,
                unit: DurationUnit::Years,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        for phase in PhaseKind::ALL {
            let d = self.duration(phase).value;
            if !d.is_finite() || d <= 0.0 {
                return Err(CrisisError::InvalidConfig(format!(
                    "{phase} phase duration must be positive, got {d}"
                )));
            }
        }
        Ok(())
    }
}

/// Cost of one phase for `population` people.
pub fn phase_cost(phase: PhaseKind, population: u64, durations: &PhaseDurations) -> f64 {
    population as f64 * unit_rate(phase) * durations.duration(phase).value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_rates() {
        assert_eq!(unit_rate(PhaseKind::Emergency), 6.75);
        assert_eq!(unit_rate(PhaseKind::Stabilization), 145.0);
        assert_eq!(unit_rate(PhaseKind::Integration), 1750.0);
    }

    #[test]
    fn test_phase_cost_scales_with_population_and_duration() {
        let d = PhaseDurations::default();
        assert_eq!(phase_cost(PhaseKind::Emergency, 10_000, &d), 1_890_000.0);
        assert_eq!(phase_cost(PhaseKind::Stabilization, 100, &d), 87_000.0);
        assert_eq!(phase_cost(PhaseKind::Integration, 2, &d), 5_250.0);
    }

    #[test]
    fn test_duration_validation() {
        assert!(PhaseDurations::default().validate().is_ok());
        let bad = PhaseDurations {
            stabilization_months: 0.0,
            ..PhaseDurations::default()
        };
        assert!(matches!(bad.validate(), Err(CrisisError::InvalidConfig(_))));
    }
}
