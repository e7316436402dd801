//! Costed humanitarian response plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::Region;
use super::risk::AiRisk;

/// Response phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseKind {
    Emergency,
    Stabilization,
    Integration,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 3] = [
        PhaseKind::Emergency,
        PhaseKind::Stabilization,
        PhaseKind::Integration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Stabilization => "stabilization",
            Self::Integration => "integration",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which phases a plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    #[default]
    Comprehensive,
    EmergencyOnly,
    Recovery,
}

impl PlanType {
    pub fn includes(self, phase: PhaseKind) -> bool {
        match self {
            Self::Comprehensive => true,
            Self::EmergencyOnly => phase == PhaseKind::Emergency,
            Self::Recovery => phase != PhaseKind::Emergency,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let norm = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "COMPREHENSIVE" | "FULL" => Some(Self::Comprehensive),
            "EMERGENCY_ONLY" | "EMERGENCY" => Some(Self::EmergencyOnly),
            "RECOVERY" => Some(Self::Recovery),
            _ => None,
        }
    }
}

impl std::str::FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("unknown plan type {s:?} (expected comprehensive, emergency-only or recovery)")
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Days,
    Months,
    Years,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDuration {
    pub value: f64,
    pub unit: DurationUnit,
}

impl PhaseDuration {
    pub fn label(&self) -> String {
        let unit = match self.unit {
            DurationUnit::Days => "days",
            DurationUnit::Months => "months",
            DurationUnit::Years => "years",
        };
        if self.value.fract() == 0.0 {
            format!("{} {unit}", self.value as i64)
        } else {
            format!("{} {unit}", self.value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPhase {
    pub phase: PhaseKind,
    pub duration_label: String,
    pub duration: PhaseDuration,
    pub objectives: Vec<String>,
    pub activities: Vec<String>,
    pub resource_needs: Vec<String>,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub emergency: f64,
    pub stabilization: f64,
    pub integration: f64,
    pub overhead: f64,
    pub contingency: f64,
    pub total: f64,
}

impl CostBreakdown {
    pub fn operational(&self) -> f64 {
        self.emergency + self.stabilization + self.integration
    }
}

/// Preventive (plan as costed) against reactive (response after the fact).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComparison {
    pub preventive: f64,
    pub reactive: f64,
    pub savings: f64,
    pub savings_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysis {
    pub breakdown: CostBreakdown,
    pub comparison: CostComparison,
    pub cost_per_person: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHeadcount {
    pub role: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStaffing {
    pub phase: PhaseKind,
    pub roles: Vec<RoleHeadcount>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingPlan {
    pub phases: Vec<PhaseStaffing>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingStrategy {
    pub bilateral: f64,
    pub multilateral: f64,
    pub private: f64,
    pub host_country: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePlan {
    pub id: Uuid,
    pub region: Region,
    pub plan_type: PlanType,
    pub target_population: u64,
    pub risk_level: AiRisk,
    pub generated_at: DateTime<Utc>,
    pub phases: Vec<PlanPhase>,
    pub cost_analysis: CostAnalysis,
    pub staffing: StaffingPlan,
    pub funding_strategy: FundingStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_type_phase_inclusion() {
        assert!(PlanType::Comprehensive.includes(PhaseKind::Integration));
        assert!(PlanType::EmergencyOnly.includes(PhaseKind::Emergency));
        assert!(!PlanType::EmergencyOnly.includes(PhaseKind::Stabilization));
        assert!(!PlanType::Recovery.includes(PhaseKind::Emergency));
        assert!(PlanType::Recovery.includes(PhaseKind::Stabilization));
    }

    #[test]
    fn test_plan_type_from_str() {
        assert_eq!("emergency-only".parse::<PlanType>(), Ok(PlanType::EmergencyOnly));
        assert_eq!("Recovery".parse::<PlanType>(), Ok(PlanType::Recovery));
        assert!("partial".parse::<PlanType>().is_err());
    }

    #[test]
    fn test_duration_label() {
        let d = PhaseDuration {
            value: 28.0,
            unit: DurationUnit::Days,
        };
        assert_eq!(d.label(), "28 days");
        let d = PhaseDuration {
            value: 1.5,
            unit: DurationUnit::Years,
        };
        assert_eq!(d.label(), "1.5 years");
    }
}
