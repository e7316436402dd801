//! Turns an analysis and a target population into a [`ResponsePlan`].

use chrono::Utc;
use uuid::Uuid;

use super::costs::{
    phase_cost, rate_table, PhaseDurations, CONTINGENCY_RATE, OVERHEAD_RATE, REACTIVE_MULTIPLIER,
};
use super::funding::FundingSplit;
use super::staffing::staffing_plan;
use crate::domain::{
    AiAnalysis, CostAnalysis, CostBreakdown, CostComparison, CrisisError, PhaseKind, PlanPhase,
    PlanType, ResponsePlan, Result,
};
use crate::obs;

/// Caller input for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanRequest {
    pub plan_type: PlanType,
    /// Overrides the population estimated by the analysis.
    pub population: Option<i64>,
}

/// Validated plan settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanEngine {
    durations: PhaseDurations,
    funding: FundingSplit,
}

impl PlanEngine {
    pub fn new(durations: PhaseDurations, funding: FundingSplit) -> Result<Self> {
        durations.validate()?;
        funding.validate()?;
        Ok(Self { durations, funding })
    }

    pub fn durations(&self) -> &PhaseDurations {
        &self.durations
    }

    /// Population to plan for: the caller's figure, else the AI estimate.
    pub fn target_population(analysis: &AiAnalysis, request: &PlanRequest) -> Result<u64> {
        match request.population {
            Some(p) if p >= 1 => Ok(p as u64),
            Some(p) => Err(CrisisError::InvalidPopulation(p)),
            None => match analysis.displacement_prediction.estimated_population {
                0 => Err(CrisisError::InvalidPopulation(0)),
                p => Ok(p),
            },
        }
    }

    pub fn generate(&self, analysis: &AiAnalysis, request: &PlanRequest) -> Result<ResponsePlan> {
        let population = Self::target_population(analysis, request)?;
        let plan_type = request.plan_type;

        let cost_of = |phase: PhaseKind| {
            if plan_type.includes(phase) {
                phase_cost(phase, population, &self.durations)
            } else {
                0.0
            }
        };
        let emergency = cost_of(PhaseKind::Emergency);
        let stabilization = cost_of(PhaseKind::Stabilization);
        let integration = cost_of(PhaseKind::Integration);
        let operational = emergency + stabilization + integration;
        let overhead = operational * OVERHEAD_RATE;
        let contingency = operational * CONTINGENCY_RATE;
        let breakdown = CostBreakdown {
            emergency,
            stabilization,
            integration,
            overhead,
            contingency,
            total: emergency + stabilization + integration + overhead + contingency,
        };

        let preventive = breakdown.total;
        let reactive = preventive * REACTIVE_MULTIPLIER;
        let savings = reactive - preventive;
        let comparison = CostComparison {
            preventive,
            reactive,
            savings,
            savings_ratio: if reactive > 0.0 { savings / reactive } else { 0.0 },
        };

        let phases = PhaseKind::ALL
            .into_iter()
            .filter(|p| plan_type.includes(*p))
            .map(|phase| self.phase(phase, population, analysis, cost_of(phase)))
            .collect();

        let plan = ResponsePlan {
            id: Uuid::new_v4(),
            region: analysis.region.clone(),
            plan_type,
            target_population: population,
            risk_level: analysis.ai_risk_assessment,
            generated_at: Utc::now(),
            phases,
            cost_analysis: CostAnalysis {
                breakdown,
                comparison,
                cost_per_person: breakdown.total / population as f64,
            },
            staffing: staffing_plan(plan_type, population),
            funding_strategy: self.funding.apply(breakdown.total),
        };
        obs::emit_plan_generated(
            analysis.region.code(),
            plan_type,
            population,
            plan.cost_analysis.breakdown.total,
        );
        Ok(plan)
    }

    fn phase(&self, phase: PhaseKind, population: u64, analysis: &AiAnalysis, cost: f64) -> PlanPhase {
        let duration = self.durations.duration(phase);
        let resource_needs = rate_table(phase)
            .into_iter()
            .map(|(label, rate)| {
                format!("{label}: {:.2}", population as f64 * rate * duration.value)
            })
            .collect();

        let (objectives, mut activities): (Vec<&str>, Vec<String>) = match phase {
            PhaseKind::Emergency => (
                vec![
                    "Save lives and meet basic needs",
                    "Establish safe reception and registration",
                ],
                vec![
                    "Distribute food, water and emergency shelter".to_string(),
                    "Deploy mobile health and protection teams".to_string(),
                ],
            ),
            PhaseKind::Stabilization => (
                vec![
                    "Restore access to basic services",
                    "Reduce dependence on emergency aid",
                ],
                vec![
                    "Open temporary learning spaces".to_string(),
                    "Launch cash-for-work and livelihood support".to_string(),
                ],
            ),
            PhaseKind::Integration => (
                vec![
                    "Secure durable housing and livelihoods",
                    "Strengthen social cohesion with host communities",
                ],
                vec![
                    "Support transition to permanent housing".to_string(),
                    "Enrol children in national education systems".to_string(),
                ],
            ),
        };
        let recommended = match phase {
            PhaseKind::Emergency => &analysis.recommendations.immediate,
            PhaseKind::Stabilization => &analysis.recommendations.short_term,
            PhaseKind::Integration => &analysis.recommendations.long_term,
        };
        activities.extend(recommended.iter().cloned());

        PlanPhase {
            phase,
            duration_label: duration.label(),
            duration,
            objectives: objectives.into_iter().map(str::to_string).collect(),
            activities,
            resource_needs,
            cost,
        }
    }
}

/// Generate a plan with default durations and funding split.
pub fn generate_plan(analysis: &AiAnalysis, request: &PlanRequest) -> Result<ResponsePlan> {
    PlanEngine::new(PhaseDurations::default(), FundingSplit::default())?.generate(analysis, request)
}
