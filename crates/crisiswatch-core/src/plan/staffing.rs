//! Staffing ratios per 1,000 people.

use crate::domain::{PhaseKind, PhaseStaffing, PlanType, RoleHeadcount, StaffingPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRole {
    Coordinator,
    HealthWorker,
    LogisticsOfficer,
    ProtectionOfficer,
    WashEngineer,
    Educator,
    LivelihoodsOfficer,
    CaseWorker,
    CommunityLiaison,
}

impl StaffRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::HealthWorker => "health_worker",
            Self::LogisticsOfficer => "logistics_officer",
            Self::ProtectionOfficer => "protection_officer",
            Self::WashEngineer => "wash_engineer",
            Self::Educator => "educator",
            Self::LivelihoodsOfficer => "livelihoods_officer",
            Self::CaseWorker => "case_worker",
            Self::CommunityLiaison => "community_liaison",
        }
    }
}

/// Staff needed per 1,000 people in a phase.
pub fn ratios(phase: PhaseKind) -> &'static [(StaffRole, u64)] {
    match phase {
        PhaseKind::Emergency => &[
            (StaffRole::Coordinator, 1),
            (StaffRole::HealthWorker, 4),
            (StaffRole::LogisticsOfficer, 2),
            (StaffRole::ProtectionOfficer, 2),
            (StaffRole::WashEngineer, 2),
        ],
        PhaseKind::Stabilization => &[
            (StaffRole::Coordinator, 1),
            (StaffRole::HealthWorker, 2),
            (StaffRole::Educator, 3),
            (StaffRole::LivelihoodsOfficer, 2),
            (StaffRole::ProtectionOfficer, 1),
        ],
        PhaseKind::Integration => &[
            (StaffRole::CaseWorker, 2),
            (StaffRole::Educator, 2),
            (StaffRole::LivelihoodsOfficer, 2),
            (StaffRole::CommunityLiaison, 1),
        ],
    }
}

/// Headcount for the phases `plan_type` includes, scaled by
/// `ceil(population / 1000)`.
pub fn staffing_plan(plan_type: PlanType, population: u64) -> StaffingPlan {
    let units = population.div_ceil(1000);
    let phases: Vec<PhaseStaffing> = PhaseKind::ALL
        .into_iter()
        .filter(|p| plan_type.includes(*p))
        .map(|phase| {
            let roles: Vec<RoleHeadcount> = ratios(phase)
                .iter()
                .map(|(role, per_thousand)| RoleHeadcount {
                    role: role.as_str().to_string(),
                    count: per_thousand * units,
                })
                .collect();
            let total = roles.iter().map(|r| r.count).sum();
            PhaseStaffing {
                phase,
                roles,
                total,
            }
        })
        .collect();
    let total = phases.iter().map(|p| p.total).sum();
    StaffingPlan { phases, total }
}
