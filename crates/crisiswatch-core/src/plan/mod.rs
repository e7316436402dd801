//! Phase-costed humanitarian response plans.

pub mod costs;
pub mod engine;
pub mod funding;
pub mod staffing;

pub use costs::{
    phase_cost, unit_rate, PhaseDurations, CONTINGENCY_RATE, OVERHEAD_RATE, REACTIVE_MULTIPLIER,
};
pub use engine::{generate_plan, PlanEngine, PlanRequest};
pub use funding::FundingSplit;
pub use staffing::staffing_plan;
