//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use proposal_sim::location::GenerationFactorTable;
use proposal_sim::proposal::{ProposalScenarios, sales_proposal_scenarios};
use proposal_sim::sim::types::{Assumptions, ConnectionType, Orientation, SimulationInput};

/// Reference residential proposal at a location missing from the factor table.
///
/// 20 000 investment, 6 kW, 500 kWh/month, 0.95/kWh, two-phase, 20 public lighting,
/// starting January 2026 over 25 years.
pub fn reference_input() -> SimulationInput {
    SimulationInput {
        investment: 20_000.0,
        total_modules_power_kw: 6.0,
        module_count: 11,
        location_city: "CIDADE INEXISTENTE".to_string(),
        location_state: "ZZ".to_string(),
        orientation: Orientation::Norte,
        monthly_energy_consumption_kwh: 500.0,
        energy_tariff: 0.95,
        fio_b_tariff: None,
        connection_type: ConnectionType::Bifasico,
        simultaneity_factor_pct: 30.0,
        public_lighting_cost: 20.0,
        horizon_years: 25,
        yearly_consumption_scaling_pct: 0.0,
        yearly_generation_decrease_pct: 0.8,
        start_year: 2026,
        start_month: 1,
        seasonal_generation: false,
    }
}

/// Runs a projection with the embedded factor table and default assumptions.
pub fn project(input: &SimulationInput) -> ProposalScenarios {
    sales_proposal_scenarios(
        input,
        &GenerationFactorTable::embedded(),
        &Assumptions::default(),
    )
}

/// Undersized system: generation well below consumption every month.
pub fn undersized_input() -> SimulationInput {
    SimulationInput {
        total_modules_power_kw: 1.5,
        monthly_energy_consumption_kwh: 900.0,
        ..reference_input()
    }
}
