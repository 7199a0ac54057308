//! Net-metering compensation and its valuation.

use super::types::Assumptions;

/// Energy (kWh) of this month's grid draw offset by credits.
///
/// A surplus month offsets its whole grid draw. A deficit month draws on the
/// carried balance and this month's injection, capped at the grid draw.
///
/// # Examples
///
/// ```
/// use proposal_sim::sim::compensation::compute_compensation;
///
/// assert_eq!(compute_compensation(-20.0, 0.0, 50.0, 80.0), 50.0);
/// assert_eq!(compute_compensation(10.0, 0.0, 50.0, 80.0), 80.0);
/// ```
pub fn compute_compensation(
    net_generation: f64,
    past_balance: f64,
    injected_energy: f64,
    used_from_grid: f64,
) -> f64 {
    let compensated = if net_generation >= 0.0 {
        used_from_grid
    } else if past_balance <= 0.0 {
        injected_energy
    } else if past_balance + injected_energy > used_from_grid {
        used_from_grid
    } else {
        past_balance + injected_energy
    };
    compensated.max(0.0)
}

/// Credit balance carried into the next month; never negative.
pub fn next_balance(past_balance: f64, net_generation: f64) -> f64 {
    (past_balance + net_generation).max(0.0)
}

/// Monetary value of compensated energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensationValue {
    /// Energy component (TE) of the compensated kWh, credited in full.
    pub energy_component_cost: f64,
    /// Fio B still charged on compensated energy.
    pub network_cost: f64,
    /// Net value credited: full tariff minus the network cost.
    pub total_compensated: f64,
    /// `total_compensated` as a percentage of the full-tariff value.
    pub effective_rate_pct: f64,
}

/// Values `compensated_energy` at the month's indexed tariffs.
pub fn value_compensation(
    compensated_energy: f64,
    energy_tariff: f64,
    fio_b_tariff: f64,
    assumptions: &Assumptions,
) -> CompensationValue {
    let full_value = compensated_energy * energy_tariff;
    let network_cost = compensated_energy * fio_b_tariff;
    let total_compensated = full_value - network_cost;
    let denominator = if full_value == 0.0 { 1.0 } else { full_value };

    CompensationValue {
        energy_component_cost: full_value * assumptions.te_share,
        network_cost,
        total_compensated,
        effective_rate_pct: total_compensated / denominator * 100.0,
    }
}
