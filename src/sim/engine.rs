//! Month-by-month progression of the proposal projection.

use tracing::debug;

use super::billing::{BillInputs, compute_monthly_bill};
use super::compensation::{compute_compensation, next_balance, value_compensation};
use super::projection::{MonthlyProfile, flat_profile, project_month};
use super::tariff::{index_energy_tariff, index_fio_b_tariff};
use super::types::{Assumptions, MonthlyRow, SimulationInput};

/// State threaded from one month to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressionState {
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Net-metering credit carried in (kWh, >= 0).
    pub cumulated_balance: f64,
    /// Cumulative payback before this month.
    pub payback: f64,
}

impl ProgressionState {
    /// State before the first projected month.
    pub fn initial(input: &SimulationInput) -> Self {
        Self {
            year: input.start_year,
            month: input.start_month_clamped(),
            cumulated_balance: 0.0,
            payback: -input.investment,
        }
    }

    /// Calendar position of the following month.
    fn advance(&self) -> (i32, u32) {
        if self.month >= 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }
}

/// Projection engine for one proposal.
///
/// Holds the immutable input and reference profiles; every month is a pure
/// transition on [`ProgressionState`].
#[derive(Debug, Clone)]
pub struct Engine {
    input: SimulationInput,
    assumptions: Assumptions,
    reference_consumption: MonthlyProfile,
    reference_generation: MonthlyProfile,
    start_fio_b_tariff: f64,
}

impl Engine {
    /// Creates an engine.
    ///
    /// # Arguments
    ///
    /// * `input` - Proposal parameters
    /// * `assumptions` - Business and regulatory assumptions
    /// * `reference_generation` - Generation per calendar month in the start year (kWh)
    pub fn new(
        input: SimulationInput,
        assumptions: Assumptions,
        reference_generation: MonthlyProfile,
    ) -> Self {
        let reference_consumption = flat_profile(input.monthly_energy_consumption_kwh);
        let start_fio_b_tariff = input.start_fio_b_tariff(&assumptions);
        Self {
            input,
            assumptions,
            reference_consumption,
            reference_generation,
            start_fio_b_tariff,
        }
    }

    /// Computes the month described by `state` and the state for the next one.
    pub fn step(&self, state: &ProgressionState) -> (ProgressionState, MonthlyRow) {
        let input = &self.input;
        let a = &self.assumptions;
        let idx = (state.month.clamp(1, 12) - 1) as usize;

        // 1. Tariffs for this year
        let energy_tariff = index_energy_tariff(
            input.energy_tariff,
            input.start_year,
            state.year,
            a.inflation(),
        );
        let fio_b_tariff = index_fio_b_tariff(
            input.energy_tariff,
            self.start_fio_b_tariff,
            input.start_year,
            state.year,
            a,
        );

        // 2. Energy split
        let p = project_month(
            self.reference_consumption[idx],
            self.reference_generation[idx],
            input.simultaneity_factor_pct,
            input.start_year,
            state.year,
            input.yearly_consumption_scaling_pct,
            input.yearly_generation_decrease_pct,
        );

        // 3. Compensation against the balance carried in
        let compensated = compute_compensation(
            p.net_generation,
            state.cumulated_balance,
            p.injected_energy,
            p.used_from_grid,
        );
        let cumulated_balance = next_balance(state.cumulated_balance, p.net_generation);
        let value = value_compensation(compensated, energy_tariff, fio_b_tariff, a);

        // 4. Bill
        let bill = compute_monthly_bill(&BillInputs {
            consumption: p.consumption,
            used_from_grid: p.used_from_grid,
            compensated_energy: compensated,
            network_cost: value.network_cost,
            energy_tariff,
            connection_type: input.connection_type,
            public_lighting_cost: input.public_lighting_cost,
        });

        let payback = state.payback + bill.saved_value;

        let row = MonthlyRow {
            year: state.year,
            month: state.month,
            tag: MonthlyRow::tag_for(state.year, state.month),
            consumption_kwh: p.consumption,
            generation_kwh: p.generation,
            used_from_grid_kwh: p.used_from_grid,
            injected_energy_kwh: p.injected_energy,
            compensated_energy_kwh: compensated,
            energy_tariff,
            fio_b_tariff,
            non_compensated_energy_cost: bill.non_compensated_cost,
            compensated_energy_cost: bill.network_cost,
            availability_cost: bill.availability_cost,
            cumulated_balance_kwh: cumulated_balance,
            energy_bill_value: bill.energy_bill_value,
            conventional_energy_bill: bill.conventional_bill,
            saved_value: bill.saved_value,
            payback,
        };

        let (year, month) = state.advance();
        let next = ProgressionState {
            year,
            month,
            cumulated_balance,
            payback,
        };
        (next, row)
    }

    /// Runs the whole horizon, `horizon_years * 12 + 1` months.
    pub fn run(&self) -> Vec<MonthlyRow> {
        let total = self.input.row_count();
        debug!(
            months = total,
            start = %MonthlyRow::tag_for(self.input.start_year, self.input.start_month_clamped()),
            "running projection"
        );

        let (_, rows) = (0..total).fold(
            (ProgressionState::initial(&self.input), Vec::with_capacity(total)),
            |(state, mut rows), _| {
                let (next, row) = self.step(&state);
                rows.push(row);
                (next, rows)
            },
        );

        let break_even = rows.iter().position(|r| r.payback >= 0.0);
        debug!(?break_even, "projection finished");
        rows
    }

    pub fn input(&self) -> &SimulationInput {
        &self.input
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn reference_generation(&self) -> &MonthlyProfile {
        &self.reference_generation
    }
}
