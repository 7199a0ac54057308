//! Headline figures derived from a complete projection table.

use std::fmt;

use serde::Serialize;

use super::projection::MonthlyProfile;
use super::types::{Assumptions, MonthlyRow, SimulationInput};

/// Totals for one calendar year of the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: i32,
    pub months: usize,
    pub consumption_kwh: f64,
    pub generation_kwh: f64,
    pub energy_bill_value: f64,
    pub conventional_energy_bill: f64,
    pub saved_value: f64,
    /// Payback at the last month of the year.
    pub closing_payback: f64,
}

/// Summary figures shown alongside the projection table.
///
/// Computed post-hoc from the rows so the headline numbers always agree
/// with the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    /// Sum of the reference monthly generation (kWh/year).
    pub estimated_annual_generation_kwh: f64,
    /// Average saved value over the first twelve months.
    pub monthly_saved_value: f64,
    /// Saved value over the first twelve months.
    pub annual_saved_value: f64,
    /// Saved value over the whole table.
    pub total_saved_value: f64,
    /// Total saved value per year of table, `rows / 12` years.
    pub average_annual_saved_value: f64,
    /// Total saved value per projected month.
    pub average_monthly_saved_value: f64,
    pub module_count: u32,
    /// Approximate roof area taken by the modules (m²).
    pub total_module_area_m2: f64,
    /// Index of the first row with non-negative payback.
    pub break_even_month: Option<usize>,
    /// `break_even_month` in years.
    pub payback_years: Option<f64>,
    /// Payback after the last row.
    pub final_payback: f64,
    pub yearly: Vec<YearSummary>,
}

impl ScenarioSummary {
    /// Aggregates a projection table.
    ///
    /// # Arguments
    ///
    /// * `rows` - Complete projection table
    /// * `input` - Input the table was computed from
    /// * `reference_generation` - Start-year monthly generation (kWh)
    /// * `assumptions` - Assumptions the table was computed with
    pub fn from_rows(
        rows: &[MonthlyRow],
        input: &SimulationInput,
        reference_generation: &MonthlyProfile,
        assumptions: &Assumptions,
    ) -> Self {
        let first_year = &rows[..rows.len().min(12)];
        let annual_saved_value: f64 = first_year.iter().map(|r| r.saved_value).sum();
        let first_year_months = non_zero(first_year.len() as f64);

        let total_saved_value: f64 = rows.iter().map(|r| r.saved_value).sum();
        let months = non_zero(rows.len() as f64);
        let covered_years = non_zero(rows.len() as f64 / 12.0);

        let break_even_month = rows.iter().position(|r| r.payback >= 0.0);

        Self {
            estimated_annual_generation_kwh: reference_generation.iter().sum(),
            monthly_saved_value: annual_saved_value / first_year_months,
            annual_saved_value,
            total_saved_value,
            average_annual_saved_value: total_saved_value / covered_years,
            average_monthly_saved_value: total_saved_value / months,
            module_count: input.module_count,
            total_module_area_m2: f64::from(input.module_count) * assumptions.module_area_m2,
            break_even_month,
            payback_years: break_even_month.map(|m| (m + 1) as f64 / 12.0),
            final_payback: rows.last().map_or(-input.investment, |r| r.payback),
            yearly: yearly_breakdown(rows),
        }
    }
}

fn non_zero(v: f64) -> f64 {
    if v == 0.0 { 1.0 } else { v }
}

/// Groups rows by calendar year, preserving order.
pub fn yearly_breakdown(rows: &[MonthlyRow]) -> Vec<YearSummary> {
    let mut years: Vec<YearSummary> = Vec::new();
    for r in rows {
        match years.last_mut() {
            Some(y) if y.year == r.year => {
                y.months += 1;
                y.consumption_kwh += r.consumption_kwh;
                y.generation_kwh += r.generation_kwh;
                y.energy_bill_value += r.energy_bill_value;
                y.conventional_energy_bill += r.conventional_energy_bill;
                y.saved_value += r.saved_value;
                y.closing_payback = r.payback;
            }
            _ => years.push(YearSummary {
                year: r.year,
                months: 1,
                consumption_kwh: r.consumption_kwh,
                generation_kwh: r.generation_kwh,
                energy_bill_value: r.energy_bill_value,
                conventional_energy_bill: r.conventional_energy_bill,
                saved_value: r.saved_value,
                closing_payback: r.payback,
            }),
        }
    }
    years
}

impl fmt::Display for ScenarioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Proposal Summary ---")?;
        writeln!(
            f,
            "Estimated generation:  {:.0} kWh/year",
            self.estimated_annual_generation_kwh
        )?;
        writeln!(
            f,
            "Modules:               {} ({:.1} m²)",
            self.module_count, self.total_module_area_m2
        )?;
        writeln!(f, "Saved (month, yr 1):   {:.2}", self.monthly_saved_value)?;
        writeln!(f, "Saved (year 1):        {:.2}", self.annual_saved_value)?;
        writeln!(f, "Saved (horizon):       {:.2}", self.total_saved_value)?;
        writeln!(
            f,
            "Saved (avg per year):  {:.2}",
            self.average_annual_saved_value
        )?;
        match (self.break_even_month, self.payback_years) {
            (Some(m), Some(y)) => writeln!(f, "Break-even:            month {m} ({y:.1} years)")?,
            _ => writeln!(f, "Break-even:            not reached")?,
        }
        write!(f, "Final payback:         {:.2}", self.final_payback)
    }
}
