//! CSV and JSON export of proposal projections.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::proposal::ProposalScenarios;
use crate::sim::types::MonthlyRow;

/// Column header for the monthly table CSV.
const HEADER: &str = "tag,year,month,consumption_kwh,generation_kwh,used_from_grid_kwh,\
                       injected_energy_kwh,compensated_energy_kwh,energy_tariff,fio_b_tariff,\
                       non_compensated_energy_cost,compensated_energy_cost,availability_cost,\
                       cumulated_balance_kwh,energy_bill_value,conventional_energy_bill,\
                       saved_value,payback";

/// Exports the monthly table to a CSV file at the given path.
///
/// Writes a header row followed by one row per month. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_csv(rows: &[MonthlyRow], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(rows, io::BufWriter::new(file))
}

/// Writes the monthly table as CSV to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv(rows: &[MonthlyRow], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in rows {
        wtr.write_record(&[
            r.tag.clone(),
            r.year.to_string(),
            r.month.to_string(),
            format!("{:.4}", r.consumption_kwh),
            format!("{:.4}", r.generation_kwh),
            format!("{:.4}", r.used_from_grid_kwh),
            format!("{:.4}", r.injected_energy_kwh),
            format!("{:.4}", r.compensated_energy_kwh),
            format!("{:.6}", r.energy_tariff),
            format!("{:.6}", r.fio_b_tariff),
            format!("{:.2}", r.non_compensated_energy_cost),
            format!("{:.2}", r.compensated_energy_cost),
            format!("{:.2}", r.availability_cost),
            format!("{:.4}", r.cumulated_balance_kwh),
            format!("{:.2}", r.energy_bill_value),
            format!("{:.2}", r.conventional_energy_bill),
            format!("{:.2}", r.saved_value),
            format!("{:.2}", r.payback),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports rows and summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if file creation or serialization fails.
pub fn export_json(scenarios: &ProposalScenarios, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_json(scenarios, io::BufWriter::new(file))
}

/// Writes rows and summary as pretty-printed JSON to any writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(scenarios: &ProposalScenarios, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, scenarios)?;
    writer.flush()?;
    Ok(())
}
