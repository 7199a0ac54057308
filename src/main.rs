//! Proposal simulator entry point: CLI wiring and config-driven projection.

mod cli;

use std::fs;
use std::process;

use clap::Parser;
use tracing::info;

use proposal_sim::config::{ScenarioConfig, check_horizon, current_month, parse_month_tag};
use proposal_sim::io::export::{export_csv, export_json};
use proposal_sim::location::GenerationFactorTable;
use proposal_sim::proposal::{ProposalRecord, sales_proposal_scenarios};
use proposal_sim::sim::types::{Assumptions, SimulationInput};
use proposal_sim::telemetry::init_tracing;
use proposal_sim::{Error, Result};

use cli::CliArgs;

/// Resolves the projection input, assumptions, and factor table from the CLI.
fn build_run(
    cli: &CliArgs,
    start: Option<(i32, u32)>,
) -> Result<(SimulationInput, Assumptions, GenerationFactorTable)> {
    if let Some(path) = &cli.proposal {
        let raw = fs::read_to_string(path).map_err(|source| Error::File {
            path: path.display().to_string(),
            source,
        })?;
        let record = ProposalRecord::from_json_str(&raw)?;
        let (year, month) = start.unwrap_or_else(current_month);
        let mut input = record.to_input(year, month);
        if let Some(h) = cli.horizon {
            input.horizon_years = h;
        }
        check_horizon("--horizon", input.horizon_years)?;
        let table = match &cli.factor_table {
            Some(p) => GenerationFactorTable::from_json_file(p)?,
            None => GenerationFactorTable::embedded(),
        };
        info!(path = %path.display(), "projecting stored proposal");
        return Ok((input, Assumptions::default(), table));
    }

    // --scenario takes priority, then --preset, then the residential default
    let mut scenario = if let Some(path) = &cli.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(name) = &cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::residential()
    };

    if let Some(h) = cli.horizon {
        scenario.projection.horizon_years = h;
    }
    if let Some(p) = &cli.factor_table {
        scenario.location.factor_table = Some(p.clone());
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let input = match start {
        Some((year, month)) => scenario.to_input_at(year, month),
        None => scenario.to_input(),
    };
    let table = scenario.factor_table()?;
    Ok((input, scenario.assumptions.clone(), table))
}

fn run(cli: &CliArgs) -> Result<()> {
    let start = match cli.start.as_deref() {
        Some(tag) => match parse_month_tag(tag) {
            Some(s) => Some(s),
            None => {
                eprintln!("error: --start value \"{tag}\" is not a valid MM/YYYY month");
                process::exit(1);
            }
        },
        None => None,
    };

    let (input, assumptions, table) = build_run(cli, start)?;
    let scenarios = sales_proposal_scenarios(&input, &table, &assumptions);

    if !cli.summary_only {
        for r in &scenarios.rows {
            println!("{r}");
        }
        println!();
    }
    println!("{}", scenarios.summary);

    if let Some(path) = &cli.csv_out {
        export_csv(&scenarios.rows, path)?;
        eprintln!("Monthly table written to {}", path.display());
    }
    if let Some(path) = &cli.json_out {
        export_json(&scenarios, path)?;
        eprintln!("Scenario written to {}", path.display());
    }
    Ok(())
}

fn main() {
    let cli = CliArgs::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
