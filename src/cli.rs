//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Solar proposal financial projection.
///
/// If no --scenario, --preset or --proposal is given, the residential preset is used.
#[derive(Debug, Parser)]
#[command(name = "proposal-sim", version, about, long_about = None)]
pub struct CliArgs {
    /// Load scenario from TOML config file
    #[arg(long, conflicts_with_all = ["preset", "proposal"])]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (residential, commercial, rural)
    #[arg(long, conflicts_with = "proposal")]
    pub preset: Option<String>,

    /// Project a stored proposal record (JSON)
    #[arg(long)]
    pub proposal: Option<PathBuf>,

    /// Override the horizon in years
    #[arg(long)]
    pub horizon: Option<u32>,

    /// First projected month, "MM/YYYY" (default: current month)
    #[arg(long)]
    pub start: Option<String>,

    /// Generation factor table JSON (default: embedded table)
    #[arg(long)]
    pub factor_table: Option<PathBuf>,

    /// Export the monthly table to CSV
    #[arg(long)]
    pub csv_out: Option<PathBuf>,

    /// Export rows and summary to JSON
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Print only the summary
    #[arg(long, default_value_t = false)]
    pub summary_only: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
