//! TOML-based proposal scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::error::{Error, Result};
use crate::location::GenerationFactorTable;
use crate::sim::types::{Assumptions, ConnectionType, Orientation, SimulationInput};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the residential scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::residential`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Commercial terms and system size.
    #[serde(default)]
    pub proposal: ProposalConfig,
    /// Installation site.
    #[serde(default)]
    pub location: LocationConfig,
    /// Utility tariff and connection.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Consumption premises.
    #[serde(default)]
    pub premises: PremisesConfig,
    /// Projection horizon and yearly drift.
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Business and regulatory assumptions.
    #[serde(default)]
    pub assumptions: Assumptions,
}

/// Commercial terms and system size.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProposalConfig {
    /// Total proposal value.
    pub investment: f64,
    /// Number of PV modules.
    pub module_count: u32,
    /// Nameplate power of one module (W).
    pub module_power_w: f64,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            investment: 20_000.0,
            module_count: 11,
            module_power_w: 550.0,
        }
    }
}

impl ProposalConfig {
    /// Installed power (kW).
    pub fn total_power_kw(&self) -> f64 {
        f64::from(self.module_count) * self.module_power_w / 1000.0
    }
}

/// Installation site.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationConfig {
    /// City, matched exactly against the factor table.
    pub city: String,
    /// State abbreviation, matched exactly against the factor table.
    pub state: String,
    /// `"NORTE"`, `"SUL"`, `"NORDESTE"`, ...
    pub orientation: String,
    /// Factor table JSON; the embedded table is used when unset.
    pub factor_table: Option<PathBuf>,
    /// Use per-month factors when the location has them.
    pub seasonal_generation: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: "BELO HORIZONTE".to_string(),
            state: "MG".to_string(),
            orientation: "NORTE".to_string(),
            factor_table: None,
            seasonal_generation: false,
        }
    }
}

/// Utility tariff and connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Full tariff, TE + TUSD (money/kWh).
    pub energy_tariff: f64,
    /// Nominal Fio B tariff (money/kWh); derived from the tariff split when unset.
    pub fio_b_tariff: Option<f64>,
    /// `"MONOFÁSICO"`, `"BIFÁSICO"` or `"TRIFÁSICO"`.
    pub connection_type: String,
    /// Fixed monthly public lighting charge.
    pub public_lighting_cost: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            energy_tariff: 0.95,
            fio_b_tariff: None,
            connection_type: "BIFÁSICO".to_string(),
            public_lighting_cost: 20.0,
        }
    }
}

/// Consumption premises.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PremisesConfig {
    /// Baseline monthly consumption (kWh).
    pub monthly_consumption_kwh: f64,
    /// Share of consumption simultaneous with generation (percent, 0-100).
    pub simultaneity_factor_pct: f64,
}

impl Default for PremisesConfig {
    fn default() -> Self {
        Self {
            monthly_consumption_kwh: 500.0,
            simultaneity_factor_pct: 30.0,
        }
    }
}

/// Projection horizon and yearly drift.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Horizon in years (table has `horizon_years * 12 + 1` rows).
    pub horizon_years: u32,
    /// Yearly consumption growth (percent).
    pub consumption_scaling_pct: f64,
    /// Yearly panel degradation (percent).
    pub generation_decrease_pct: f64,
    /// First projected month as `"MM/YYYY"`; the current month when unset.
    pub start: Option<String>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_years: 25,
            consumption_scaling_pct: 0.0,
            generation_decrease_pct: 0.8,
            start: None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"projection.horizon_years"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Longest projection horizon accepted from a scenario or the command line.
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Rejects horizons above [`MAX_HORIZON_YEARS`].
///
/// # Errors
///
/// Returns a `ConfigError` naming `field` when `years` is out of range.
pub fn check_horizon(field: &str, years: u32) -> std::result::Result<(), ConfigError> {
    if years > MAX_HORIZON_YEARS {
        return Err(ConfigError::new(
            field,
            format!("must be <= {MAX_HORIZON_YEARS}, got {years}"),
        ));
    }
    Ok(())
}

/// Parses a `"MM/YYYY"` month tag.
pub fn parse_month_tag(tag: &str) -> Option<(i32, u32)> {
    let (month, year) = tag.trim().split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// Current calendar year and month in local time.
pub fn current_month() -> (i32, u32) {
    let now = chrono::Local::now();
    (now.year(), now.month())
}

impl ScenarioConfig {
    /// Returns the residential scenario (same parameters as the field defaults).
    pub fn residential() -> Self {
        Self::default()
    }

    /// Returns the commercial preset: three-phase, daytime-heavy consumption.
    pub fn commercial() -> Self {
        Self {
            proposal: ProposalConfig {
                investment: 95_000.0,
                module_count: 56,
                module_power_w: 550.0,
            },
            location: LocationConfig {
                city: "SÃO PAULO".to_string(),
                state: "SP".to_string(),
                ..LocationConfig::default()
            },
            tariff: TariffConfig {
                energy_tariff: 0.89,
                connection_type: "TRIFÁSICO".to_string(),
                public_lighting_cost: 45.0,
                ..TariffConfig::default()
            },
            premises: PremisesConfig {
                monthly_consumption_kwh: 3_500.0,
                simultaneity_factor_pct: 60.0,
            },
            projection: ProjectionConfig {
                consumption_scaling_pct: 2.0,
                ..ProjectionConfig::default()
            },
            assumptions: Assumptions::default(),
        }
    }

    /// Returns the rural preset: single-phase, evening consumption, site off the table.
    pub fn rural() -> Self {
        Self {
            proposal: ProposalConfig {
                investment: 12_500.0,
                module_count: 6,
                module_power_w: 550.0,
            },
            location: LocationConfig {
                city: "ZONA RURAL".to_string(),
                state: "MG".to_string(),
                orientation: "NORDESTE".to_string(),
                ..LocationConfig::default()
            },
            tariff: TariffConfig {
                energy_tariff: 0.78,
                connection_type: "MONOFÁSICO".to_string(),
                public_lighting_cost: 0.0,
                ..TariffConfig::default()
            },
            premises: PremisesConfig {
                monthly_consumption_kwh: 280.0,
                simultaneity_factor_pct: 15.0,
            },
            projection: ProjectionConfig::default(),
            assumptions: Assumptions::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["residential", "commercial", "rural"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> std::result::Result<Self, ConfigError> {
        match name {
            "residential" => Ok(Self::residential()),
            "commercial" => Ok(Self::commercial()),
            "rural" => Ok(Self::rural()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::File {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "loaded scenario");
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let p = &self.proposal;
        if p.investment < 0.0 {
            errors.push(ConfigError::new("proposal.investment", "must be >= 0"));
        }
        if p.module_power_w < 0.0 {
            errors.push(ConfigError::new("proposal.module_power_w", "must be >= 0"));
        }

        if Orientation::parse(&self.location.orientation).is_none() {
            errors.push(ConfigError::new(
                "location.orientation",
                format!(
                    "must be one of {}, got \"{}\"",
                    Orientation::ALL.map(Orientation::as_key).join(", "),
                    self.location.orientation
                ),
            ));
        }

        let t = &self.tariff;
        if t.energy_tariff < 0.0 {
            errors.push(ConfigError::new("tariff.energy_tariff", "must be >= 0"));
        }
        if t.fio_b_tariff.is_some_and(|f| f < 0.0) {
            errors.push(ConfigError::new("tariff.fio_b_tariff", "must be >= 0"));
        }
        if ConnectionType::parse(&t.connection_type).is_none() {
            errors.push(ConfigError::new(
                "tariff.connection_type",
                format!(
                    "must be \"MONOFÁSICO\", \"BIFÁSICO\" or \"TRIFÁSICO\", got \"{}\"",
                    t.connection_type
                ),
            ));
        }

        let pr = &self.premises;
        if pr.monthly_consumption_kwh < 0.0 {
            errors.push(ConfigError::new(
                "premises.monthly_consumption_kwh",
                "must be >= 0",
            ));
        }
        if !(0.0..=100.0).contains(&pr.simultaneity_factor_pct) {
            errors.push(ConfigError::new(
                "premises.simultaneity_factor_pct",
                "must be in [0, 100]",
            ));
        }

        let pj = &self.projection;
        if let Err(e) = check_horizon("projection.horizon_years", pj.horizon_years) {
            errors.push(e);
        }
        if pj.generation_decrease_pct >= 100.0 {
            errors.push(ConfigError::new(
                "projection.generation_decrease_pct",
                "must be < 100",
            ));
        }
        if let Some(start) = &pj.start {
            if parse_month_tag(start).is_none() {
                errors.push(ConfigError::new(
                    "projection.start",
                    format!("must be \"MM/YYYY\", got \"{start}\""),
                ));
            }
        }

        let a = &self.assumptions;
        if ((a.te_share + a.tusd_share) - 1.0).abs() > 1e-6 {
            errors.push(ConfigError::new(
                "assumptions.te_share",
                "te_share + tusd_share must equal 1",
            ));
        }
        if a.fio_b_full_year <= a.fio_b_phase_in_base_year {
            errors.push(ConfigError::new(
                "assumptions.fio_b_full_year",
                "must be > assumptions.fio_b_phase_in_base_year",
            ));
        }

        errors
    }

    /// Builds the projection input, starting at `start` or the current month.
    pub fn to_input(&self) -> SimulationInput {
        let (year, month) = self
            .projection
            .start
            .as_deref()
            .and_then(parse_month_tag)
            .unwrap_or_else(current_month);
        self.to_input_at(year, month)
    }

    /// Builds the projection input starting at an explicit month.
    pub fn to_input_at(&self, start_year: i32, start_month: u32) -> SimulationInput {
        SimulationInput {
            investment: self.proposal.investment,
            total_modules_power_kw: self.proposal.total_power_kw(),
            module_count: self.proposal.module_count,
            location_city: self.location.city.clone(),
            location_state: self.location.state.clone(),
            orientation: Orientation::parse(&self.location.orientation).unwrap_or_default(),
            monthly_energy_consumption_kwh: self.premises.monthly_consumption_kwh,
            energy_tariff: self.tariff.energy_tariff,
            fio_b_tariff: self.tariff.fio_b_tariff,
            connection_type: ConnectionType::parse(&self.tariff.connection_type)
                .unwrap_or_default(),
            simultaneity_factor_pct: self.premises.simultaneity_factor_pct,
            public_lighting_cost: self.tariff.public_lighting_cost,
            horizon_years: self.projection.horizon_years,
            yearly_consumption_scaling_pct: self.projection.consumption_scaling_pct,
            yearly_generation_decrease_pct: self.projection.generation_decrease_pct,
            start_year,
            start_month,
            seasonal_generation: self.location.seasonal_generation,
        }
    }

    /// Loads the configured factor table, or the embedded one.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured table file cannot be read or parsed.
    pub fn factor_table(&self) -> Result<GenerationFactorTable> {
        match &self.location.factor_table {
            Some(path) => GenerationFactorTable::from_json_file(path),
            None => Ok(GenerationFactorTable::embedded()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residential_preset_valid() {
        let cfg = ScenarioConfig::residential();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "residential should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[proposal]
investment = 31000.0
module_count = 16
module_power_w = 575.0

[location]
city = "GOIÂNIA"
state = "GO"
orientation = "NOROESTE"
seasonal_generation = true

[tariff]
energy_tariff = 1.02
fio_b_tariff = 0.21
connection_type = "TRIFÁSICO"
public_lighting_cost = 32.5

[premises]
monthly_consumption_kwh = 900.0
simultaneity_factor_pct = 40.0

[projection]
horizon_years = 10
consumption_scaling_pct = 1.5
generation_decrease_pct = 0.5
start = "07/2026"

[assumptions]
tariff_inflation_pct = 6.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.proposal.module_count), Some(16));
        assert_eq!(cfg.as_ref().map(|c| c.projection.horizon_years), Some(10));
        assert_eq!(
            cfg.as_ref().map(|c| c.assumptions.tariff_inflation_pct),
            Some(6.0)
        );
        // untouched assumptions keep their defaults
        assert_eq!(cfg.as_ref().map(|c| c.assumptions.te_share), Some(0.35));

        let input = cfg.as_ref().map(ScenarioConfig::to_input);
        let input = input.as_ref();
        assert_eq!(input.map(|i| (i.start_year, i.start_month)), Some((2026, 7)));
        assert_eq!(input.map(|i| i.orientation), Some(Orientation::Noroeste));
        assert_eq!(input.map(|i| i.connection_type), Some(ConnectionType::Trifasico));
        assert_eq!(input.map(|i| i.fio_b_tariff), Some(Some(0.21)));
        assert!(input.is_some_and(|i| (i.total_modules_power_kw - 9.2).abs() < 1e-9));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[premises]
monthly_consumption_kwh = 400.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[premises]
monthly_consumption_kwh = 750.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).ok();
        assert_eq!(
            cfg.as_ref().map(|c| c.premises.monthly_consumption_kwh),
            Some(750.0)
        );
        assert_eq!(
            cfg.as_ref().map(|c| c.premises.simultaneity_factor_pct),
            Some(30.0)
        );
        assert_eq!(cfg.as_ref().map(|c| c.projection.horizon_years), Some(25));
    }

    #[test]
    fn validation_catches_bad_orientation() {
        let mut cfg = ScenarioConfig::residential();
        cfg.location.orientation = "UP".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "location.orientation"));
    }

    #[test]
    fn validation_catches_bad_connection() {
        let mut cfg = ScenarioConfig::residential();
        cfg.tariff.connection_type = "QUADRIFÁSICO".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tariff.connection_type"));
    }

    #[test]
    fn validation_catches_simultaneity_out_of_range() {
        let mut cfg = ScenarioConfig::residential();
        cfg.premises.simultaneity_factor_pct = 130.0;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "premises.simultaneity_factor_pct")
        );
    }

    #[test]
    fn validation_catches_bad_start_tag() {
        let mut cfg = ScenarioConfig::residential();
        cfg.projection.start = Some("13/2026".to_string());
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "projection.start"));
    }

    #[test]
    fn validation_catches_inconsistent_tariff_split() {
        let mut cfg = ScenarioConfig::residential();
        cfg.assumptions.te_share = 0.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "assumptions.te_share"));
    }

    #[test]
    fn horizon_bound() {
        assert!(check_horizon("horizon", MAX_HORIZON_YEARS).is_ok());
        let err = check_horizon("horizon", 4_000_000_000);
        assert!(err.as_ref().is_err_and(|e| e.field == "horizon"));

        let mut cfg = ScenarioConfig::residential();
        cfg.projection.horizon_years = 101;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "projection.horizon_years"));
    }

    #[test]
    fn month_tag_parsing() {
        assert_eq!(parse_month_tag("01/2027"), Some((2027, 1)));
        assert_eq!(parse_month_tag(" 12/2030 "), Some((2030, 12)));
        assert_eq!(parse_month_tag("0/2030"), None);
        assert_eq!(parse_month_tag("2030-01"), None);
    }

    #[test]
    fn commercial_is_larger_than_residential() {
        let res = ScenarioConfig::residential();
        let com = ScenarioConfig::commercial();
        assert!(com.proposal.total_power_kw() > res.proposal.total_power_kw());
        assert!(com.premises.monthly_consumption_kwh > res.premises.monthly_consumption_kwh);
    }

    #[test]
    fn missing_factor_table_file_is_an_error() {
        let mut cfg = ScenarioConfig::residential();
        cfg.location.factor_table = Some(PathBuf::from("/nonexistent/factors.json"));
        assert!(cfg.factor_table().is_err());
    }
}
