//! Core projection types: simulation input, business assumptions, and monthly rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Roof/array orientation of the installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    #[default]
    Norte,
    Sul,
    Leste,
    Oeste,
    Nordeste,
    Noroeste,
    Sudeste,
    Sudoeste,
}

impl Orientation {
    /// All orientations in table order.
    pub const ALL: [Orientation; 8] = [
        Orientation::Norte,
        Orientation::Sul,
        Orientation::Leste,
        Orientation::Oeste,
        Orientation::Nordeste,
        Orientation::Noroeste,
        Orientation::Sudeste,
        Orientation::Sudoeste,
    ];

    /// Upper-case key used by stored proposals and the factor table.
    pub fn as_key(self) -> &'static str {
        match self {
            Orientation::Norte => "NORTE",
            Orientation::Sul => "SUL",
            Orientation::Leste => "LESTE",
            Orientation::Oeste => "OESTE",
            Orientation::Nordeste => "NORDESTE",
            Orientation::Noroeste => "NOROESTE",
            Orientation::Sudeste => "SUDESTE",
            Orientation::Sudoeste => "SUDOESTE",
        }
    }

    /// Parses a stored orientation string, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_uppercase();
        Self::ALL.into_iter().find(|o| o.as_key() == key)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Grid connection type, which sets the minimum billable energy per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionType {
    Monofasico,
    #[default]
    Bifasico,
    Trifasico,
}

impl ConnectionType {
    /// Availability charge expressed in kWh-equivalent.
    pub fn minimum_kwh(self) -> f64 {
        match self {
            ConnectionType::Monofasico => 30.0,
            ConnectionType::Bifasico => 50.0,
            ConnectionType::Trifasico => 100.0,
        }
    }

    /// Parses `"MONOFÁSICO"`, `"BIFASICO"`, `"trifásico"` and similar spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| match c {
                'Á' | 'À' | 'Â' | 'Ã' => 'A',
                other => other,
            })
            .collect();
        match key.as_str() {
            "MONOFASICO" => Some(ConnectionType::Monofasico),
            "BIFASICO" => Some(ConnectionType::Bifasico),
            "TRIFASICO" => Some(ConnectionType::Trifasico),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionType::Monofasico => "MONOFÁSICO",
            ConnectionType::Bifasico => "BIFÁSICO",
            ConnectionType::Trifasico => "TRIFÁSICO",
        })
    }
}

/// Business and regulatory assumptions of the projection.
///
/// Defaults reproduce the values the sales team has always quoted with; every
/// field can be overridden per scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Assumptions {
    /// Yearly tariff inflation, percent.
    pub tariff_inflation_pct: f64,
    /// Share of the full tariff that is the energy component (TE).
    pub te_share: f64,
    /// Share of the full tariff that is the distribution component (TUSD).
    pub tusd_share: f64,
    /// Share of TUSD billed as Fio B, used only when no Fio B tariff is supplied.
    pub fio_b_share_of_tusd: f64,
    /// Area occupied by one module, m².
    pub module_area_m2: f64,
    /// Last year before the Fio B phase-in starts.
    pub fio_b_phase_in_base_year: i32,
    /// Fraction of Fio B added per phase-in year.
    pub fio_b_phase_in_step: f64,
    /// First year Fio B is charged in full.
    pub fio_b_full_year: i32,
    /// Monthly yield per kWp used when the location is not in the factor table.
    pub default_generation_factor: f64,
    /// Per-orientation monthly yield used when the location is not in the factor table.
    pub default_orientation_factor: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            tariff_inflation_pct: 5.0,
            te_share: 0.35,
            tusd_share: 0.65,
            fio_b_share_of_tusd: 0.28,
            module_area_m2: 2.4,
            fio_b_phase_in_base_year: 2022,
            fio_b_phase_in_step: 0.15,
            fio_b_full_year: 2029,
            default_generation_factor: 127.0,
            default_orientation_factor: 120.0,
        }
    }
}

impl Assumptions {
    /// Yearly inflation as a fraction.
    pub fn inflation(&self) -> f64 {
        self.tariff_inflation_pct / 100.0
    }
}

/// Caller-supplied proposal parameters, immutable for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    /// Total proposal value (payback baseline).
    pub investment: f64,
    /// Installed nameplate DC power (kW).
    pub total_modules_power_kw: f64,
    /// Number of modules, for the area estimate.
    pub module_count: u32,
    pub location_city: String,
    pub location_state: String,
    pub orientation: Orientation,
    /// Baseline monthly consumption (kWh).
    pub monthly_energy_consumption_kwh: f64,
    /// Current full tariff, TE + TUSD (money/kWh).
    pub energy_tariff: f64,
    /// Current nominal Fio B tariff (money/kWh). Derived from the tariff split when `None`.
    pub fio_b_tariff: Option<f64>,
    pub connection_type: ConnectionType,
    /// Share of consumption that coincides with generation, percent.
    pub simultaneity_factor_pct: f64,
    /// Fixed monthly addition to every bill.
    pub public_lighting_cost: f64,
    pub horizon_years: u32,
    /// Yearly consumption growth, percent.
    pub yearly_consumption_scaling_pct: f64,
    /// Yearly panel degradation, percent.
    pub yearly_generation_decrease_pct: f64,
    /// Calendar year of the first projected month.
    pub start_year: i32,
    /// Calendar month (1-12) of the first projected month.
    pub start_month: u32,
    /// Use per-month location factors instead of the flat average when available.
    pub seasonal_generation: bool,
}

impl Default for SimulationInput {
    fn default() -> Self {
        Self {
            investment: 0.0,
            total_modules_power_kw: 0.0,
            module_count: 0,
            location_city: String::new(),
            location_state: String::new(),
            orientation: Orientation::Norte,
            monthly_energy_consumption_kwh: 0.0,
            energy_tariff: 0.0,
            fio_b_tariff: None,
            connection_type: ConnectionType::Bifasico,
            simultaneity_factor_pct: 30.0,
            public_lighting_cost: 0.0,
            horizon_years: 25,
            yearly_consumption_scaling_pct: 0.0,
            yearly_generation_decrease_pct: 0.8,
            start_year: 2025,
            start_month: 1,
            seasonal_generation: false,
        }
    }
}

impl SimulationInput {
    /// Number of rows the projection produces (`horizon_years * 12 + 1`).
    pub fn row_count(&self) -> usize {
        self.horizon_years as usize * 12 + 1
    }

    /// Nominal Fio B tariff at the start year.
    pub fn start_fio_b_tariff(&self, assumptions: &Assumptions) -> f64 {
        self.fio_b_tariff.unwrap_or(
            self.energy_tariff * assumptions.tusd_share * assumptions.fio_b_share_of_tusd,
        )
    }

    /// Start month clamped to a valid calendar month.
    pub fn start_month_clamped(&self) -> u32 {
        self.start_month.clamp(1, 12)
    }
}

/// One projected month of the proposal table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    pub year: i32,
    pub month: u32,
    /// `"MM/YYYY"`.
    pub tag: String,
    pub consumption_kwh: f64,
    pub generation_kwh: f64,
    pub used_from_grid_kwh: f64,
    pub injected_energy_kwh: f64,
    pub compensated_energy_kwh: f64,
    /// Indexed full tariff applied this month.
    pub energy_tariff: f64,
    /// Indexed and phased-in Fio B tariff applied this month.
    pub fio_b_tariff: f64,
    pub non_compensated_energy_cost: f64,
    /// Fio B charged on compensated energy (network cost).
    pub compensated_energy_cost: f64,
    pub availability_cost: f64,
    /// Net-metering credit carried to the next month (never negative).
    pub cumulated_balance_kwh: f64,
    pub energy_bill_value: f64,
    pub conventional_energy_bill: f64,
    pub saved_value: f64,
    /// Running value starting at `-investment`.
    pub payback: f64,
}

impl MonthlyRow {
    /// Formats a `"MM/YYYY"` tag.
    pub fn tag_for(year: i32, month: u32) -> String {
        format!("{month:02}/{year}")
    }
}

impl fmt::Display for MonthlyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | cons={:>8.1} kWh  gen={:>8.1} kWh  bal={:>8.1} kWh | \
             bill={:>9.2}  conv={:>9.2}  saved={:>9.2} | payback={:>11.2}",
            self.tag,
            self.consumption_kwh,
            self.generation_kwh,
            self.cumulated_balance_kwh,
            self.energy_bill_value,
            self.conventional_energy_bill,
            self.saved_value,
            self.payback,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_minimums() {
        assert_eq!(ConnectionType::Monofasico.minimum_kwh(), 30.0);
        assert_eq!(ConnectionType::Bifasico.minimum_kwh(), 50.0);
        assert_eq!(ConnectionType::Trifasico.minimum_kwh(), 100.0);
    }

    #[test]
    fn connection_parse_accepts_accents() {
        assert_eq!(
            ConnectionType::parse("BIFÁSICO"),
            Some(ConnectionType::Bifasico)
        );
        assert_eq!(
            ConnectionType::parse(" monofasico "),
            Some(ConnectionType::Monofasico)
        );
        assert_eq!(
            ConnectionType::parse("Trifásico"),
            Some(ConnectionType::Trifasico)
        );
        assert_eq!(ConnectionType::parse("QUADRIFASICO"), None);
    }

    #[test]
    fn orientation_parse() {
        assert_eq!(Orientation::parse("nordeste"), Some(Orientation::Nordeste));
        assert_eq!(Orientation::parse("SUDOESTE"), Some(Orientation::Sudoeste));
        assert_eq!(Orientation::parse("UP"), None);
    }

    #[test]
    fn row_count_includes_closing_month() {
        let input = SimulationInput::default();
        assert_eq!(input.row_count(), 301);
        let one = SimulationInput {
            horizon_years: 1,
            ..SimulationInput::default()
        };
        assert_eq!(one.row_count(), 13);
    }

    #[test]
    fn derived_fio_b_uses_tariff_split() {
        let input = SimulationInput {
            energy_tariff: 1.0,
            ..SimulationInput::default()
        };
        let a = Assumptions::default();
        assert!((input.start_fio_b_tariff(&a) - 0.65 * 0.28).abs() < 1e-12);

        let explicit = SimulationInput {
            energy_tariff: 1.0,
            fio_b_tariff: Some(0.2),
            ..SimulationInput::default()
        };
        assert_eq!(explicit.start_fio_b_tariff(&a), 0.2);
    }

    #[test]
    fn tag_is_zero_padded() {
        assert_eq!(MonthlyRow::tag_for(2026, 3), "03/2026");
        assert_eq!(MonthlyRow::tag_for(2030, 12), "12/2030");
    }
}
