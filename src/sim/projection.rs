//! Monthly consumption and generation projection.

/// Energy split of one projected month (kWh).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthProjection {
    /// Consumption after yearly scaling.
    pub consumption: f64,
    /// Generation after yearly degradation.
    pub generation: f64,
    /// `generation - consumption`; negative in a deficit month.
    pub net_generation: f64,
    /// Consumption served directly by the array, never touching the grid.
    pub instant_consumption: f64,
    /// Consumption drawn from the grid.
    pub used_from_grid: f64,
    /// Generation exported to the grid.
    pub injected_energy: f64,
}

/// Projects one calendar month `target_year - initial_year` years into the horizon.
///
/// `consumption_scaling_pct` and `generation_decrease_pct` are yearly percentages.
///
/// # Examples
///
/// ```
/// use proposal_sim::sim::projection::project_month;
///
/// let p = project_month(500.0, 762.0, 30.0, 2025, 2025, 0.0, 0.8);
/// assert_eq!(p.instant_consumption, 150.0);
/// assert_eq!(p.used_from_grid, 350.0);
/// assert_eq!(p.injected_energy, 612.0);
/// ```
pub fn project_month(
    ref_consumption: f64,
    ref_generation: f64,
    simultaneity_pct: f64,
    initial_year: i32,
    target_year: i32,
    consumption_scaling_pct: f64,
    generation_decrease_pct: f64,
) -> MonthProjection {
    let year_diff = target_year - initial_year;
    let consumption = ref_consumption * (1.0 + consumption_scaling_pct / 100.0).powi(year_diff);
    let generation = ref_generation * (1.0 - generation_decrease_pct / 100.0).powi(year_diff);

    let simultaneous_consumption = consumption * simultaneity_pct / 100.0;
    let instant_consumption = generation.min(simultaneous_consumption);

    MonthProjection {
        consumption,
        generation,
        net_generation: generation - consumption,
        instant_consumption,
        used_from_grid: consumption - instant_consumption,
        injected_energy: generation - instant_consumption,
    }
}

/// Twelve reference monthly values, January first.
pub type MonthlyProfile = [f64; 12];

/// Replicates one monthly average into all twelve months.
pub fn flat_profile(monthly_average: f64) -> MonthlyProfile {
    [monthly_average; 12]
}

/// Scales per-month yields (kWh/kWp) by installed power.
pub fn seasonal_profile(power_kw: f64, monthly_yield: &MonthlyProfile) -> MonthlyProfile {
    monthly_yield.map(|y| y * power_kw)
}
