//! Year-indexed energy and Fio B tariffs.

use super::types::Assumptions;

/// Inflates `start_tariff` by compound yearly `inflation` from `initial_year` to `target_year`.
///
/// A negative year difference deflates instead of failing.
///
/// # Examples
///
/// ```
/// use proposal_sim::sim::tariff::index_energy_tariff;
///
/// let t = index_energy_tariff(1.0, 2025, 2027, 0.05);
/// assert!((t - 1.1025).abs() < 1e-12);
/// ```
pub fn index_energy_tariff(
    start_tariff: f64,
    initial_year: i32,
    target_year: i32,
    inflation: f64,
) -> f64 {
    start_tariff * (1.0 + inflation).powi(target_year - initial_year)
}

/// Fraction of Fio B charged on compensated energy in `year`.
///
/// Zero up to the base year, one step per year afterwards, and the full
/// charge from `fio_b_full_year` onwards.
pub fn fio_b_progress(year: i32, assumptions: &Assumptions) -> f64 {
    if year >= assumptions.fio_b_full_year {
        return 1.0;
    }
    let years_since_base = year - assumptions.fio_b_phase_in_base_year;
    if years_since_base <= 0 {
        return 0.0;
    }
    assumptions.fio_b_phase_in_step * f64::from(years_since_base)
}

/// Indexes the nominal Fio B tariff like the full tariff, then applies the phase-in.
pub fn index_fio_b_tariff(
    start_tariff: f64,
    start_fio_b_tariff: f64,
    initial_year: i32,
    target_year: i32,
    assumptions: &Assumptions,
) -> f64 {
    let indexed = index_energy_tariff(
        start_tariff,
        initial_year,
        target_year,
        assumptions.inflation(),
    );
    let denominator = if start_tariff == 0.0 { 1.0 } else { start_tariff };
    let nominal = start_fio_b_tariff * indexed / denominator;
    nominal * fio_b_progress(target_year, assumptions)
}
