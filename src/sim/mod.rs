//! Net-metering projection engine.

/// Monthly bill assembly.
pub mod billing;
/// Net-metering compensation and valuation.
pub mod compensation;
pub mod engine;
/// Consumption and generation projection.
pub mod projection;
pub mod summary;
/// Tariff indexation and the Fio B phase-in.
pub mod tariff;
pub mod types;
