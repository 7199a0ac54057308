//! Location generation-factor table.
//!
//! Monthly yield per installed kWp, keyed by exact city and state. Locations
//! missing from the table fall back to the default factors so that every
//! proposal still gets a projection.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::sim::projection::{MonthlyProfile, flat_profile, seasonal_profile};
use crate::sim::types::{Assumptions, Orientation};

const EMBEDDED_TABLE: &str = include_str!("../data/generation_factors.json");

/// One table record as stored in the factor JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRecord {
    pub cidade: String,
    pub uf: String,
    /// Average monthly yield (kWh/kWp).
    pub fator_geracao: f64,
    /// Average monthly yield per orientation (kWh/kWp).
    #[serde(default)]
    pub orientacoes: HashMap<Orientation, f64>,
    /// Per-month yield, January first (kWh/kWp).
    #[serde(default)]
    pub por_mes: Option<MonthlyProfile>,
}

/// Factors resolved for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFactors {
    pub generation_factor: f64,
    pub orientation_factors: HashMap<Orientation, f64>,
    pub monthly_factors: Option<MonthlyProfile>,
    /// Whether the location was found in the table.
    pub matched: bool,
}

impl LocationFactors {
    /// Factors used when a location is not in the table.
    pub fn fallback(assumptions: &Assumptions) -> Self {
        Self {
            generation_factor: assumptions.default_generation_factor,
            orientation_factors: Orientation::ALL
                .into_iter()
                .map(|o| (o, assumptions.default_orientation_factor))
                .collect(),
            monthly_factors: None,
            matched: false,
        }
    }

    /// Average monthly yield (kWh/kWp) for an orientation.
    ///
    /// Uses the orientation factor when the record has one, otherwise the
    /// location's general factor.
    pub fn monthly_yield(&self, orientation: Orientation) -> f64 {
        self.orientation_factors
            .get(&orientation)
            .copied()
            .unwrap_or(self.generation_factor)
    }

    /// Reference generation for each calendar month (kWh).
    ///
    /// Flat average by default. With `seasonal` set and per-month data
    /// present, the monthly shape is kept and rescaled so its mean matches the
    /// orientation yield.
    pub fn reference_generation(
        &self,
        power_kw: f64,
        orientation: Orientation,
        seasonal: bool,
    ) -> MonthlyProfile {
        let average_yield = self.monthly_yield(orientation);
        match (&self.monthly_factors, seasonal) {
            (Some(months), true) => {
                let mean = months.iter().sum::<f64>() / 12.0;
                let scale = if mean == 0.0 { 0.0 } else { average_yield / mean };
                seasonal_profile(power_kw, &months.map(|m| m * scale))
            }
            _ => flat_profile(power_kw * average_yield),
        }
    }
}

/// Immutable generation-factor lookup table.
#[derive(Debug, Clone, Default)]
pub struct GenerationFactorTable {
    records: Vec<LocationRecord>,
}

impl GenerationFactorTable {
    /// Table compiled into the crate.
    ///
    /// An unreadable embedded table degrades to an empty one, which resolves
    /// every location to the fallback factors.
    pub fn embedded() -> Self {
        match Self::from_json_str(EMBEDDED_TABLE) {
            Ok(table) => table,
            Err(e) => {
                warn!("embedded generation factor table is invalid: {e}");
                Self::default()
            }
        }
    }

    /// Parses a table from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the JSON does not match the record layout.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let records: Vec<LocationRecord> = serde_json::from_str(s)?;
        Ok(Self { records })
    }

    /// Loads a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::File {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_json_str(&content)?;
        debug!(path = %path.display(), records = table.len(), "loaded generation factors");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolves factors for an exact city and state match.
    pub fn lookup(&self, city: &str, state: &str, assumptions: &Assumptions) -> LocationFactors {
        match self
            .records
            .iter()
            .find(|r| r.cidade == city && r.uf == state)
        {
            Some(r) => LocationFactors {
                generation_factor: r.fator_geracao,
                orientation_factors: r.orientacoes.clone(),
                monthly_factors: r.por_mes,
                matched: true,
            },
            None => {
                debug!(city, state, "location not in factor table, using defaults");
                LocationFactors::fallback(assumptions)
            }
        }
    }
}
