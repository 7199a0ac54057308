//! Proposal scenarios: the public entry point and the stored-record adapter.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::location::GenerationFactorTable;
use crate::sim::engine::Engine;
use crate::sim::summary::ScenarioSummary;
use crate::sim::types::{Assumptions, ConnectionType, MonthlyRow, Orientation, SimulationInput};

/// Projection table plus its headline figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalScenarios {
    pub rows: Vec<MonthlyRow>,
    pub summary: ScenarioSummary,
}

/// Computes the economic scenario of a proposal.
///
/// Resolves the location's generation factors, runs the month-by-month
/// projection, and aggregates the summary. Never fails: missing data degrades
/// to defaults.
///
/// # Examples
///
/// ```
/// use proposal_sim::location::GenerationFactorTable;
/// use proposal_sim::proposal::sales_proposal_scenarios;
/// use proposal_sim::sim::types::{Assumptions, SimulationInput};
///
/// let input = SimulationInput {
///     investment: 20_000.0,
///     total_modules_power_kw: 6.0,
///     monthly_energy_consumption_kwh: 500.0,
///     energy_tariff: 0.95,
///     ..SimulationInput::default()
/// };
/// let s = sales_proposal_scenarios(&input, &GenerationFactorTable::embedded(), &Assumptions::default());
/// assert_eq!(s.rows.len(), 301);
/// ```
pub fn sales_proposal_scenarios(
    input: &SimulationInput,
    table: &GenerationFactorTable,
    assumptions: &Assumptions,
) -> ProposalScenarios {
    let factors = table.lookup(&input.location_city, &input.location_state, assumptions);
    let reference_generation = factors.reference_generation(
        input.total_modules_power_kw,
        input.orientation,
        input.seasonal_generation,
    );
    debug!(
        matched = factors.matched,
        yield_kwh_per_kwp = factors.monthly_yield(input.orientation),
        "resolved generation factors"
    );

    let engine = Engine::new(input.clone(), assumptions.clone(), reference_generation);
    let rows = engine.run();
    let summary = ScenarioSummary::from_rows(
        &rows,
        engine.input(),
        engine.reference_generation(),
        engine.assumptions(),
    );
    ProposalScenarios { rows, summary }
}

/// Coerces a stored value to a number; anything non-numeric becomes zero.
pub fn coerce_number(value: &Value) -> f64 {
    coerce_optional_number(value).unwrap_or(0.0)
}

fn coerce_optional_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().map_or(0.0, coerce_number))
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(coerce_optional_number))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// A `null` section reads as an empty one.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Product line of a stored proposal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub categoria: String,
    /// Unit power (W).
    #[serde(deserialize_with = "lenient_f64")]
    pub potencia: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub qtde: f64,
}

impl ProductRecord {
    /// Whether this line is a PV module (`"MÓDULO"`, `"modulos"`, ...).
    pub fn is_module(&self) -> bool {
        self.categoria
            .trim()
            .to_uppercase()
            .replace('Ó', "O")
            .starts_with("MODULO")
    }
}

/// Sizing premises stored with a proposal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PremisesRecord {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub orientacao: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub consumo_energia_mensal: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub tarifa_energia: f64,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub tarifa_fio_b: Option<f64>,
    /// Percent.
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub fator_simultaneidade: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub tipo_ligacao: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub custos_iluminacao_publica: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationRef {
    #[serde(deserialize_with = "lenient_string")]
    pub cidade: String,
    #[serde(deserialize_with = "lenient_string")]
    pub uf: String,
}

/// A proposal as persisted by the CRM, reduced to the fields the projection reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProposalRecord {
    /// Total proposal value.
    #[serde(deserialize_with = "lenient_f64")]
    pub valor: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub produtos: Vec<ProductRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub premissas: PremisesRecord,
    #[serde(deserialize_with = "null_as_default")]
    pub localizacao: LocationRef,
}

impl ProposalRecord {
    /// Parses a stored proposal from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error only if the text is not JSON or a section is neither
    /// an object (a list for `produtos`) nor `null`. Junk or `null` values
    /// inside a section are coerced to defaults.
    pub fn from_json_str(s: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Installed power of all module lines (kW).
    pub fn total_modules_power_kw(&self) -> f64 {
        self.produtos
            .iter()
            .filter(|p| p.is_module())
            .map(|p| p.potencia * p.qtde / 1000.0)
            .sum()
    }

    /// Number of modules across all module lines.
    pub fn module_count(&self) -> u32 {
        let count: f64 = self
            .produtos
            .iter()
            .filter(|p| p.is_module())
            .map(|p| p.qtde.max(0.0))
            .sum();
        count.round() as u32
    }

    /// Builds the projection input, filling gaps with defaults.
    pub fn to_input(&self, start_year: i32, start_month: u32) -> SimulationInput {
        let p = &self.premissas;
        let defaults = SimulationInput::default();
        SimulationInput {
            investment: self.valor,
            total_modules_power_kw: self.total_modules_power_kw(),
            module_count: self.module_count(),
            location_city: self.localizacao.cidade.clone(),
            location_state: self.localizacao.uf.clone(),
            orientation: p
                .orientacao
                .as_deref()
                .and_then(Orientation::parse)
                .unwrap_or_default(),
            monthly_energy_consumption_kwh: p.consumo_energia_mensal,
            energy_tariff: p.tarifa_energia,
            fio_b_tariff: p.tarifa_fio_b,
            connection_type: p
                .tipo_ligacao
                .as_deref()
                .and_then(ConnectionType::parse)
                .unwrap_or_default(),
            simultaneity_factor_pct: p
                .fator_simultaneidade
                .unwrap_or(defaults.simultaneity_factor_pct),
            public_lighting_cost: p.custos_iluminacao_publica,
            start_year,
            start_month,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "valor": 20000,
        "produtos": [
            {"categoria": "MÓDULO", "potencia": 550, "qtde": 10},
            {"categoria": "MÓDULO", "potencia": "500", "qtde": 1},
            {"categoria": "INVERSOR", "potencia": 5000, "qtde": 1}
        ],
        "premissas": {
            "orientacao": "NORTE",
            "consumoEnergiaMensal": "500",
            "tarifaEnergia": 0.95,
            "fatorSimultaneidade": 30,
            "tipoLigacao": "BIFÁSICO",
            "custosIluminacaoPublica": 20
        },
        "localizacao": {"cidade": "NOWHERE", "uf": "XX"}
    }"#;

    #[test]
    fn coercion_defaults_junk_to_zero() {
        assert_eq!(coerce_number(&Value::String("abc".into())), 0.0);
        assert_eq!(coerce_number(&Value::Null), 0.0);
        assert_eq!(coerce_number(&Value::String(" 12,5 ".into())), 12.5);
        assert_eq!(coerce_number(&serde_json::json!(7)), 7.0);
    }

    #[test]
    fn record_maps_to_input() {
        let record = ProposalRecord::from_json_str(RECORD).ok();
        let input = record.as_ref().map(|r| r.to_input(2026, 3));
        let input = input.as_ref();
        assert_eq!(input.map(|i| i.investment), Some(20_000.0));
        assert_eq!(input.map(|i| i.total_modules_power_kw), Some(6.0));
        assert_eq!(input.map(|i| i.module_count), Some(11));
        assert_eq!(input.map(|i| i.monthly_energy_consumption_kwh), Some(500.0));
        assert_eq!(input.map(|i| i.connection_type), Some(ConnectionType::Bifasico));
        assert_eq!(input.map(|i| i.start_month), Some(3));
    }

    #[test]
    fn incomplete_record_still_projects() {
        let record = ProposalRecord::from_json_str(
            r#"{"valor": "n/a", "premissas": {"tarifaEnergia": null, "orientacao": "CIMA"}}"#,
        )
        .ok();
        let input = record.map(|r| r.to_input(2026, 1)).unwrap_or_default();
        assert_eq!(input.investment, 0.0);
        assert_eq!(input.orientation, Orientation::Norte);
        assert_eq!(input.simultaneity_factor_pct, 30.0);

        let s = sales_proposal_scenarios(
            &input,
            &GenerationFactorTable::embedded(),
            &Assumptions::default(),
        );
        assert_eq!(s.rows.len(), 301);
        assert!(s.rows.iter().all(|r| r.energy_bill_value.is_finite()));
    }

    #[test]
    fn null_and_mistyped_fields_fall_back_to_defaults() {
        let records = [
            r#"{"produtos": [{"categoria": null, "potencia": 550, "qtde": 10}]}"#,
            r#"{"produtos": null}"#,
            r#"{"premissas": null}"#,
            r#"{"localizacao": {"cidade": null, "uf": null}}"#,
            r#"{"localizacao": null}"#,
            r#"{"premissas": {"orientacao": 3, "tipoLigacao": null}}"#,
            r#"{"produtos": [{"categoria": 7}], "localizacao": {"cidade": 12, "uf": false}}"#,
        ];
        for raw in records {
            let record = ProposalRecord::from_json_str(raw);
            assert!(record.is_ok(), "{raw} should parse: {:?}", record.err());
            let input = record.map(|r| r.to_input(2026, 1)).unwrap_or_default();
            assert_eq!(input.orientation, Orientation::Norte);
            assert_eq!(input.connection_type, ConnectionType::Bifasico);

            let s = sales_proposal_scenarios(
                &input,
                &GenerationFactorTable::embedded(),
                &Assumptions::default(),
            );
            assert_eq!(s.rows.len(), 301, "{raw} should project a full table");
        }

        let record = ProposalRecord::from_json_str(records[0]).unwrap_or_default();
        assert_eq!(record.produtos.len(), 1);
        assert_eq!(record.produtos[0].categoria, "");
        assert!(!record.produtos[0].is_module());
    }

    #[test]
    fn wrong_section_shape_is_an_error() {
        assert!(ProposalRecord::from_json_str(r#"{"premissas": "none"}"#).is_err());
        assert!(ProposalRecord::from_json_str(r#"{"produtos": 5}"#).is_err());
        assert!(ProposalRecord::from_json_str("not json").is_err());
    }

    #[test]
    fn module_category_spellings() {
        for c in ["MÓDULO", "modulo", "Módulos", " MODULOS "] {
            let p = ProductRecord {
                categoria: c.to_string(),
                ..ProductRecord::default()
            };
            assert!(p.is_module(), "{c} should be a module");
        }
        let inverter = ProductRecord {
            categoria: "INVERSOR".to_string(),
            ..ProductRecord::default()
        };
        assert!(!inverter.is_module());
    }

    #[test]
    fn scenario_serializes_with_camel_case_fields() {
        let input = SimulationInput {
            horizon_years: 1,
            ..SimulationInput::default()
        };
        let s = sales_proposal_scenarios(
            &input,
            &GenerationFactorTable::default(),
            &Assumptions::default(),
        );
        let json = serde_json::to_value(&s).unwrap_or_default();
        let row = &json["rows"][0];
        for key in [
            "consumptionKwh",
            "generationKwh",
            "cumulatedBalanceKwh",
            "nonCompensatedEnergyCost",
            "compensatedEnergyCost",
            "energyBillValue",
            "conventionalEnergyBill",
            "savedValue",
            "payback",
            "tag",
        ] {
            assert!(row.get(key).is_some(), "missing {key}");
        }
        assert!(json["summary"].get("estimatedAnnualGenerationKwh").is_some());
    }
}
