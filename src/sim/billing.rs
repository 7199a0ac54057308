//! Monthly bill assembly against the availability floor.

use super::types::ConnectionType;

/// Inputs to one month's bill, all at that month's indexed tariffs.
#[derive(Debug, Clone, Copy)]
pub struct BillInputs {
    /// Month's consumption (kWh).
    pub consumption: f64,
    /// Consumption drawn from the grid (kWh).
    pub used_from_grid: f64,
    /// Grid draw offset by credits (kWh).
    pub compensated_energy: f64,
    /// Fio B charged on compensated energy.
    pub network_cost: f64,
    /// Indexed full tariff.
    pub energy_tariff: f64,
    pub connection_type: ConnectionType,
    pub public_lighting_cost: f64,
}

/// Monetary breakdown of one month's bill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyBill {
    pub non_compensated_cost: f64,
    pub network_cost: f64,
    /// Minimum billable value for the connection type.
    pub availability_cost: f64,
    /// Bill with solar: floor applied, public lighting added on top.
    pub energy_bill_value: f64,
    /// Bill the customer would pay without solar.
    pub conventional_bill: f64,
    pub saved_value: f64,
}

/// Computes the bill with and without solar.
///
/// Public lighting is added after the availability floor, so it is never
/// absorbed by it.
pub fn compute_monthly_bill(inputs: &BillInputs) -> MonthlyBill {
    let non_compensated = inputs.used_from_grid - inputs.compensated_energy;
    let non_compensated_cost = non_compensated.max(0.0) * inputs.energy_tariff;
    let overall_energy_cost = non_compensated_cost + inputs.network_cost;

    let availability_cost = inputs.connection_type.minimum_kwh() * inputs.energy_tariff;
    let energy_bill_value =
        availability_cost.max(overall_energy_cost) + inputs.public_lighting_cost;
    let conventional_bill =
        inputs.energy_tariff * inputs.consumption + inputs.public_lighting_cost;

    MonthlyBill {
        non_compensated_cost,
        network_cost: inputs.network_cost,
        availability_cost,
        energy_bill_value,
        conventional_bill,
        saved_value: conventional_bill - energy_bill_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> BillInputs {
        BillInputs {
            consumption: 500.0,
            used_from_grid: 350.0,
            compensated_energy: 300.0,
            network_cost: 12.0,
            energy_tariff: 1.0,
            connection_type: ConnectionType::Bifasico,
            public_lighting_cost: 20.0,
        }
    }

    #[test]
    fn bill_above_floor() {
        let mut i = inputs();
        i.compensated_energy = 200.0;
        let b = compute_monthly_bill(&i);
        assert_eq!(b.non_compensated_cost, 150.0);
        assert_eq!(b.energy_bill_value, 162.0 + 20.0);
        assert_eq!(b.conventional_bill, 520.0);
        assert_eq!(b.saved_value, 520.0 - 182.0);
    }

    #[test]
    fn availability_floor_applies_before_lighting() {
        // only the 12.0 network cost remains, below the 50 kWh floor
        let mut i = inputs();
        i.compensated_energy = 350.0;
        let b = compute_monthly_bill(&i);
        assert_eq!(b.availability_cost, 50.0);
        assert_eq!(b.energy_bill_value, 50.0 + 20.0);
    }

    #[test]
    fn over_compensation_is_not_negative_cost() {
        let mut i = inputs();
        i.compensated_energy = 900.0;
        let b = compute_monthly_bill(&i);
        assert_eq!(b.non_compensated_cost, 0.0);
    }

    #[test]
    fn zero_month_pays_the_floor() {
        let i = BillInputs {
            consumption: 0.0,
            used_from_grid: 0.0,
            compensated_energy: 0.0,
            network_cost: 0.0,
            energy_tariff: 0.9,
            connection_type: ConnectionType::Trifasico,
            public_lighting_cost: 15.0,
        };
        let b = compute_monthly_bill(&i);
        assert!((b.energy_bill_value - (90.0 + 15.0)).abs() < 1e-9);
        assert!((b.conventional_bill - 15.0).abs() < 1e-9);
        assert!((b.saved_value + 90.0).abs() < 1e-9);
    }
}
