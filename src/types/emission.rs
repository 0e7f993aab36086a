//! Plant telemetry samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::defaults::{GWP_CH4, GWP_N2O};

/// A non-negative measured magnitude with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    #[serde(default = "default_mass_unit")]
    pub unit: String,
}

impl Quantity {
    pub fn kg(value: f64) -> Self {
        Self {
            value,
            unit: default_mass_unit(),
        }
    }

    pub fn mwh(value: f64) -> Self {
        Self {
            value,
            unit: "MWh".to_string(),
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::kg(0.0)
    }
}

fn default_mass_unit() -> String {
    "kg".to_string()
}

/// Greenhouse gas masses emitted in one sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GasEmissions {
    pub co2: Quantity,
    #[serde(default)]
    pub ch4: Quantity,
    #[serde(default)]
    pub n2o: Quantity,
}

/// Fuel burned during the sample interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelConsumption {
    #[serde(rename = "type")]
    pub fuel_type: String,
    pub amount: f64,
    pub unit: String,
}

/// Efficiency percentages (0-100). Any of them may be unreported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    #[serde(default)]
    pub thermal: Option<f64>,
    #[serde(default)]
    pub electrical: Option<f64>,
    #[serde(default)]
    pub overall: Option<f64>,
}

/// Monetary cost figures attached to a sample (USD).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostFigures {
    #[serde(default)]
    pub fuel: Option<f64>,
    #[serde(default)]
    pub operation: Option<f64>,
    #[serde(default)]
    pub maintenance: Option<f64>,
    #[serde(default)]
    pub carbon_tax: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

/// One telemetry sample for a plant at an instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionRecord {
    #[serde(default)]
    pub id: String,
    pub plant_id: String,
    pub timestamp: DateTime<Utc>,
    pub emissions: GasEmissions,
    pub power_generation: Quantity,
    #[serde(default)]
    pub fuel_consumption: FuelConsumption,
    #[serde(default)]
    pub efficiency: Efficiency,
    /// kg CO2 per MWh, undefined when no power was generated
    #[serde(default)]
    pub carbon_intensity: Option<f64>,
    #[serde(default)]
    pub costs: CostFigures,
}

/// kg CO2 per MWh, or `None` when `power_mwh` is not positive.
pub fn carbon_intensity(co2_kg: f64, power_mwh: f64) -> Option<f64> {
    (power_mwh > 0.0).then(|| co2_kg / power_mwh)
}

impl EmissionRecord {
    /// Build a sample with the derived carbon intensity already filled in.
    pub fn new(
        plant_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        co2_kg: f64,
        power_mwh: f64,
    ) -> Self {
        let mut record = Self {
            id: String::new(),
            plant_id: plant_id.into(),
            timestamp,
            emissions: GasEmissions {
                co2: Quantity::kg(co2_kg),
                ..GasEmissions::default()
            },
            power_generation: Quantity::mwh(power_mwh),
            fuel_consumption: FuelConsumption::default(),
            efficiency: Efficiency::default(),
            carbon_intensity: None,
            costs: CostFigures::default(),
        };
        record.normalize();
        record
    }

    pub fn with_efficiency(mut self, overall: f64) -> Self {
        self.efficiency.overall = Some(overall);
        self
    }

    pub fn with_trace_gases(mut self, ch4_kg: f64, n2o_kg: f64) -> Self {
        self.emissions.ch4 = Quantity::kg(ch4_kg);
        self.emissions.n2o = Quantity::kg(n2o_kg);
        self
    }

    pub fn with_fuel(mut self, fuel_type: &str, amount: f64, unit: &str) -> Self {
        self.fuel_consumption = FuelConsumption {
            fuel_type: fuel_type.to_string(),
            amount,
            unit: unit.to_string(),
        };
        self
    }

    /// Recompute the derived carbon intensity from CO2 and power.
    pub fn normalize(&mut self) {
        self.carbon_intensity =
            carbon_intensity(self.emissions.co2.value, self.power_generation.value);
    }

    /// Validate magnitudes. Returns a list of problems, empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.plant_id.trim().is_empty() {
            problems.push("plantId must not be empty".to_string());
        }
        let magnitudes = [
            ("emissions.co2", self.emissions.co2.value),
            ("emissions.ch4", self.emissions.ch4.value),
            ("emissions.n2o", self.emissions.n2o.value),
            ("powerGeneration", self.power_generation.value),
            ("fuelConsumption.amount", self.fuel_consumption.amount),
        ];
        for (name, value) in magnitudes {
            if !value.is_finite() || value < 0.0 {
                problems.push(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        let c = &self.costs;
        let costs = [
            ("costs.fuel", c.fuel),
            ("costs.operation", c.operation),
            ("costs.maintenance", c.maintenance),
            ("costs.carbonTax", c.carbon_tax),
            ("costs.total", c.total),
        ];
        for (name, value) in costs {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    problems.push(format!("{name} must be a non-negative number, got {v}"));
                }
            }
        }
        let percentages = [
            ("efficiency.thermal", self.efficiency.thermal),
            ("efficiency.electrical", self.efficiency.electrical),
            ("efficiency.overall", self.efficiency.overall),
        ];
        for (name, value) in percentages {
            if let Some(v) = value {
                if !(0.0..=100.0).contains(&v) {
                    problems.push(format!("{name} must be within 0-100, got {v}"));
                }
            }
        }
        problems
    }

    /// CO2-equivalent mass using 100-year GWP factors.
    pub fn co2_equivalent(&self) -> f64 {
        self.emissions.co2.value
            + self.emissions.ch4.value * GWP_CH4
            + self.emissions.n2o.value * GWP_N2O
    }

    pub fn co2(&self) -> f64 {
        self.emissions.co2.value
    }

    pub fn power(&self) -> f64 {
        self.power_generation.value
    }
}
