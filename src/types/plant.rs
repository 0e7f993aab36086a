//! Generation facilities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generation technology. Drives which benchmark and cost tables apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantType {
    Coal,
    NaturalGas,
    Oil,
    Biomass,
    WasteToEnergy,
    /// Anything the store holds that is not one of the known types.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for PlantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlantType::Coal => write!(f, "coal"),
            PlantType::NaturalGas => write!(f, "natural_gas"),
            PlantType::Oil => write!(f, "oil"),
            PlantType::Biomass => write!(f, "biomass"),
            PlantType::WasteToEnergy => write!(f, "waste_to_energy"),
            PlantType::Unknown => write!(f, "unknown"),
        }
    }
}

/// A thermal generation facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub plant_type: PlantType,
    /// Nameplate capacity (MW)
    #[serde(rename = "capacityMW")]
    pub capacity_mw: f64,
    /// Design overall efficiency (%)
    #[serde(default = "default_efficiency_baseline")]
    pub efficiency_baseline: f64,
    /// Design carbon intensity (kg CO2/MWh)
    #[serde(default = "default_carbon_intensity_baseline")]
    pub carbon_intensity_baseline: f64,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub commissioning_date: Option<DateTime<Utc>>,
}

fn default_efficiency_baseline() -> f64 {
    35.0
}

fn default_carbon_intensity_baseline() -> f64 {
    800.0
}

impl Plant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, plant_type: PlantType, capacity_mw: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plant_type,
            capacity_mw,
            efficiency_baseline: default_efficiency_baseline(),
            carbon_intensity_baseline: default_carbon_intensity_baseline(),
            fuel_type: None,
            commissioning_date: None,
        }
    }

    /// Whole years in service, counted in 365-day years. Zero when the
    /// commissioning date is unknown or in the future.
    pub fn age_years(&self, now: DateTime<Utc>) -> u32 {
        self.commissioning_date
            .map(|commissioned| (now - commissioned).num_days().max(0) / 365)
            .and_then(|years| u32::try_from(years).ok())
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("name must not be empty".to_string());
        }
        if !self.capacity_mw.is_finite() || self.capacity_mw < 0.0 {
            problems.push(format!("capacityMW must be non-negative, got {}", self.capacity_mw));
        }
        if !(0.0..=100.0).contains(&self.efficiency_baseline) {
            problems.push(format!(
                "efficiencyBaseline must be within 0-100, got {}",
                self.efficiency_baseline
            ));
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_unknown_plant_type_deserializes() {
        let t: PlantType = serde_json::from_str("\"geothermal\"").unwrap();
        assert_eq!(t, PlantType::Unknown);
        let t: PlantType = serde_json::from_str("\"natural_gas\"").unwrap();
        assert_eq!(t, PlantType::NaturalGas);
    }

    #[test]
    fn test_age_years() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut plant = Plant::new("p1", "North", PlantType::Coal, 500.0);
        assert_eq!(plant.age_years(now), 0);

        plant.commissioning_date = Some(now - Duration::days(365 * 22 + 10));
        assert_eq!(plant.age_years(now), 22);

        plant.commissioning_date = Some(now + Duration::days(30));
        assert_eq!(plant.age_years(now), 0);
    }

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let json = r#"{"name": "Delta", "plantType": "oil", "capacityMW": 120.0}"#;
        let plant: Plant = serde_json::from_str(json).unwrap();
        assert_eq!(plant.efficiency_baseline, 35.0);
        assert_eq!(plant.carbon_intensity_baseline, 800.0);
        assert!(plant.validate().is_empty());
    }
}
