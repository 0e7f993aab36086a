//! Cost-reduction analyses: breakdown-driven recommendations, the
//! opportunity catalogue, fuel, maintenance and carbon-tax reviews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cost::CostModel;
use crate::config::CostConfig;
use crate::types::{
    CostBreakdown, EmissionRecord, Level, Plant, PlantType, PotentialSavings, Priority,
    Recommendation, RecommendationKind,
};

/// Fuel share above which fuel optimization is recommended (%).
const FUEL_SHARE_ALERT_PERCENT: f64 = 50.0;
/// Maintenance share above which predictive maintenance is recommended (%).
const MAINTENANCE_SHARE_ALERT_PERCENT: f64 = 20.0;
/// Carbon tax above which emission reduction is recommended (USD).
const CARBON_TAX_ALERT_USD: f64 = 100_000.0;
/// Plants older than this get life-extension strategies (years).
const AGEING_PLANT_YEARS: u32 = 20;

// ============================================================================
// Breakdown-driven recommendations
// ============================================================================

pub fn breakdown_recommendations(breakdown: &CostBreakdown) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if breakdown.fuel.percentage.unwrap_or(0.0) > FUEL_SHARE_ALERT_PERCENT {
        out.push(Recommendation {
            kind: RecommendationKind::Fuel,
            priority: Priority::High,
            title: "Optimize Fuel Costs".to_string(),
            description: "Fuel costs represent the largest expense. Consider fuel switching or quality optimization.".to_string(),
            potential_savings: Some(PotentialSavings::Amount(breakdown.fuel.amount * 0.15)),
            action: "Implement fuel optimization strategies".to_string(),
            confidence: None,
        });
    }

    if breakdown.maintenance.percentage.unwrap_or(0.0) > MAINTENANCE_SHARE_ALERT_PERCENT {
        out.push(Recommendation {
            kind: RecommendationKind::Maintenance,
            priority: Priority::Medium,
            title: "Optimize Maintenance Costs".to_string(),
            description: "High maintenance costs detected. Consider predictive maintenance.".to_string(),
            potential_savings: Some(PotentialSavings::Amount(breakdown.maintenance.amount * 0.2)),
            action: "Implement predictive maintenance system".to_string(),
            confidence: None,
        });
    }

    if breakdown.carbon_tax.amount > CARBON_TAX_ALERT_USD {
        out.push(Recommendation {
            kind: RecommendationKind::Emissions,
            priority: Priority::High,
            title: "Reduce Carbon Tax Burden".to_string(),
            description: "High carbon tax costs. Implement emission reduction measures.".to_string(),
            potential_savings: Some(PotentialSavings::Amount(breakdown.carbon_tax.amount * 0.5)),
            action: "Implement carbon reduction strategies".to_string(),
            confidence: None,
        });
    }

    out
}

// ============================================================================
// Opportunity catalogue
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityCategory {
    Fuel,
    Efficiency,
    Maintenance,
    Emissions,
}

impl std::str::FromStr for OpportunityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fuel" => Ok(Self::Fuel),
            "efficiency" => Ok(Self::Efficiency),
            "maintenance" => Ok(Self::Maintenance),
            "emissions" => Ok(Self::Emissions),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Percent improvements an opportunity is expected to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityImpact {
    pub cost_reduction: f64,
    pub emission_reduction: f64,
    pub efficiency_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: &'static str,
    pub title: &'static str,
    pub category: OpportunityCategory,
    pub priority: Priority,
    pub description: &'static str,
    pub annual_savings: f64,
    pub investment: f64,
    pub roi: f64,
    /// Months
    pub implementation_time: f64,
    pub risk: Level,
    pub impact: OpportunityImpact,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitySummary {
    pub total: usize,
    pub total_potential_savings: f64,
    pub average_roi: f64,
    /// Opportunities deliverable within six months
    pub quick_wins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityReport {
    pub opportunities: Vec<Opportunity>,
    /// Computed over the whole catalogue, not the filtered list
    pub summary: OpportunitySummary,
}

/// Months within which an opportunity counts as a quick win.
const QUICK_WIN_MONTHS: f64 = 6.0;

/// The fixed cost-reduction catalogue.
pub fn opportunity_catalogue() -> Vec<Opportunity> {
    vec![
        Opportunity {
            id: "fuel-optimization",
            title: "Fuel Quality and Blending Optimization",
            category: OpportunityCategory::Fuel,
            priority: Priority::High,
            description: "Optimize fuel quality and implement advanced blending strategies",
            annual_savings: 500_000.0,
            investment: 200_000.0,
            roi: 2.5,
            implementation_time: 3.0,
            risk: Level::Low,
            impact: OpportunityImpact {
                cost_reduction: 15.0,
                emission_reduction: 8.0,
                efficiency_gain: 5.0,
            },
        },
        Opportunity {
            id: "efficiency-improvement",
            title: "Boiler and Turbine Efficiency Upgrade",
            category: OpportunityCategory::Efficiency,
            priority: Priority::High,
            description: "Implement advanced control systems and heat recovery",
            annual_savings: 800_000.0,
            investment: 1_500_000.0,
            roi: 0.53,
            implementation_time: 8.0,
            risk: Level::Medium,
            impact: OpportunityImpact {
                cost_reduction: 20.0,
                emission_reduction: 15.0,
                efficiency_gain: 12.0,
            },
        },
        Opportunity {
            id: "maintenance-optimization",
            title: "Predictive Maintenance Implementation",
            category: OpportunityCategory::Maintenance,
            priority: Priority::Medium,
            description: "Implement AI-powered predictive maintenance system",
            annual_savings: 300_000.0,
            investment: 500_000.0,
            roi: 0.6,
            implementation_time: 6.0,
            risk: Level::Low,
            impact: OpportunityImpact {
                cost_reduction: 10.0,
                emission_reduction: 5.0,
                efficiency_gain: 3.0,
            },
        },
        Opportunity {
            id: "carbon-capture",
            title: "Carbon Capture and Utilization",
            category: OpportunityCategory::Emissions,
            priority: Priority::Medium,
            description: "Implement CCU technology for value-added products",
            annual_savings: 1_200_000.0,
            investment: 10_000_000.0,
            roi: 0.12,
            implementation_time: 18.0,
            risk: Level::High,
            impact: OpportunityImpact {
                cost_reduction: 25.0,
                emission_reduction: 85.0,
                efficiency_gain: 0.0,
            },
        },
        Opportunity {
            id: "waste-heat-recovery",
            title: "Waste Heat Recovery System",
            category: OpportunityCategory::Efficiency,
            priority: Priority::Medium,
            description: "Install ORC system for waste heat utilization",
            annual_savings: 400_000.0,
            investment: 2_000_000.0,
            roi: 0.2,
            implementation_time: 12.0,
            risk: Level::Medium,
            impact: OpportunityImpact {
                cost_reduction: 8.0,
                emission_reduction: 12.0,
                efficiency_gain: 8.0,
            },
        },
    ]
}

/// Catalogue filtered by category and priority; both filters apply when given.
#[allow(clippy::cast_precision_loss)]
pub fn opportunities(
    category: Option<OpportunityCategory>,
    priority: Option<Priority>,
) -> OpportunityReport {
    let catalogue = opportunity_catalogue();
    let summary = OpportunitySummary {
        total: catalogue.len(),
        total_potential_savings: catalogue.iter().map(|o| o.annual_savings).sum(),
        average_roi: if catalogue.is_empty() {
            0.0
        } else {
            catalogue.iter().map(|o| o.roi).sum::<f64>() / catalogue.len() as f64
        },
        quick_wins: catalogue
            .iter()
            .filter(|o| o.implementation_time <= QUICK_WIN_MONTHS)
            .count(),
    };
    let opportunities = catalogue
        .into_iter()
        .filter(|o| category.map_or(true, |c| o.category == c))
        .filter(|o| priority.map_or(true, |p| o.priority == p))
        .collect();
    OpportunityReport {
        opportunities,
        summary,
    }
}

// ============================================================================
// Fuel consumption
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelOptimizationPotential {
    pub current_efficiency: f64,
    pub benchmark_efficiency: f64,
    /// Percent, never negative
    pub improvement_potential: f64,
    /// USD, never negative
    pub potential_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelAnalysis {
    pub fuel_type: Option<String>,
    pub total_fuel: f64,
    pub total_power: f64,
    /// MWh per unit of fuel; `None` without fuel consumption
    pub fuel_efficiency: Option<f64>,
    pub average_consumption: Option<f64>,
    pub cost_per_unit: f64,
    pub optimization_potential: Option<FuelOptimizationPotential>,
    pub strategies: Vec<&'static str>,
    pub market_insights: MarketInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsights {
    pub current_price: f64,
    pub trend: &'static str,
    pub volatility: &'static str,
    pub recommendations: Vec<&'static str>,
}

/// Unit price of a fuel (USD per ton, per MMBtu for natural gas).
pub fn fuel_cost_per_unit(fuel_type: Option<&str>) -> f64 {
    match fuel_type {
        Some("natural_gas") => 3.0,
        Some("oil") => 400.0,
        Some("biomass") => 30.0,
        _ => 50.0,
    }
}

pub fn benchmark_fuel_efficiency(plant_type: PlantType) -> f64 {
    match plant_type {
        PlantType::NaturalGas => 55.0,
        PlantType::Oil => 45.0,
        PlantType::Biomass => 35.0,
        _ => 40.0,
    }
}

pub fn fuel_strategies(plant_type: PlantType) -> Vec<&'static str> {
    match plant_type {
        PlantType::NaturalGas => vec![
            "Combined cycle optimization",
            "Heat recovery steam generator tuning",
            "Gas turbine performance optimization",
            "Combined heat and power integration",
        ],
        PlantType::Oil => vec![
            "Fuel oil quality optimization",
            "Combustion system tuning",
            "Preheating optimization",
            "Atomization improvement",
        ],
        _ => vec![
            "Coal quality optimization and blending",
            "Advanced combustion control systems",
            "Coal preparation and sizing optimization",
            "Combustion air optimization",
        ],
    }
}

/// Fuel review over recent records. The plant's fuel type falls back to the
/// fuel reported on the newest record.
#[allow(clippy::cast_precision_loss)]
pub fn fuel_analysis(plant: &Plant, records: &[EmissionRecord]) -> FuelAnalysis {
    let total_fuel: f64 = records.iter().map(|r| r.fuel_consumption.amount).sum();
    let total_power: f64 = records.iter().map(EmissionRecord::power).sum();
    let fuel_efficiency = (total_fuel > 0.0).then(|| total_power / total_fuel);

    let fuel_type = plant.fuel_type.clone().or_else(|| {
        records
            .iter()
            .max_by_key(|r| r.timestamp)
            .map(|r| r.fuel_consumption.fuel_type.clone())
            .filter(|t| !t.is_empty())
    });
    let cost_per_unit = fuel_cost_per_unit(fuel_type.as_deref());

    let optimization_potential = fuel_efficiency.filter(|e| *e > 0.0).map(|current| {
        let benchmark = benchmark_fuel_efficiency(plant.plant_type);
        let ratio = (benchmark - current) / current;
        FuelOptimizationPotential {
            current_efficiency: current,
            benchmark_efficiency: benchmark,
            improvement_potential: (ratio * 100.0).max(0.0),
            potential_savings: (ratio * 1_000_000.0).max(0.0),
        }
    });

    FuelAnalysis {
        fuel_type,
        total_fuel,
        total_power,
        fuel_efficiency,
        average_consumption: (!records.is_empty()).then(|| total_fuel / records.len() as f64),
        cost_per_unit,
        optimization_potential,
        strategies: fuel_strategies(plant.plant_type),
        market_insights: MarketInsights {
            current_price: cost_per_unit,
            trend: "stable",
            volatility: "medium",
            recommendations: vec![
                "Consider long-term fuel contracts",
                "Monitor market prices for optimization opportunities",
                "Evaluate fuel switching options",
            ],
        },
    }
}

// ============================================================================
// Maintenance
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceBreakdown {
    pub preventive: f64,
    pub corrective: f64,
    pub predictive: f64,
    pub emergency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveMaintenance {
    pub sensors: Vec<&'static str>,
    pub models: Vec<&'static str>,
    /// Expected percent reductions
    pub cost_reduction: f64,
    pub downtime_reduction: f64,
    pub efficiency_improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceAnalysis {
    pub plant_age: u32,
    pub total_maintenance_cost: f64,
    /// `None` for a plant without capacity
    pub cost_per_mw: Option<f64>,
    pub age_multiplier: f64,
    pub breakdown: MaintenanceBreakdown,
    pub strategies: Vec<&'static str>,
    pub predictive: PredictiveMaintenance,
}

/// Annual maintenance estimate: capacity-based cost escalated by plant age.
pub fn maintenance_analysis(plant: &Plant, costs: &CostConfig, now: DateTime<Utc>) -> MaintenanceAnalysis {
    let plant_age = plant.age_years(now);
    let base = plant.capacity_mw * costs.maintenance_per_mw;
    let age_multiplier = costs
        .maintenance_age_escalation
        .mul_add(f64::from(plant_age), 1.0);
    let total = base * age_multiplier;

    let mut strategies = vec![
        "Implement predictive maintenance using IoT sensors",
        "Optimize maintenance scheduling based on load patterns",
        "Use condition-based maintenance instead of time-based",
        "Implement digital twin for maintenance optimization",
        "Optimize spare parts inventory management",
    ];
    if plant_age > AGEING_PLANT_YEARS {
        strategies.push("Consider major component replacement planning");
        strategies.push("Implement life extension strategies");
    }

    MaintenanceAnalysis {
        plant_age,
        total_maintenance_cost: total,
        cost_per_mw: (plant.capacity_mw > 0.0).then(|| total / plant.capacity_mw),
        age_multiplier,
        breakdown: MaintenanceBreakdown {
            preventive: total * 0.40,
            corrective: total * 0.35,
            predictive: total * 0.15,
            emergency: total * 0.10,
        },
        strategies,
        predictive: PredictiveMaintenance {
            sensors: vec![
                "Vibration sensors on rotating equipment",
                "Temperature sensors on critical components",
                "Pressure sensors on steam systems",
                "Oil analysis sensors",
            ],
            models: vec![
                "Failure prediction models",
                "Remaining useful life estimation",
                "Anomaly detection algorithms",
                "Maintenance scheduling optimization",
            ],
            cost_reduction: 20.0,
            downtime_reduction: 30.0,
            efficiency_improvement: 5.0,
        },
    }
}

// ============================================================================
// Carbon tax
// ============================================================================

/// Fractions of current emissions considered avoidable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionPotential {
    pub technical: f64,
    pub economic: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOpportunity {
    pub name: &'static str,
    /// USD per year
    pub potential: f64,
    pub details: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonTaxImpact {
    pub total_co2: f64,
    pub carbon_tax_rate: f64,
    pub total_carbon_tax: f64,
    pub cost_per_mwh: f64,
    pub reduction_potential: ReductionPotential,
    pub strategies: Vec<&'static str>,
    pub market_opportunities: Vec<MarketOpportunity>,
}

/// Carbon tax over recent records. Tax per MWh divides by 1 MWh when no
/// power was generated.
pub fn carbon_tax_impact(records: &[EmissionRecord], cost: &CostModel<'_>, costs: &CostConfig) -> CarbonTaxImpact {
    let total_co2: f64 = records.iter().map(EmissionRecord::co2).sum();
    let total_power: f64 = records.iter().map(EmissionRecord::power).sum();
    let total_carbon_tax = cost.carbon_tax(total_co2);
    let divisor = if total_power > 0.0 { total_power } else { 1.0 };

    CarbonTaxImpact {
        total_co2,
        carbon_tax_rate: costs.carbon_tax_per_ton,
        total_carbon_tax,
        cost_per_mwh: total_carbon_tax / divisor,
        reduction_potential: ReductionPotential {
            technical: 0.3,
            economic: 0.2,
            total: 0.5,
        },
        strategies: vec![
            "Improve combustion efficiency",
            "Implement carbon capture and storage",
            "Switch to lower carbon fuels",
            "Optimize plant operations",
            "Implement waste heat recovery",
            "Use renewable energy integration",
        ],
        market_opportunities: vec![
            MarketOpportunity {
                name: "carbon_credits",
                potential: 1_000_000.0,
                details: vec!["Implement verified emission reduction projects"],
            },
            MarketOpportunity {
                name: "carbon_utilization",
                potential: 500_000.0,
                details: vec!["Methanol", "Urea", "Building materials", "Fuels"],
            },
            MarketOpportunity {
                name: "renewable_integration",
                potential: 200_000.0,
                details: vec!["Solar integration", "Wind integration", "Biomass co-firing"],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FinanceConfig;
    use crate::types::CostLine;
    use chrono::{Duration, TimeZone};

    fn breakdown(fuel_pct: f64, maintenance_pct: f64, carbon_tax: f64) -> CostBreakdown {
        CostBreakdown {
            fuel: CostLine::usd(1_000.0, Some(fuel_pct)),
            operation: CostLine::usd(0.0, Some(20.0)),
            maintenance: CostLine::usd(500.0, Some(maintenance_pct)),
            carbon_tax: CostLine::usd(carbon_tax, None),
            total: CostLine::usd(0.0, None),
        }
    }

    #[test]
    fn test_breakdown_recommendations() {
        let recs = breakdown_recommendations(&breakdown(60.0, 25.0, 200_000.0));
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].potential_savings, Some(PotentialSavings::Amount(150.0)));
        assert_eq!(recs[1].potential_savings, Some(PotentialSavings::Amount(100.0)));
        assert_eq!(recs[2].potential_savings, Some(PotentialSavings::Amount(100_000.0)));

        // default split never trips the maintenance rule
        let recs = breakdown_recommendations(&breakdown(60.0, 15.0, 50_000.0));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Fuel);
    }

    #[test]
    fn test_opportunity_filters_compose() {
        let all = opportunities(None, None);
        assert_eq!(all.opportunities.len(), 5);
        assert_eq!(all.summary.total, 5);
        assert_eq!(all.summary.total_potential_savings, 3_200_000.0);
        assert!((all.summary.average_roi - 0.79).abs() < 1e-9);
        assert_eq!(all.summary.quick_wins, 2);

        let eff = opportunities(Some(OpportunityCategory::Efficiency), None);
        assert_eq!(eff.opportunities.len(), 2);

        let both = opportunities(Some(OpportunityCategory::Efficiency), Some(Priority::Medium));
        assert_eq!(both.opportunities.len(), 1);
        assert_eq!(both.opportunities[0].id, "waste-heat-recovery");
        assert_eq!(both.summary.total, 5);
    }

    #[test]
    fn test_fuel_analysis() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let records = vec![
            EmissionRecord::new("p1", now, 1_000.0, 10.0).with_fuel("coal", 0.5, "ton"),
            EmissionRecord::new("p1", now + Duration::hours(1), 1_000.0, 10.0).with_fuel("coal", 0.5, "ton"),
        ];
        let plant = Plant::new("p1", "North", PlantType::Coal, 100.0);
        let analysis = fuel_analysis(&plant, &records);
        assert_eq!(analysis.fuel_type.as_deref(), Some("coal"));
        assert_eq!(analysis.fuel_efficiency, Some(20.0));
        assert_eq!(analysis.average_consumption, Some(0.5));
        assert_eq!(analysis.cost_per_unit, 50.0);
        let potential = analysis.optimization_potential.unwrap();
        assert_eq!(potential.benchmark_efficiency, 40.0);
        assert_eq!(potential.improvement_potential, 100.0);
        assert_eq!(potential.potential_savings, 1_000_000.0);
        assert_eq!(analysis.strategies.len(), 4);
    }

    #[test]
    fn test_fuel_analysis_without_fuel() {
        let plant = Plant::new("p1", "North", PlantType::Oil, 100.0);
        let analysis = fuel_analysis(&plant, &[]);
        assert_eq!(analysis.fuel_efficiency, None);
        assert_eq!(analysis.average_consumption, None);
        assert!(analysis.optimization_potential.is_none());
        assert_eq!(analysis.strategies[0], "Fuel oil quality optimization");
    }

    #[test]
    fn test_maintenance_escalates_with_age() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut plant = Plant::new("p1", "North", PlantType::Coal, 500.0);
        plant.commissioning_date = Some(now - Duration::days(365 * 25));

        let analysis = maintenance_analysis(&plant, &CostConfig::default(), now);
        assert_eq!(analysis.plant_age, 25);
        assert!((analysis.age_multiplier - 1.5).abs() < 1e-9);
        assert!((analysis.total_maintenance_cost - 37_500.0).abs() < 1e-6);
        assert!((analysis.cost_per_mw.unwrap() - 75.0).abs() < 1e-9);
        assert!((analysis.breakdown.preventive - 15_000.0).abs() < 1e-6);
        assert_eq!(analysis.strategies.len(), 7);

        plant.commissioning_date = None;
        let analysis = maintenance_analysis(&plant, &CostConfig::default(), now);
        assert_eq!(analysis.plant_age, 0);
        assert_eq!(analysis.strategies.len(), 5);
    }

    #[test]
    fn test_carbon_tax_zero_power_divides_by_one() {
        let (costs, finance) = (CostConfig::default(), FinanceConfig::default());
        let model = CostModel::new(&costs, &finance);
        let now = Utc::now();
        let records = vec![EmissionRecord::new("p1", now, 4_000.0, 0.0)];
        let impact = carbon_tax_impact(&records, &model, &costs);
        assert_eq!(impact.total_carbon_tax, 200.0);
        assert_eq!(impact.cost_per_mwh, 200.0);
        assert_eq!(impact.reduction_potential.total, 0.5);
    }

    #[test]
    fn test_reports_serialize_for_responses() {
        let report = serde_json::to_value(opportunities(Some(OpportunityCategory::Efficiency), None)).unwrap();
        assert_eq!(report["summary"]["totalPotentialSavings"], 3_200_000.0);
        assert_eq!(report["opportunities"][0]["category"], "efficiency");
        assert!(report["opportunities"][0]["annualSavings"].is_number());

        let (costs, finance) = (CostConfig::default(), FinanceConfig::default());
        let model = CostModel::new(&costs, &finance);
        let records = vec![EmissionRecord::new("p1", Utc::now(), 4_000.0, 2.0)];
        let impact = serde_json::to_value(carbon_tax_impact(&records, &model, &costs)).unwrap();
        assert_eq!(impact["totalCo2"], 4_000.0);
        assert_eq!(impact["marketOpportunities"][0]["name"], "carbon_credits");
        assert_eq!(impact["strategies"].as_array().map(Vec::len), Some(6));

        let plant = Plant::new("p1", "North", PlantType::NaturalGas, 100.0);
        let maintenance = serde_json::to_value(maintenance_analysis(&plant, &costs, Utc::now())).unwrap();
        assert_eq!(maintenance["predictive"]["downtimeReduction"], 30.0);
        let fuel = serde_json::to_value(fuel_analysis(&plant, &records)).unwrap();
        assert!(fuel["marketInsights"]["recommendations"].is_array());
    }
}
