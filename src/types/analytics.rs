//! Outputs of the analytics entry points

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::optimization::Priority;
use super::period::PeriodSummary;
use super::plant::{Plant, PlantType};

/// Window-level emission rollup.
///
/// Sums treat missing values as zero. Averages and extremes skip undefined
/// values and stay `None` when nothing contributed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionTotals {
    pub total_co2: f64,
    pub total_ch4: f64,
    pub total_n2o: f64,
    pub total_co2e: f64,
    pub total_power: f64,
    pub avg_efficiency: Option<f64>,
    pub avg_carbon_intensity: Option<f64>,
    pub max_efficiency: Option<f64>,
    pub min_carbon_intensity: Option<f64>,
    pub count: usize,
}

/// One UTC calendar day of the dashboard time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub co2: f64,
    pub ch4: f64,
    pub n2o: f64,
    pub power: f64,
    pub efficiency: Option<f64>,
    pub carbon_intensity: Option<f64>,
    pub count: usize,
}

/// Recent-performance figures with missing values counted as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub avg_efficiency: f64,
    pub avg_carbon_intensity: f64,
    pub total_co2: f64,
    pub total_power: f64,
    pub availability: f64,
    pub count: usize,
}

/// Rollup of the optimizations created in a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationStats {
    pub total: usize,
    pub implemented: usize,
    pub total_savings: f64,
    pub avg_roi: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalKpis {
    pub total_co2: f64,
    pub carbon_intensity: f64,
    pub efficiency: f64,
    pub emission_reduction: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialKpis {
    pub total_savings: f64,
    pub average_roi: f64,
    pub cost_per_mwh: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalKpis {
    pub total_power: f64,
    pub availability: f64,
    pub performance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub environmental: EnvironmentalKpis,
    pub financial: FinancialKpis,
    pub operational: OperationalKpis,
}

/// Identity block echoed in responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    #[serde(rename = "capacityMW")]
    pub capacity_mw: f64,
    pub efficiency: f64,
}

impl From<&Plant> for PlantSummary {
    fn from(plant: &Plant) -> Self {
        Self {
            id: plant.id.clone(),
            name: plant.name.clone(),
            plant_type: plant.plant_type,
            capacity_mw: plant.capacity_mw,
            efficiency: plant.efficiency_baseline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub period: PeriodSummary,
    pub plant: Option<PlantSummary>,
    pub emissions: EmissionTotals,
    pub optimizations: OptimizationStats,
    pub time_series: Vec<DailyBucket>,
    pub kpis: Kpis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

/// Documented fallback applied instead of failing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Too few samples; a degenerate result was returned
    InsufficientData,
    /// A zero denominator was replaced by the documented value
    DivisionUndefined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    /// Percent, rounded to two decimals
    pub change: f64,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub points: Vec<ForecastPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub amount: f64,
    /// Share of the operating total; `None` for levies computed independently
    pub percentage: Option<f64>,
    pub unit: String,
}

impl CostLine {
    pub fn usd(amount: f64, percentage: Option<f64>) -> Self {
        Self {
            amount,
            percentage,
            unit: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub fuel: CostLine,
    pub operation: CostLine,
    pub maintenance: CostLine,
    pub carbon_tax: CostLine,
    pub total: CostLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    HighlyRecommended,
    Recommended,
    Consider,
    NotRecommended,
}

impl Verdict {
    pub fn message(self) -> &'static str {
        match self {
            Verdict::HighlyRecommended => "Highly recommended - Excellent ROI and quick payback",
            Verdict::Recommended => "Recommended - Good ROI and reasonable payback",
            Verdict::Consider => "Consider - Moderate ROI, evaluate other factors",
            Verdict::NotRecommended => "Not recommended - Poor ROI or long payback period",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationEvaluation {
    pub npv: f64,
    pub payback_period: Option<f64>,
    pub benefit_cost_ratio: Option<f64>,
    pub verdict: Verdict,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    DataCollection,
    Efficiency,
    Emissions,
    CarbonCapture,
    Optimization,
    Fuel,
    Maintenance,
}

/// Expected benefit of a recommendation: a qualitative band such as
/// "10-20% emission reduction", or an annual USD amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PotentialSavings {
    Amount(f64),
    Band(String),
}

impl PotentialSavings {
    pub fn band(text: &str) -> Self {
        Self::Band(text.to_string())
    }
}

/// Rule-triggered suggestion returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<PotentialSavings>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}
