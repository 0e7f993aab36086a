//! Optimization recommendation types and the status lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Category of improvement an optimization targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationType {
    EmissionReduction,
    CostReduction,
    EfficiencyImprovement,
    CarbonCapture,
    Utilization,
}

impl std::fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationType::EmissionReduction => write!(f, "emission_reduction"),
            OptimizationType::CostReduction => write!(f, "cost_reduction"),
            OptimizationType::EfficiencyImprovement => write!(f, "efficiency_improvement"),
            OptimizationType::CarbonCapture => write!(f, "carbon_capture"),
            OptimizationType::Utilization => write!(f, "utilization"),
        }
    }
}

/// Lifecycle of an optimization.
///
/// `Proposed → UnderReview → Approved → InProgress → Completed`, plus the
/// `Proposed → Approved` shortcut. `Rejected` is reachable from every
/// non-terminal state. `Completed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStatus {
    #[default]
    Proposed,
    UnderReview,
    Approved,
    InProgress,
    Completed,
    Rejected,
}

impl OptimizationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OptimizationStatus::Completed | OptimizationStatus::Rejected)
    }

    /// Counted by the cost-benefit portfolio.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            OptimizationStatus::Proposed | OptimizationStatus::Approved | OptimizationStatus::InProgress
        )
    }

    pub fn can_transition_to(self, next: OptimizationStatus) -> bool {
        use OptimizationStatus as S;
        match (self, next) {
            (from, S::Rejected) => !from.is_terminal(),
            (S::Proposed, S::UnderReview | S::Approved)
            | (S::UnderReview, S::Approved)
            | (S::Approved, S::InProgress)
            | (S::InProgress, S::Completed) => true,
            _ => false,
        }
    }

    pub fn transition(self, next: OptimizationStatus) -> Result<OptimizationStatus, AnalyticsError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AnalyticsError::InvalidTransition { from: self, to: next })
        }
    }
}

impl std::fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationStatus::Proposed => write!(f, "proposed"),
            OptimizationStatus::UnderReview => write!(f, "under_review"),
            OptimizationStatus::Approved => write!(f, "approved"),
            OptimizationStatus::InProgress => write!(f, "in_progress"),
            OptimizationStatus::Completed => write!(f, "completed"),
            OptimizationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for OptimizationStatus {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proposed" => Ok(OptimizationStatus::Proposed),
            "under_review" => Ok(OptimizationStatus::UnderReview),
            "approved" => Ok(OptimizationStatus::Approved),
            "in_progress" => Ok(OptimizationStatus::InProgress),
            "completed" => Ok(OptimizationStatus::Completed),
            "rejected" => Ok(OptimizationStatus::Rejected),
            other => Err(AnalyticsError::InvalidInput(format!("unknown status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

/// Implementation complexity / risk grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFigures {
    #[serde(default)]
    pub co2: f64,
    #[serde(default)]
    pub ch4: f64,
    #[serde(default)]
    pub n2o: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTotals {
    #[serde(default)]
    pub fuel: f64,
    #[serde(default)]
    pub operation: f64,
    #[serde(default)]
    pub maintenance: f64,
    #[serde(default)]
    pub carbon_tax: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyFigures {
    #[serde(default)]
    pub thermal: f64,
    #[serde(default)]
    pub electrical: f64,
    #[serde(default)]
    pub overall: f64,
}

/// Plant state before or after an optimization
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    #[serde(default)]
    pub emissions: EmissionFigures,
    #[serde(default)]
    pub costs: CostTotals,
    #[serde(default)]
    pub efficiency: EfficiencyFigures,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSavings {
    /// USD per year
    #[serde(default)]
    pub annual: f64,
    #[serde(default)]
    pub percentage: f64,
}

/// Deltas between current and proposed state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvements {
    /// Percentages
    #[serde(default)]
    pub emission_reduction: EmissionFigures,
    #[serde(default)]
    pub cost_savings: CostSavings,
    #[serde(default)]
    pub efficiency_gain: EfficiencyFigures,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImplementationCost {
    #[serde(default)]
    pub capital: f64,
    #[serde(default)]
    pub operational: f64,
    #[serde(default)]
    pub maintenance: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Implementation {
    #[serde(default)]
    pub cost: ImplementationCost,
    #[serde(default)]
    pub timeline_months: f64,
    #[serde(default)]
    pub complexity: Level,
    #[serde(default)]
    pub risk: Level,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roi {
    /// Years
    #[serde(default)]
    pub payback_period: Option<f64>,
    #[serde(default)]
    pub net_present_value: Option<f64>,
    #[serde(default)]
    pub internal_rate_of_return: Option<f64>,
    #[serde(default)]
    pub benefit_cost_ratio: Option<f64>,
}

/// A proposed or tracked improvement action for a plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecommendation {
    #[serde(default)]
    pub id: String,
    pub plant_id: String,
    pub optimization_type: OptimizationType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub current_state: PlantState,
    #[serde(default)]
    pub proposed_state: PlantState,
    #[serde(default)]
    pub improvements: Improvements,
    #[serde(default)]
    pub implementation: Implementation,
    #[serde(default)]
    pub roi: Roi,
    #[serde(default)]
    pub status: OptimizationStatus,
    #[serde(default)]
    pub priority: Priority,
    /// 0-100
    #[serde(default)]
    pub confidence: u8,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl OptimizationRecommendation {
    pub fn investment(&self) -> f64 {
        self.implementation.cost.total
    }

    pub fn annual_savings(&self) -> f64 {
        self.improvements.cost_savings.annual
    }

    /// Derive payback period and benefit-cost ratio from implementation
    /// cost and annual savings, replacing whatever the caller supplied.
    ///
    /// Payback needs positive savings; the ratio needs a positive
    /// investment. Either is `None` otherwise.
    pub fn calculate_roi(&mut self) -> Roi {
        let total = self.investment();
        let annual = self.annual_savings();
        self.roi.payback_period = (annual > 0.0).then(|| total / annual);
        self.roi.benefit_cost_ratio = (total > 0.0).then(|| annual / total);
        self.roi
    }

    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.plant_id.trim().is_empty() {
            problems.push("plantId must not be empty".to_string());
        }
        if self.title.trim().is_empty() {
            problems.push("title must not be empty".to_string());
        }
        if self.confidence > 100 {
            problems.push(format!("confidence must be within 0-100, got {}", self.confidence));
        }
        let c = &self.implementation.cost;
        let figures = [
            ("implementation.cost.capital", c.capital),
            ("implementation.cost.operational", c.operational),
            ("implementation.cost.maintenance", c.maintenance),
            ("implementation.cost.total", c.total),
            ("improvements.costSavings.annual", self.annual_savings()),
        ];
        for (name, value) in figures {
            if !value.is_finite() || value < 0.0 {
                problems.push(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        problems
    }
}
