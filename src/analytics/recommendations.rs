//! Rule-based recommendations and optimization proposals

use chrono::{DateTime, Utc};

use super::cost::{verdict, CostModel};
use crate::config::ThresholdConfig;
use crate::types::{
    CostSavings, EfficiencyFigures, EmissionFigures, Implementation, ImplementationCost,
    Improvements, Level, OptimizationRecommendation, OptimizationStatus, OptimizationType,
    PerformanceSnapshot, Plant, PlantState, PlantType, PotentialSavings, Priority, Recommendation,
    RecommendationKind, Roi, Verdict,
};

/// Confidence attached to each rule (%).
const EFFICIENCY_CONFIDENCE: u8 = 85;
const INTENSITY_CONFIDENCE: u8 = 80;
const CAPTURE_CONFIDENCE: u8 = 75;
const GENERIC_CONFIDENCE: u8 = 70;

pub struct RecommendationGenerator<'a> {
    thresholds: &'a ThresholdConfig,
}

impl<'a> RecommendationGenerator<'a> {
    pub fn new(thresholds: &'a ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// Recommendations for a recent-performance snapshot.
    ///
    /// An empty snapshot yields only the data-collection recommendation.
    /// Otherwise the rule order is efficiency, carbon intensity, carbon
    /// capture, and the generic optimization suggestion always comes last.
    pub fn generate(&self, snapshot: &PerformanceSnapshot) -> Vec<Recommendation> {
        if snapshot.count == 0 {
            return vec![Recommendation {
                kind: RecommendationKind::DataCollection,
                priority: Priority::High,
                title: "Start Data Collection".to_string(),
                description: "Begin collecting real-time emissions and operational data to enable optimization analysis.".to_string(),
                potential_savings: None,
                action: "Set up monitoring systems".to_string(),
                confidence: None,
            }];
        }

        let mut out = Vec::new();

        if snapshot.avg_efficiency < self.thresholds.efficiency_alert_percent {
            out.push(Recommendation {
                kind: RecommendationKind::Efficiency,
                priority: Priority::High,
                title: "Improve Thermal Efficiency".to_string(),
                description: format!(
                    "Current efficiency is {:.1}%. Consider boiler tuning and heat recovery systems.",
                    snapshot.avg_efficiency
                ),
                potential_savings: Some(PotentialSavings::band("15-25% efficiency gain")),
                action: "Schedule efficiency audit".to_string(),
                confidence: Some(EFFICIENCY_CONFIDENCE),
            });
        }

        if snapshot.avg_carbon_intensity > self.thresholds.carbon_intensity_alert_kg_per_mwh {
            out.push(Recommendation {
                kind: RecommendationKind::Emissions,
                priority: Priority::High,
                title: "Reduce Carbon Intensity".to_string(),
                description: format!(
                    "Current carbon intensity is {:.1} kg CO2/MWh. Implement optimization measures.",
                    snapshot.avg_carbon_intensity
                ),
                potential_savings: Some(PotentialSavings::band("10-20% emission reduction")),
                action: "Review combustion parameters".to_string(),
                confidence: Some(INTENSITY_CONFIDENCE),
            });
        }

        if snapshot.total_co2 > self.thresholds.carbon_capture_co2_kg {
            out.push(Recommendation {
                kind: RecommendationKind::CarbonCapture,
                priority: Priority::Medium,
                title: "Consider Carbon Capture".to_string(),
                description: "High CO2 emissions detected. Evaluate carbon capture and utilization options.".to_string(),
                potential_savings: Some(PotentialSavings::band("80-90% emission reduction")),
                action: "Feasibility study for CCS".to_string(),
                confidence: Some(CAPTURE_CONFIDENCE),
            });
        }

        out.push(Recommendation {
            kind: RecommendationKind::Optimization,
            priority: Priority::Medium,
            title: "AI-Powered Optimization".to_string(),
            description: "Use machine learning to optimize plant operations and reduce emissions."
                .to_string(),
            potential_savings: Some(PotentialSavings::band("5-15% overall improvement")),
            action: "Enable AI optimization features".to_string(),
            confidence: Some(GENERIC_CONFIDENCE),
        });

        out
    }

    /// Draft optimizations for a plant, status `proposed`, ROI and NPV filled in.
    ///
    /// Drafts carry no id; one is assigned when a draft is stored.
    pub fn propose(
        &self,
        plant: &Plant,
        snapshot: &PerformanceSnapshot,
        cost: &CostModel<'_>,
        now: DateTime<Utc>,
    ) -> Vec<OptimizationRecommendation> {
        let mut rules: Vec<ProposalRule> = Vec::new();

        if snapshot.avg_efficiency < self.thresholds.efficiency_alert_percent {
            rules.push(ProposalRule {
                optimization_type: OptimizationType::EfficiencyImprovement,
                title: "Boiler Efficiency Optimization",
                description: "Implement advanced combustion control and heat recovery systems",
                emission_reduction: 15.0,
                annual_savings: 500_000.0,
                efficiency_gain: 8.0,
                investment: 2_000_000.0,
                timeline_months: 6.0,
                complexity: Level::Medium,
                risk: Level::Low,
                confidence: 85,
            });
        }

        if snapshot.total_co2 > self.thresholds.carbon_capture_co2_kg {
            rules.push(ProposalRule {
                optimization_type: OptimizationType::CarbonCapture,
                title: "Post-Combustion Carbon Capture",
                description: "Install amine-based CO2 capture system with utilization; utilization revenue up to $1.5M per year",
                emission_reduction: 90.0,
                annual_savings: 2_000_000.0,
                efficiency_gain: 0.0,
                investment: 15_000_000.0,
                timeline_months: 18.0,
                complexity: Level::High,
                risk: Level::Medium,
                confidence: 75,
            });
        }

        if plant.plant_type == PlantType::Coal
            && snapshot.avg_carbon_intensity > self.thresholds.coal_blending_intensity_kg_per_mwh
        {
            rules.push(ProposalRule {
                optimization_type: OptimizationType::CostReduction,
                title: "Coal Quality and Blending Optimization",
                description: "Implement advanced coal blending and quality control",
                emission_reduction: 12.0,
                annual_savings: 800_000.0,
                efficiency_gain: 5.0,
                investment: 1_000_000.0,
                timeline_months: 4.0,
                complexity: Level::Low,
                risk: Level::Low,
                confidence: 90,
            });
        }

        rules.push(ProposalRule {
            optimization_type: OptimizationType::EfficiencyImprovement,
            title: "Waste Heat Recovery System",
            description: "Install ORC system to recover waste heat for power generation",
            emission_reduction: 8.0,
            annual_savings: 300_000.0,
            efficiency_gain: 6.0,
            investment: 3_000_000.0,
            timeline_months: 8.0,
            complexity: Level::Medium,
            risk: Level::Low,
            confidence: 80,
        });

        rules
            .into_iter()
            .map(|rule| rule.draft(&plant.id, snapshot, cost, now))
            .collect()
    }
}

/// Fixed parameters of one proposal rule.
struct ProposalRule {
    optimization_type: OptimizationType,
    title: &'static str,
    description: &'static str,
    /// Percent
    emission_reduction: f64,
    annual_savings: f64,
    /// Percentage points
    efficiency_gain: f64,
    investment: f64,
    timeline_months: f64,
    complexity: Level,
    risk: Level,
    confidence: u8,
}

impl ProposalRule {
    fn draft(
        &self,
        plant_id: &str,
        snapshot: &PerformanceSnapshot,
        cost: &CostModel<'_>,
        now: DateTime<Utc>,
    ) -> OptimizationRecommendation {
        let current = PlantState {
            emissions: EmissionFigures {
                co2: snapshot.total_co2,
                total: snapshot.total_co2,
                ..EmissionFigures::default()
            },
            efficiency: EfficiencyFigures {
                overall: snapshot.avg_efficiency,
                ..EfficiencyFigures::default()
            },
            ..PlantState::default()
        };
        let remaining_co2 = snapshot.total_co2 * (1.0 - self.emission_reduction / 100.0);
        let proposed = PlantState {
            emissions: EmissionFigures {
                co2: remaining_co2,
                total: remaining_co2,
                ..EmissionFigures::default()
            },
            efficiency: EfficiencyFigures {
                overall: (snapshot.avg_efficiency + self.efficiency_gain).min(100.0),
                ..EfficiencyFigures::default()
            },
            ..PlantState::default()
        };

        let mut draft = OptimizationRecommendation {
            id: String::new(),
            plant_id: plant_id.to_string(),
            optimization_type: self.optimization_type,
            title: self.title.to_string(),
            description: self.description.to_string(),
            current_state: current,
            proposed_state: proposed,
            improvements: Improvements {
                emission_reduction: EmissionFigures {
                    co2: self.emission_reduction,
                    total: self.emission_reduction,
                    ..EmissionFigures::default()
                },
                cost_savings: CostSavings {
                    annual: self.annual_savings,
                    percentage: 0.0,
                },
                efficiency_gain: EfficiencyFigures {
                    overall: self.efficiency_gain,
                    ..EfficiencyFigures::default()
                },
            },
            implementation: Implementation {
                cost: ImplementationCost {
                    capital: self.investment,
                    total: self.investment,
                    ..ImplementationCost::default()
                },
                timeline_months: self.timeline_months,
                complexity: self.complexity,
                risk: self.risk,
            },
            roi: Roi::default(),
            status: OptimizationStatus::Proposed,
            priority: Priority::Medium,
            confidence: self.confidence,
            created_at: now,
        };

        let roi = draft.calculate_roi();
        draft.roi.net_present_value = Some(cost.npv(self.investment, self.annual_savings));
        draft.priority = match verdict(roi.benefit_cost_ratio, roi.payback_period) {
            Verdict::HighlyRecommended | Verdict::Recommended => Priority::High,
            Verdict::Consider => Priority::Medium,
            Verdict::NotRecommended => Priority::Low,
        };
        draft
    }
}
