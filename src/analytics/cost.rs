//! Cost breakdown, NPV and optimization verdicts

use crate::config::{CostConfig, FinanceConfig};
use crate::types::{
    CostBreakdown, CostLine, EmissionRecord, OptimizationEvaluation, OptimizationRecommendation,
    PlantType, Verdict,
};

const KG_PER_TON: f64 = 1_000.0;

/// Plant cost figures driven by the configured rate tables.
pub struct CostModel<'a> {
    costs: &'a CostConfig,
    finance: &'a FinanceConfig,
}

impl<'a> CostModel<'a> {
    pub fn new(costs: &'a CostConfig, finance: &'a FinanceConfig) -> Self {
        Self { costs, finance }
    }

    /// Split the generation cost of `power_mwh` into fuel, operation and
    /// maintenance shares. The carbon tax is charged on CO2 tonnage, stands
    /// outside the total and carries no share.
    pub fn breakdown(&self, plant_type: PlantType, power_mwh: f64, co2_kg: f64) -> CostBreakdown {
        let total = power_mwh * self.costs.cost_per_mwh(plant_type);
        let share = |fraction: f64| CostLine::usd(total * fraction, Some(fraction * 100.0));

        CostBreakdown {
            fuel: share(self.costs.fuel_share),
            operation: share(self.costs.operation_share),
            maintenance: share(self.costs.maintenance_share),
            carbon_tax: CostLine::usd(self.carbon_tax(co2_kg), None),
            total: CostLine::usd(total, None),
        }
    }

    /// Breakdown over the summed power and CO2 of `records`.
    pub fn breakdown_for(&self, plant_type: PlantType, records: &[EmissionRecord]) -> CostBreakdown {
        let power = records.iter().map(EmissionRecord::power).sum();
        let co2 = records.iter().map(EmissionRecord::co2).sum();
        self.breakdown(plant_type, power, co2)
    }

    pub fn carbon_tax(&self, co2_kg: f64) -> f64 {
        co2_kg / KG_PER_TON * self.costs.carbon_tax_per_ton
    }

    /// `-investment + Σ savings / (1 + r)^t` over the horizon, rounded to
    /// whole currency units.
    pub fn npv(&self, investment: f64, annual_savings: f64) -> f64 {
        let growth = 1.0 + self.finance.discount_rate;
        let discounted: f64 = (1..=self.finance.npv_horizon_years)
            .map(|year| annual_savings / growth.powf(f64::from(year)))
            .sum();
        (discounted - investment).round()
    }

    /// Derive ROI figures for an optimization and grade it.
    pub fn evaluate(&self, optimization: &OptimizationRecommendation) -> OptimizationEvaluation {
        let mut derived = optimization.clone();
        let roi = derived.calculate_roi();
        let verdict = verdict(roi.benefit_cost_ratio, roi.payback_period);
        OptimizationEvaluation {
            npv: self.npv(optimization.investment(), optimization.annual_savings()),
            payback_period: roi.payback_period,
            benefit_cost_ratio: roi.benefit_cost_ratio,
            verdict,
            recommendation: verdict.message().to_string(),
        }
    }
}

/// Grade by benefit-cost ratio and payback years; the first matching band wins.
///
/// Missing figures fail every band.
pub fn verdict(benefit_cost_ratio: Option<f64>, payback_years: Option<f64>) -> Verdict {
    let (Some(ratio), Some(payback)) = (benefit_cost_ratio, payback_years) else {
        return Verdict::NotRecommended;
    };
    if ratio > 2.0 && payback < 3.0 {
        Verdict::HighlyRecommended
    } else if ratio > 1.5 && payback < 5.0 {
        Verdict::Recommended
    } else if ratio > 1.0 && payback < 7.0 {
        Verdict::Consider
    } else {
        Verdict::NotRecommended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImplementationCost, OptimizationType};
    use chrono::Utc;

    fn model_parts() -> (CostConfig, FinanceConfig) {
        (CostConfig::default(), FinanceConfig::default())
    }

    fn optimization(investment: f64, savings: f64) -> OptimizationRecommendation {
        let mut opt: OptimizationRecommendation = serde_json::from_value(serde_json::json!({
            "plantId": "p1",
            "optimizationType": "efficiency_improvement",
            "title": "Economizer retrofit",
            "createdAt": Utc::now(),
        }))
        .unwrap();
        opt.implementation.cost = ImplementationCost {
            total: investment,
            ..ImplementationCost::default()
        };
        opt.improvements.cost_savings.annual = savings;
        assert_eq!(opt.optimization_type, OptimizationType::EfficiencyImprovement);
        opt
    }

    #[test]
    fn test_breakdown_split() {
        let (costs, finance) = model_parts();
        let model = CostModel::new(&costs, &finance);
        let b = model.breakdown(PlantType::Coal, 1_000.0, 2_000_000.0);
        assert_eq!(b.total.amount, 45_000.0);
        assert!((b.fuel.amount - 27_000.0).abs() < 1e-6);
        assert!((b.operation.amount - 9_000.0).abs() < 1e-6);
        assert!((b.maintenance.amount - 6_750.0).abs() < 1e-6);
        assert_eq!(b.fuel.percentage, Some(60.0));
        assert_eq!(b.carbon_tax.amount, 100_000.0);
        assert_eq!(b.carbon_tax.percentage, None);
    }

    #[test]
    fn test_breakdown_unknown_type_uses_default_rate() {
        let (costs, finance) = model_parts();
        let model = CostModel::new(&costs, &finance);
        let b = model.breakdown(PlantType::Unknown, 10.0, 0.0);
        assert_eq!(b.total.amount, 450.0);
        assert_eq!(b.carbon_tax.amount, 0.0);
    }

    #[test]
    fn test_npv_reference_value() {
        let (costs, finance) = model_parts();
        let model = CostModel::new(&costs, &finance);
        let npv = model.npv(100_000.0, 20_000.0);
        assert!((npv - 96_363.0).abs() <= 1.0, "npv = {npv}");
        assert_eq!(npv, npv.round());
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(verdict(Some(2.5), Some(0.4)), Verdict::HighlyRecommended);
        assert_eq!(verdict(Some(1.8), Some(4.0)), Verdict::Recommended);
        assert_eq!(verdict(Some(2.5), Some(4.0)), Verdict::Recommended);
        assert_eq!(verdict(Some(1.2), Some(6.9)), Verdict::Consider);
        assert_eq!(verdict(Some(1.2), Some(7.0)), Verdict::NotRecommended);
        assert_eq!(verdict(Some(0.25), Some(4.0)), Verdict::NotRecommended);
        assert_eq!(verdict(None, None), Verdict::NotRecommended);
    }

    #[test]
    fn test_evaluate_derives_roi() {
        let (costs, finance) = model_parts();
        let model = CostModel::new(&costs, &finance);
        let eval = model.evaluate(&optimization(200_000.0, 500_000.0));
        assert_eq!(eval.payback_period, Some(0.4));
        assert_eq!(eval.benefit_cost_ratio, Some(2.5));
        assert_eq!(eval.verdict, Verdict::HighlyRecommended);
        assert_eq!(
            eval.recommendation,
            "Highly recommended - Excellent ROI and quick payback"
        );
    }

    #[test]
    fn test_evaluate_without_savings() {
        let (costs, finance) = model_parts();
        let model = CostModel::new(&costs, &finance);
        let eval = model.evaluate(&optimization(1_000_000.0, 0.0));
        assert_eq!(eval.payback_period, None);
        assert_eq!(eval.verdict, Verdict::NotRecommended);
        assert_eq!(eval.npv, -1_000_000.0);
    }

    #[test]
    fn test_evaluate_ignores_client_roi() {
        let (costs, finance) = model_parts();
        let model = CostModel::new(&costs, &finance);

        let mut inflated = optimization(100_000.0, 0.0);
        inflated.roi.payback_period = Some(1.0);
        inflated.roi.benefit_cost_ratio = Some(5.0);
        let eval = model.evaluate(&inflated);
        assert_eq!(eval.payback_period, None);
        assert_eq!(eval.benefit_cost_ratio, Some(0.0));
        assert_eq!(eval.verdict, Verdict::NotRecommended);

        let mut free = optimization(0.0, 50_000.0);
        free.roi.payback_period = Some(9.0);
        let eval = model.evaluate(&free);
        assert_eq!(eval.payback_period, Some(0.0));
        assert_eq!(eval.benefit_cost_ratio, None);
        assert_eq!(eval.verdict, Verdict::NotRecommended);
    }
}
