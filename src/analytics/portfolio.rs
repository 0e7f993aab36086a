//! Rollups over a plant's optimizations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    OptimizationRecommendation, OptimizationStats, OptimizationStatus, OptimizationType,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub optimization_type: OptimizationType,
    pub investment: f64,
    pub annual_savings: f64,
    /// Benefit-cost ratio
    pub roi: Option<f64>,
    pub payback_period: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub total_optimizations: usize,
    pub total_investment: f64,
    pub total_annual_savings: f64,
    #[serde(rename = "averageROI")]
    pub average_roi: f64,
    pub optimizations: Vec<PortfolioItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub status_distribution: BTreeMap<OptimizationStatus, usize>,
    pub type_distribution: BTreeMap<OptimizationType, usize>,
}

/// Annual savings realised or underway: completed plus in-progress items.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSavings {
    pub annual: f64,
    pub implemented: usize,
    pub in_progress: usize,
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

pub fn optimization_stats(opts: &[OptimizationRecommendation]) -> OptimizationStats {
    let ratios: Vec<f64> = opts.iter().filter_map(|o| o.roi.benefit_cost_ratio).collect();
    OptimizationStats {
        total: opts.len(),
        implemented: opts
            .iter()
            .filter(|o| o.status == OptimizationStatus::Completed)
            .count(),
        total_savings: opts.iter().map(OptimizationRecommendation::annual_savings).sum(),
        avg_roi: mean(&ratios),
    }
}

/// Cost-benefit rollup of the active optimizations (proposed, approved,
/// in progress).
pub fn portfolio(opts: &[OptimizationRecommendation]) -> Portfolio {
    let optimizations: Vec<PortfolioItem> = opts
        .iter()
        .filter(|o| o.status.is_active())
        .map(|o| PortfolioItem {
            id: o.id.clone(),
            title: o.title.clone(),
            optimization_type: o.optimization_type,
            investment: o.investment(),
            annual_savings: o.annual_savings(),
            roi: o.roi.benefit_cost_ratio,
            payback_period: o.roi.payback_period,
        })
        .collect();

    let ratios: Vec<f64> = optimizations
        .iter()
        .map(|i| i.roi.unwrap_or(0.0))
        .collect();

    Portfolio {
        total_optimizations: optimizations.len(),
        total_investment: optimizations.iter().map(|i| i.investment).sum(),
        total_annual_savings: optimizations.iter().map(|i| i.annual_savings).sum(),
        average_roi: mean(&ratios).unwrap_or(0.0),
        optimizations,
    }
}

pub fn distribution(opts: &[OptimizationRecommendation]) -> Distribution {
    let mut out = Distribution::default();
    for o in opts {
        *out.status_distribution.entry(o.status).or_insert(0) += 1;
        *out.type_distribution.entry(o.optimization_type).or_insert(0) += 1;
    }
    out
}

pub fn savings(opts: &[OptimizationRecommendation]) -> OptimizationSavings {
    let mut out = OptimizationSavings::default();
    for o in opts {
        match o.status {
            OptimizationStatus::Completed => out.implemented += 1,
            OptimizationStatus::InProgress => out.in_progress += 1,
            _ => continue,
        }
        out.annual += o.annual_savings();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn opt(id: &str, status: OptimizationStatus, investment: f64, savings: f64) -> OptimizationRecommendation {
        let mut o: OptimizationRecommendation = serde_json::from_value(serde_json::json!({
            "id": id,
            "plantId": "p1",
            "optimizationType": "cost_reduction",
            "title": id,
            "createdAt": Utc::now(),
        }))
        .unwrap();
        o.status = status;
        o.implementation.cost.total = investment;
        o.improvements.cost_savings.annual = savings;
        o.calculate_roi();
        o
    }

    fn sample() -> Vec<OptimizationRecommendation> {
        vec![
            opt("a", OptimizationStatus::Proposed, 100.0, 50.0),
            opt("b", OptimizationStatus::InProgress, 200.0, 300.0),
            opt("c", OptimizationStatus::Completed, 100.0, 100.0),
            opt("d", OptimizationStatus::Rejected, 100.0, 0.0),
        ]
    }

    #[test]
    fn test_stats() {
        let stats = optimization_stats(&sample());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.implemented, 1);
        assert_eq!(stats.total_savings, 450.0);
        // ratios 0.5, 1.5, 1.0 and 0.0 for the savings-free rejected item
        assert!((stats.avg_roi.unwrap() - 0.75).abs() < 1e-9);
        assert_eq!(optimization_stats(&[]).avg_roi, None);
    }

    #[test]
    fn test_portfolio_only_active() {
        let p = portfolio(&sample());
        assert_eq!(p.total_optimizations, 2);
        assert_eq!(p.total_investment, 300.0);
        assert_eq!(p.total_annual_savings, 350.0);
        assert!((p.average_roi - 1.0).abs() < 1e-9);
        assert_eq!(portfolio(&[]).average_roi, 0.0);
    }

    #[test]
    fn test_distribution_and_savings() {
        let d = distribution(&sample());
        assert_eq!(d.status_distribution[&OptimizationStatus::Proposed], 1);
        assert_eq!(d.type_distribution[&OptimizationType::CostReduction], 4);

        let s = savings(&sample());
        assert_eq!(s.annual, 400.0);
        assert_eq!(s.implemented, 1);
        assert_eq!(s.in_progress, 1);
    }
}
