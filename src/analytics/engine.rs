//! Pure computation entry points, one per analytics question
//!
//! The engine owns the immutable configuration and hands borrowed slices of
//! it to the component that answers each call. It never touches the store:
//! callers materialise records and optimizations first.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::aggregator::MetricsAggregator;
use super::benchmark::{Benchmark, BenchmarkComparator, BenchmarkComparison};
use super::cost::CostModel;
use super::portfolio;
use super::recommendations::RecommendationGenerator;
use super::trend::TrendEstimator;
use super::forecast::ForecastEngine;
use crate::config::AnalyticsConfig;
use crate::types::{
    CostBreakdown, Dashboard, EmissionRecord, EmissionTotals, ForecastReport,
    OptimizationEvaluation, OptimizationRecommendation, Plant, PlantSummary, PlantType,
    Recommendation, TimeWindow, TrendSummary,
};

#[derive(Clone)]
pub struct AnalyticsEngine {
    config: Arc<AnalyticsConfig>,
}

impl AnalyticsEngine {
    pub fn new(config: Arc<AnalyticsConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn cost_model(&self) -> CostModel<'_> {
        CostModel::new(&self.config.costs, &self.config.finance)
    }

    /// Totals, daily series and KPIs over `records` inside `window`.
    ///
    /// Records outside the window or belonging to another plant are ignored
    /// when `plant` is given.
    pub fn aggregate_dashboard(
        &self,
        plant: Option<&Plant>,
        records: &[EmissionRecord],
        optimizations: &[OptimizationRecommendation],
        window: &TimeWindow,
    ) -> Dashboard {
        let selected: Vec<EmissionRecord> = match plant {
            Some(p) => MetricsAggregator::filter_window(records, &p.id, window),
            None => {
                let mut in_window: Vec<EmissionRecord> = records
                    .iter()
                    .filter(|r| window.contains(r.timestamp))
                    .cloned()
                    .collect();
                in_window.sort_by_key(|r| r.timestamp);
                in_window
            }
        };

        let emissions = MetricsAggregator::summarize(&selected);
        let stats = portfolio::optimization_stats(optimizations);
        let kpis = MetricsAggregator::kpis(&emissions, &stats, plant, &self.config.costs);

        Dashboard {
            period: window.summary(),
            plant: plant.map(PlantSummary::from),
            time_series: MetricsAggregator::time_series(&selected),
            emissions,
            optimizations: stats,
            kpis,
        }
    }

    pub fn estimate_trend(&self, values: &[f64]) -> TrendSummary {
        TrendEstimator::estimate(values, self.config.thresholds.trend_change_percent)
    }

    /// Project `horizon_days` (default and cap from config) past the latest sample.
    pub fn forecast(&self, series: &[(DateTime<Utc>, f64)], horizon_days: Option<u32>) -> ForecastReport {
        let forecast = &self.config.forecast;
        ForecastEngine::forecast(series, forecast.horizon(horizon_days), forecast.min_points)
    }

    pub fn cost_breakdown(&self, plant_type: PlantType, totals: &EmissionTotals) -> CostBreakdown {
        self.cost_model()
            .breakdown(plant_type, totals.total_power, totals.total_co2)
    }

    pub fn evaluate_optimization(&self, optimization: &OptimizationRecommendation) -> OptimizationEvaluation {
        self.cost_model().evaluate(optimization)
    }

    /// Rule-based recommendations over a plant's recent records.
    pub fn generate_recommendations(&self, recent: &[EmissionRecord]) -> Vec<Recommendation> {
        let snapshot = MetricsAggregator::performance(recent);
        RecommendationGenerator::new(&self.config.thresholds).generate(&snapshot)
    }

    /// Draft optimizations for `plant` from its recent records.
    pub fn propose_optimizations(
        &self,
        plant: &Plant,
        recent: &[EmissionRecord],
        now: DateTime<Utc>,
    ) -> Vec<OptimizationRecommendation> {
        let snapshot = MetricsAggregator::performance(recent);
        RecommendationGenerator::new(&self.config.thresholds).propose(plant, &snapshot, &self.cost_model(), now)
    }

    /// Benchmark comparison plus the recommendations it triggers.
    pub fn compare_to_benchmark(
        &self,
        plant_type: PlantType,
        recent: &[EmissionRecord],
    ) -> (Benchmark, BenchmarkComparison, Vec<Recommendation>) {
        let benchmark = Benchmark::for_plant_type(plant_type);
        let comparison = BenchmarkComparator::compare(&MetricsAggregator::performance(recent), &benchmark);
        let recs = BenchmarkComparator::recommendations(
            &comparison,
            self.config.thresholds.benchmark_performance_alert_percent,
        );
        (benchmark, comparison, recs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PeriodWindow, RecommendationKind, TrendDirection};
    use chrono::{Duration, TimeZone};

    fn engine() -> AnalyticsEngine {
        AnalyticsEngine::new(Arc::new(AnalyticsConfig::default()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_dashboard_filters_plant_and_window() {
        let plant = Plant::new("p1", "North", PlantType::Coal, 500.0);
        let records = vec![
            EmissionRecord::new("p1", now() - Duration::days(2), 1_000.0, 2.0).with_efficiency(35.0),
            EmissionRecord::new("p1", now() - Duration::days(1), 3_000.0, 2.0).with_efficiency(45.0),
            EmissionRecord::new("p2", now() - Duration::days(1), 9_000.0, 1.0),
            EmissionRecord::new("p1", now() - Duration::days(40), 9_000.0, 1.0),
        ];
        let window = PeriodWindow::Month.resolve(now());
        let dash = engine().aggregate_dashboard(Some(&plant), &records, &[], &window);

        assert_eq!(dash.emissions.count, 2);
        assert_eq!(dash.emissions.total_co2, 4_000.0);
        assert_eq!(dash.time_series.len(), 2);
        assert_eq!(dash.kpis.financial.cost_per_mwh, 45.0);
        assert_eq!(dash.period.days, 30);
        assert_eq!(dash.plant.unwrap().id, "p1");
    }

    #[test]
    fn test_trend_uses_configured_threshold() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let trend = engine().estimate_trend(&values);
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert!(trend.change > 5.0);
    }

    #[test]
    fn test_forecast_default_horizon() {
        let series: Vec<_> = (0..12)
            .map(|d| (now() + Duration::days(d), 10.0))
            .collect();
        assert_eq!(engine().forecast(&series, None).points.len(), 30);
        assert_eq!(engine().forecast(&series, Some(10_000)).points.len(), 365);
    }

    #[test]
    fn test_recommendations_empty() {
        let recs = engine().generate_recommendations(&[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::DataCollection);
    }

    #[test]
    fn test_cost_breakdown_from_totals() {
        let totals = EmissionTotals {
            total_power: 100.0,
            total_co2: 1_000.0,
            ..EmissionTotals::default()
        };
        let b = engine().cost_breakdown(PlantType::NaturalGas, &totals);
        assert_eq!(b.total.amount, 3_500.0);
        assert_eq!(b.carbon_tax.amount, 50.0);
    }
}
