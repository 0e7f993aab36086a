//! Request-scoped orchestration: load a snapshot from the store, hand it to
//! the analytics engine, shape the answer.
//!
//! Every method that depends on the clock takes `now` so results are
//! reproducible in tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analytics::benchmark::{Benchmark, BenchmarkComparison};
use crate::analytics::cost_reduction::{
    self, CarbonTaxImpact, FuelAnalysis, MaintenanceAnalysis, OpportunityCategory,
    OpportunityReport,
};
use crate::analytics::portfolio::{self, Distribution, OptimizationSavings, Portfolio};
use crate::analytics::{AnalyticsEngine, MetricsAggregator, SeriesMetric};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::storage::{AnalyticsStore, RecordQuery};
use crate::types::{
    CostBreakdown, DailyBucket, Dashboard, EmissionRecord, EmissionTotals, ForecastReport,
    ImplementationCost, OptimizationRecommendation, OptimizationStats, OptimizationStatus,
    OptimizationType, PerformanceSnapshot, PeriodSummary, PeriodWindow, Plant, PlantSummary,
    Priority, Recommendation, Roi, TimeWindow, TrendSummary,
};

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
    pub power: f64,
    pub carbon_intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub metric: SeriesMetric,
    pub historical: Vec<HistoricalPoint>,
    pub trends: TrendSummary,
    pub forecast: ForecastReport,
    pub forecast_days: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparativeReport {
    pub plant: PlantSummary,
    pub performance: PerformanceSnapshot,
    pub benchmarks: Benchmark,
    pub comparison: BenchmarkComparison,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationRef {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub optimization_type: OptimizationType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Benefits {
    pub annual_savings: f64,
    pub emission_reduction: f64,
    pub efficiency_gain: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationCostBenefit {
    pub optimization: OptimizationRef,
    pub costs: ImplementationCost,
    pub benefits: Benefits,
    pub roi: Roi,
    pub payback_period: Option<f64>,
    pub net_present_value: f64,
    pub recommendation: String,
}

/// One optimization in detail, or the plant's active portfolio.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CostBenefit {
    Single(Box<OptimizationCostBenefit>),
    Portfolio(Portfolio),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsAnalytics {
    pub summary: EmissionTotals,
    pub time_series: Vec<DailyBucket>,
    pub period: RequestedPeriod,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RequestedPeriod {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub pages: usize,
    pub total: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// 1-based page of `items`. Zero page or limit is rejected.
fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> AnalyticsResult<Page<T>> {
    if page == 0 || limit == 0 {
        return Err(AnalyticsError::InvalidInput(
            "page and limit must be at least 1".to_string(),
        ));
    }
    let total = items.len();
    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();
    Ok(Page {
        items,
        pagination: Pagination {
            current: page,
            pages: total.div_ceil(limit),
            total,
            limit,
        },
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecommendations {
    pub plant: PlantSummary,
    pub recommendations: Vec<Recommendation>,
    pub analysis_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalReport {
    pub plant: PlantSummary,
    pub recommendations: Vec<OptimizationRecommendation>,
    pub analysis_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysis {
    pub plant: PlantSummary,
    pub period: PeriodSummary,
    pub cost_breakdown: CostBreakdown,
    pub optimization_savings: OptimizationSavings,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSummary {
    pub summary: OptimizationStats,
    #[serde(flatten)]
    pub distribution: Distribution,
    pub period: PeriodSummary,
}

/// Filters for the optimization listing; all optional.
#[derive(Debug, Clone, Default)]
pub struct OptimizationFilter {
    pub plant_id: Option<String>,
    pub optimization_type: Option<OptimizationType>,
    pub status: Option<OptimizationStatus>,
    pub priority: Option<Priority>,
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone)]
pub struct AnalyticsService {
    engine: AnalyticsEngine,
    store: Arc<dyn AnalyticsStore>,
}

impl AnalyticsService {
    pub fn new(engine: AnalyticsEngine, store: Arc<dyn AnalyticsStore>) -> Self {
        Self { engine, store }
    }

    pub fn engine(&self) -> &AnalyticsEngine {
        &self.engine
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn require_plant(&self, plant_id: &str) -> AnalyticsResult<Plant> {
        self.store
            .fetch_plant(plant_id)
            .await?
            .ok_or_else(|| AnalyticsError::plant_not_found(plant_id))
    }

    async fn require_optimization(&self, id: &str) -> AnalyticsResult<OptimizationRecommendation> {
        self.store
            .fetch_optimization(id)
            .await?
            .ok_or_else(|| AnalyticsError::optimization_not_found(id))
    }

    /// The plant's most recent records, oldest first.
    async fn recent_records(&self, plant_id: &str) -> AnalyticsResult<Vec<EmissionRecord>> {
        let limit = self.engine.config().storage.recent_record_limit;
        let mut records = self.store.fetch_latest_records(plant_id, limit).await?;
        records.reverse();
        Ok(records)
    }

    // ------------------------------------------------------------------
    // Plants and ingestion
    // ------------------------------------------------------------------

    pub async fn create_plant(&self, mut plant: Plant) -> AnalyticsResult<Plant> {
        let problems = plant.validate();
        if !problems.is_empty() {
            return Err(AnalyticsError::invalid(&problems));
        }
        if plant.id.trim().is_empty() {
            plant.id = Uuid::new_v4().to_string();
        }
        self.store.put_plant(&plant).await?;
        info!(plant_id = %plant.id, plant_type = %plant.plant_type, "plant registered");
        Ok(plant)
    }

    pub async fn get_plant(&self, plant_id: &str) -> AnalyticsResult<Plant> {
        self.require_plant(plant_id).await
    }

    /// Validate and store a sample. Carbon intensity is always recomputed.
    pub async fn ingest_record(&self, mut record: EmissionRecord) -> AnalyticsResult<EmissionRecord> {
        record.normalize();
        let problems = record.validate();
        if !problems.is_empty() {
            return Err(AnalyticsError::invalid(&problems));
        }
        self.require_plant(&record.plant_id).await?;
        if record.id.trim().is_empty() {
            record.id = Uuid::new_v4().to_string();
        }
        self.store.put_record(&record).await?;
        debug!(plant_id = %record.plant_id, record_id = %record.id, "emission record stored");
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Emissions
    // ------------------------------------------------------------------

    pub async fn list_emissions(
        &self,
        query: RecordQuery,
        page: usize,
        limit: usize,
    ) -> AnalyticsResult<Page<EmissionRecord>> {
        let records = self.store.query_records(&query).await?;
        paginate(records, page, limit)
    }

    /// Newest sample of a plant.
    pub async fn latest_emission(&self, plant_id: &str) -> AnalyticsResult<EmissionRecord> {
        self.store
            .fetch_latest_records(plant_id, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AnalyticsError::NotFound {
                entity: "emission record",
                id: plant_id.to_string(),
            })
    }

    /// Totals and daily buckets over an optional custom window.
    pub async fn emissions_analytics(
        &self,
        plant_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AnalyticsResult<EmissionsAnalytics> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(AnalyticsError::InvalidInput("start must not be after end".to_string()));
            }
        }
        let mut records = self
            .store
            .query_records(&RecordQuery {
                plant_id: Some(plant_id.to_string()),
                start,
                end,
            })
            .await?;
        records.reverse();
        Ok(EmissionsAnalytics {
            summary: MetricsAggregator::summarize(&records),
            time_series: MetricsAggregator::time_series(&records),
            period: RequestedPeriod { start, end },
        })
    }

    // ------------------------------------------------------------------
    // Analytics
    // ------------------------------------------------------------------

    pub async fn dashboard(
        &self,
        plant_id: &str,
        period: PeriodWindow,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<Dashboard> {
        let window = period.resolve(now);
        let plant = self.store.fetch_plant(plant_id).await?;
        let records = self.store.fetch_records(plant_id, window.start, window.end).await?;
        let optimizations = self.optimizations_created_in(plant_id, &window).await?;

        let dashboard =
            self.engine
                .aggregate_dashboard(plant.as_ref(), &records, &optimizations, &window);
        debug!(
            plant_id,
            records = dashboard.emissions.count,
            optimizations = dashboard.optimizations.total,
            "dashboard aggregated"
        );
        Ok(dashboard)
    }

    async fn optimizations_created_in(
        &self,
        plant_id: &str,
        window: &TimeWindow,
    ) -> AnalyticsResult<Vec<OptimizationRecommendation>> {
        Ok(self
            .store
            .fetch_optimizations(Some(plant_id), None)
            .await?
            .into_iter()
            .filter(|o| window.contains(o.created_at))
            .collect())
    }

    /// Trend and forecast over the plant's oldest history, capped by
    /// `trend_history_limit`.
    pub async fn trends(
        &self,
        plant_id: &str,
        metric: SeriesMetric,
        forecast_days: Option<u32>,
    ) -> AnalyticsResult<TrendReport> {
        let config = self.engine.config();
        let mut history = self
            .store
            .query_records(&RecordQuery {
                plant_id: Some(plant_id.to_string()),
                ..RecordQuery::default()
            })
            .await?;
        history.reverse();
        history.truncate(config.storage.trend_history_limit);

        let series: Vec<(DateTime<Utc>, f64)> = history
            .iter()
            .map(|r| (r.timestamp, metric.value(r)))
            .collect();
        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

        let trends = self.engine.estimate_trend(&values);
        let forecast = self.engine.forecast(&series, forecast_days);
        if let Some(fallback) = forecast.fallback {
            debug!(plant_id, ?fallback, samples = series.len(), "forecast degenerate");
        }

        Ok(TrendReport {
            metric,
            historical: history
                .iter()
                .map(|r| HistoricalPoint {
                    date: r.timestamp,
                    value: metric.value(r),
                    power: r.power(),
                    carbon_intensity: r.carbon_intensity.unwrap_or(0.0),
                })
                .collect(),
            trends,
            forecast,
            forecast_days: config.forecast.horizon(forecast_days),
        })
    }

    pub async fn comparative(&self, plant_id: &str) -> AnalyticsResult<ComparativeReport> {
        let plant = self.require_plant(plant_id).await?;
        let recent = self.recent_records(plant_id).await?;
        let (benchmarks, comparison, recommendations) =
            self.engine.compare_to_benchmark(plant.plant_type, &recent);
        Ok(ComparativeReport {
            plant: PlantSummary::from(&plant),
            performance: MetricsAggregator::performance(&recent),
            benchmarks,
            comparison,
            recommendations,
        })
    }

    pub async fn cost_benefit(
        &self,
        plant_id: Option<&str>,
        optimization_id: Option<&str>,
    ) -> AnalyticsResult<CostBenefit> {
        if let Some(id) = optimization_id {
            let mut opt = self.require_optimization(id).await?;
            let evaluation = self.engine.evaluate_optimization(&opt);
            opt.calculate_roi();
            opt.roi.net_present_value = Some(evaluation.npv);
            return Ok(CostBenefit::Single(Box::new(OptimizationCostBenefit {
                optimization: OptimizationRef {
                    id: opt.id.clone(),
                    title: opt.title.clone(),
                    optimization_type: opt.optimization_type,
                },
                costs: opt.implementation.cost,
                benefits: Benefits {
                    annual_savings: opt.annual_savings(),
                    emission_reduction: opt.improvements.emission_reduction.total,
                    efficiency_gain: opt.improvements.efficiency_gain.overall,
                },
                roi: opt.roi,
                payback_period: evaluation.payback_period,
                net_present_value: evaluation.npv,
                recommendation: evaluation.recommendation,
            })));
        }

        let Some(plant_id) = plant_id else {
            return Err(AnalyticsError::InvalidInput(
                "plant_id or optimization_id is required".to_string(),
            ));
        };
        let opts = self.store.fetch_optimizations(Some(plant_id), None).await?;
        Ok(CostBenefit::Portfolio(portfolio::portfolio(&opts)))
    }

    /// Rule-based recommendations from the plant's recent records.
    pub async fn recommendations(
        &self,
        plant_id: &str,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<PlantRecommendations> {
        let plant = self.require_plant(plant_id).await?;
        let recent = self.recent_records(plant_id).await?;
        let recommendations = self.engine.generate_recommendations(&recent);
        info!(plant_id, count = recommendations.len(), samples = recent.len(), "recommendations generated");
        Ok(PlantRecommendations {
            plant: PlantSummary::from(&plant),
            recommendations,
            analysis_date: now,
        })
    }

    // ------------------------------------------------------------------
    // Cost reduction
    // ------------------------------------------------------------------

    pub async fn cost_analysis(
        &self,
        plant_id: &str,
        period: PeriodWindow,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<CostAnalysis> {
        let plant = self.require_plant(plant_id).await?;
        let window = period.resolve(now);
        let records = self.store.fetch_records(plant_id, window.start, window.end).await?;
        let totals = MetricsAggregator::summarize(&records);
        let cost_breakdown = self.engine.cost_breakdown(plant.plant_type, &totals);

        let opts = self.store.fetch_optimizations(Some(plant_id), None).await?;
        Ok(CostAnalysis {
            plant: PlantSummary::from(&plant),
            period: window.summary(),
            recommendations: cost_reduction::breakdown_recommendations(&cost_breakdown),
            cost_breakdown,
            optimization_savings: portfolio::savings(&opts),
        })
    }

    pub fn opportunities(
        &self,
        category: Option<OpportunityCategory>,
        priority: Option<Priority>,
    ) -> OpportunityReport {
        cost_reduction::opportunities(category, priority)
    }

    pub async fn fuel_analysis(&self, plant_id: &str) -> AnalyticsResult<FuelAnalysis> {
        let plant = self.require_plant(plant_id).await?;
        let recent = self.recent_records(plant_id).await?;
        Ok(cost_reduction::fuel_analysis(&plant, &recent))
    }

    pub async fn maintenance_analysis(
        &self,
        plant_id: &str,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<MaintenanceAnalysis> {
        let plant = self.require_plant(plant_id).await?;
        Ok(cost_reduction::maintenance_analysis(&plant, &self.engine.config().costs, now))
    }

    pub async fn carbon_tax(&self, plant_id: &str) -> AnalyticsResult<CarbonTaxImpact> {
        self.require_plant(plant_id).await?;
        let recent = self.recent_records(plant_id).await?;
        Ok(cost_reduction::carbon_tax_impact(
            &recent,
            &self.engine.cost_model(),
            &self.engine.config().costs,
        ))
    }

    // ------------------------------------------------------------------
    // Optimizations
    // ------------------------------------------------------------------

    /// Store a new optimization. Id, creation time and ROI figures are
    /// assigned here.
    pub async fn create_optimization(
        &self,
        mut opt: OptimizationRecommendation,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<OptimizationRecommendation> {
        let problems = opt.validate();
        if !problems.is_empty() {
            return Err(AnalyticsError::invalid(&problems));
        }
        self.require_plant(&opt.plant_id).await?;

        opt.id = Uuid::new_v4().to_string();
        opt.created_at = now;
        opt.calculate_roi();
        opt.roi.net_present_value = Some(self.engine.evaluate_optimization(&opt).npv);

        self.store.put_optimization(&opt).await?;
        info!(
            optimization_id = %opt.id,
            plant_id = %opt.plant_id,
            kind = %opt.optimization_type,
            "optimization created"
        );
        Ok(opt)
    }

    pub async fn get_optimization(&self, id: &str) -> AnalyticsResult<OptimizationRecommendation> {
        self.require_optimization(id).await
    }

    pub async fn list_optimizations(
        &self,
        filter: &OptimizationFilter,
        page: usize,
        limit: usize,
    ) -> AnalyticsResult<Page<OptimizationRecommendation>> {
        let opts: Vec<OptimizationRecommendation> = self
            .store
            .fetch_optimizations(filter.plant_id.as_deref(), filter.status)
            .await?
            .into_iter()
            .filter(|o| filter.optimization_type.map_or(true, |t| o.optimization_type == t))
            .filter(|o| filter.priority.map_or(true, |p| o.priority == p))
            .collect();
        paginate(opts, page, limit)
    }

    /// Move an optimization along its lifecycle.
    pub async fn update_status(
        &self,
        id: &str,
        next: OptimizationStatus,
    ) -> AnalyticsResult<OptimizationRecommendation> {
        let mut opt = self.require_optimization(id).await?;
        let from = opt.status;
        opt.status = from.transition(next)?;
        self.store.put_optimization(&opt).await?;
        info!(optimization_id = %id, %from, to = %next, "optimization status changed");
        Ok(opt)
    }

    pub async fn optimization_summary(
        &self,
        plant_id: &str,
        period: PeriodWindow,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<OptimizationSummary> {
        let window = period.resolve(now);
        let opts = self.optimizations_created_in(plant_id, &window).await?;
        Ok(OptimizationSummary {
            summary: portfolio::optimization_stats(&opts),
            distribution: portfolio::distribution(&opts),
            period: window.summary(),
        })
    }

    /// Draft optimizations from recent performance. Drafts are not stored.
    pub async fn propose_optimizations(
        &self,
        plant_id: &str,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<ProposalReport> {
        let plant = self.require_plant(plant_id).await?;
        let recent = self.recent_records(plant_id).await?;
        Ok(ProposalReport {
            plant: PlantSummary::from(&plant),
            recommendations: self.engine.propose_optimizations(&plant, &recent, now),
            analysis_date: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::storage::InMemoryStore;
    use crate::types::PlantType;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    async fn service_with_plant() -> AnalyticsService {
        let service = AnalyticsService::new(
            AnalyticsEngine::new(Arc::new(AnalyticsConfig::default())),
            Arc::new(InMemoryStore::new()),
        );
        service
            .create_plant(Plant::new("p1", "North", PlantType::Coal, 500.0))
            .await
            .unwrap();
        service
    }

    fn optimization(plant: &str) -> OptimizationRecommendation {
        serde_json::from_value(serde_json::json!({
            "plantId": plant,
            "optimizationType": "efficiency_improvement",
            "title": "Sootblower tuning",
            "implementation": {"cost": {"total": 200000.0}},
            "improvements": {"costSavings": {"annual": 500000.0}},
        }))
        .unwrap()
    }

    #[test]
    fn test_paginate() {
        let page = paginate((0..45).collect::<Vec<_>>(), 3, 20).unwrap();
        assert_eq!(page.items, (40..45).collect::<Vec<_>>());
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.pagination.total, 45);
        assert!(paginate(vec![1], 0, 20).is_err());
    }

    #[tokio::test]
    async fn test_ingest_recomputes_intensity_and_requires_plant() {
        let service = service_with_plant().await;
        let mut record = EmissionRecord::new("p1", now(), 900.0, 1.0);
        record.carbon_intensity = Some(1.0);
        let stored = service.ingest_record(record).await.unwrap();
        assert_eq!(stored.carbon_intensity, Some(900.0));
        assert!(!stored.id.is_empty());

        let orphan = EmissionRecord::new("nope", now(), 1.0, 1.0);
        assert!(matches!(
            service.ingest_record(orphan).await,
            Err(AnalyticsError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_optimization_lifecycle() {
        let service = service_with_plant().await;
        let created = service.create_optimization(optimization("p1"), now()).await.unwrap();
        assert_eq!(created.status, OptimizationStatus::Proposed);
        assert_eq!(created.roi.payback_period, Some(0.4));
        assert!(created.roi.net_present_value.is_some());

        let approved = service
            .update_status(&created.id, OptimizationStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, OptimizationStatus::Approved);

        let err = service
            .update_status(&created.id, OptimizationStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_trends_on_empty_history() {
        let service = service_with_plant().await;
        let report = service.trends("p1", SeriesMetric::Co2, None).await.unwrap();
        assert!(report.historical.is_empty());
        assert!(report.forecast.points.is_empty());
        assert_eq!(report.trends.confidence, 0.0);
        assert_eq!(report.forecast_days, 30);
    }

    #[tokio::test]
    async fn test_recommendations_use_recent_window() {
        let service = service_with_plant().await;
        for h in 0..5 {
            let record = EmissionRecord::new("p1", now() - Duration::hours(h), 900.0, 1.0)
                .with_efficiency(30.0);
            service.ingest_record(record).await.unwrap();
        }
        let report = service.recommendations("p1", now()).await.unwrap();
        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.recommendations[2].title, "AI-Powered Optimization");
    }

    #[tokio::test]
    async fn test_cost_benefit_requires_a_target() {
        let service = service_with_plant().await;
        assert!(matches!(
            service.cost_benefit(None, None).await,
            Err(AnalyticsError::InvalidInput(_))
        ));
        assert!(matches!(
            service.cost_benefit(None, Some("missing")).await,
            Err(AnalyticsError::NotFound { .. })
        ));
    }
}
