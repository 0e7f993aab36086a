//! Emissions analytics
//!
//! Components, leaves first:
//! - `aggregator`: window totals, daily buckets, KPIs
//! - `trend`: half-split trend direction
//! - `forecast`: least-squares projection
//! - `cost`: cost breakdown, NPV, verdicts
//! - `recommendations`: threshold rules and optimization drafts
//!
//! Supporting analyses: `benchmark`, `cost_reduction`, `portfolio`.
//! `engine` ties them together behind the injected configuration.

pub mod aggregator;
pub mod benchmark;
pub mod cost;
pub mod cost_reduction;
pub mod engine;
pub mod forecast;
pub mod portfolio;
pub mod recommendations;
pub mod trend;

pub use aggregator::MetricsAggregator;
pub use benchmark::{Benchmark, BenchmarkComparator, BenchmarkComparison};
pub use cost::{verdict, CostModel};
pub use engine::AnalyticsEngine;
pub use forecast::ForecastEngine;
pub use recommendations::RecommendationGenerator;
pub use trend::{SeriesMetric, TrendEstimator};
