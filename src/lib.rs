//! carbonwatch: emissions analytics for thermal power plants
//!
//! Ingests time-stamped plant telemetry and answers analytics questions
//! over it: window totals and KPIs, trend direction, least-squares
//! forecasts, cost breakdowns, NPV-graded optimizations and rule-based
//! recommendations.
//!
//! ## Architecture
//!
//! - **types**: emission records, plants, optimizations, analytics outputs
//! - **analytics**: pure computation components behind `AnalyticsEngine`
//! - **storage**: `AnalyticsStore` trait with in-memory and sled backends
//! - **service**: loads snapshots from the store and calls the engine
//! - **api**: axum routes over the service
//! - **config**: TOML configuration with validated defaults

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod service;
pub mod storage;
pub mod types;

pub use analytics::AnalyticsEngine;
pub use config::AnalyticsConfig;
pub use error::{AnalyticsError, AnalyticsResult};
pub use service::AnalyticsService;
pub use storage::{AnalyticsStore, InMemoryStore, SledStore, StoreError};
