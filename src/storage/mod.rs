//! Persistence boundary for plants, emission records and optimizations
//!
//! The analytics core only reads through [`AnalyticsStore`]; ingestion and
//! optimization tracking write through it. Two backends:
//! - `InMemoryStore`: `RwLock`-guarded collections for tests and throwaway runs
//! - `SledStore`: durable sled trees, one per entity

mod memory;
mod sled_store;

pub use memory::InMemoryStore;
pub use sled_store::SledStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{EmissionRecord, OptimizationRecommendation, OptimizationStatus, Plant};

/// Store failures. Surfaced to callers as "upstream unavailable".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Record filter for listings. Every bound is optional; bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub plant_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl RecordQuery {
    pub fn matches(&self, record: &EmissionRecord) -> bool {
        self.plant_id.as_deref().map_or(true, |p| record.plant_id == p)
            && self.start.map_or(true, |s| record.timestamp >= s)
            && self.end.map_or(true, |e| record.timestamp <= e)
    }
}

/// Backend-agnostic persistence.
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Records of one plant in `[start, end]`, oldest first.
    async fn fetch_records(
        &self,
        plant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EmissionRecord>, StoreError>;

    /// The `limit` newest records of one plant, newest first.
    async fn fetch_latest_records(
        &self,
        plant_id: &str,
        limit: usize,
    ) -> Result<Vec<EmissionRecord>, StoreError>;

    /// Records matching `query` across plants, newest first.
    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<EmissionRecord>, StoreError>;

    async fn put_record(&self, record: &EmissionRecord) -> Result<(), StoreError>;

    async fn fetch_plant(&self, plant_id: &str) -> Result<Option<Plant>, StoreError>;

    async fn put_plant(&self, plant: &Plant) -> Result<(), StoreError>;

    /// Optimizations, newest first, optionally narrowed by plant and status.
    async fn fetch_optimizations(
        &self,
        plant_id: Option<&str>,
        status: Option<OptimizationStatus>,
    ) -> Result<Vec<OptimizationRecommendation>, StoreError>;

    async fn fetch_optimization(&self, id: &str) -> Result<Option<OptimizationRecommendation>, StoreError>;

    /// Insert or replace by id.
    async fn put_optimization(&self, optimization: &OptimizationRecommendation) -> Result<(), StoreError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Oldest first, ties broken by id.
fn sort_oldest_first(records: &mut [EmissionRecord]) {
    records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
}

/// Newest first, ties broken by id so listings are stable.
fn sort_newest_first(records: &mut [EmissionRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
}

fn sort_optimizations(opts: &mut [OptimizationRecommendation]) {
    opts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}
