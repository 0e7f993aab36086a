//! In-memory store. Not durable: data is lost on restart.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    sort_newest_first, sort_oldest_first, sort_optimizations, AnalyticsStore, RecordQuery, StoreError,
};
use crate::types::{EmissionRecord, OptimizationRecommendation, OptimizationStatus, Plant};

#[derive(Default)]
pub struct InMemoryStore {
    plants: RwLock<HashMap<String, Plant>>,
    records: RwLock<Vec<EmissionRecord>>,
    optimizations: RwLock<HashMap<String, OptimizationRecommendation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

#[async_trait]
impl AnalyticsStore for InMemoryStore {
    async fn fetch_records(
        &self,
        plant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EmissionRecord>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        let mut out: Vec<EmissionRecord> = records
            .iter()
            .filter(|r| r.plant_id == plant_id && r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect();
        sort_oldest_first(&mut out);
        Ok(out)
    }

    async fn fetch_latest_records(
        &self,
        plant_id: &str,
        limit: usize,
    ) -> Result<Vec<EmissionRecord>, StoreError> {
        let mut out = self
            .query_records(&RecordQuery {
                plant_id: Some(plant_id.to_string()),
                ..RecordQuery::default()
            })
            .await?;
        out.truncate(limit);
        Ok(out)
    }

    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<EmissionRecord>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        let mut out: Vec<EmissionRecord> = records.iter().filter(|r| query.matches(r)).cloned().collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn put_record(&self, record: &EmissionRecord) -> Result<(), StoreError> {
        self.records.write().map_err(poisoned)?.push(record.clone());
        Ok(())
    }

    async fn fetch_plant(&self, plant_id: &str) -> Result<Option<Plant>, StoreError> {
        Ok(self.plants.read().map_err(poisoned)?.get(plant_id).cloned())
    }

    async fn put_plant(&self, plant: &Plant) -> Result<(), StoreError> {
        self.plants
            .write()
            .map_err(poisoned)?
            .insert(plant.id.clone(), plant.clone());
        Ok(())
    }

    async fn fetch_optimizations(
        &self,
        plant_id: Option<&str>,
        status: Option<OptimizationStatus>,
    ) -> Result<Vec<OptimizationRecommendation>, StoreError> {
        let opts = self.optimizations.read().map_err(poisoned)?;
        let mut out: Vec<OptimizationRecommendation> = opts
            .values()
            .filter(|o| plant_id.map_or(true, |p| o.plant_id == p))
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        sort_optimizations(&mut out);
        Ok(out)
    }

    async fn fetch_optimization(&self, id: &str) -> Result<Option<OptimizationRecommendation>, StoreError> {
        Ok(self.optimizations.read().map_err(poisoned)?.get(id).cloned())
    }

    async fn put_optimization(&self, optimization: &OptimizationRecommendation) -> Result<(), StoreError> {
        self.optimizations
            .write()
            .map_err(poisoned)?
            .insert(optimization.id.clone(), optimization.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
