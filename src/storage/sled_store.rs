//! Durable store on sled
//!
//! Trees:
//! - `plants`: plant id → JSON
//! - `emissions`: `plant_id \0 ts id` → JSON, where `ts` is the epoch
//!   milliseconds with the sign bit flipped, big-endian, so byte order is
//!   chronological order within a plant
//! - `optimizations`: optimization id → JSON

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sled::{Db, IVec, Tree};

use super::{
    sort_newest_first, sort_oldest_first, sort_optimizations, AnalyticsStore, RecordQuery, StoreError,
};
use crate::types::{EmissionRecord, OptimizationRecommendation, OptimizationStatus, Plant};

#[derive(Clone)]
pub struct SledStore {
    db: Db,
    plants: Tree,
    emissions: Tree,
    optimizations: Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        tracing::info!(path = %path.display(), "sled store opened");
        Ok(Self {
            plants: db.open_tree("plants")?,
            emissions: db.open_tree("emissions")?,
            optimizations: db.open_tree("optimizations")?,
            db,
        })
    }

    pub async fn flush(&self) -> Result<(), StoreError> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[allow(clippy::cast_sign_loss)]
fn encode_ts(ts: DateTime<Utc>) -> [u8; 8] {
    // Flipping the sign bit makes two's-complement order match unsigned byte order.
    ((ts.timestamp_millis() as u64) ^ (1 << 63)).to_be_bytes()
}

fn plant_prefix(plant_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(plant_id.len() + 1);
    key.extend_from_slice(plant_id.as_bytes());
    key.push(0);
    key
}

fn time_key(plant_id: &str, ts: DateTime<Utc>) -> Vec<u8> {
    let mut key = plant_prefix(plant_id);
    key.extend_from_slice(&encode_ts(ts));
    key
}

fn record_key(record: &EmissionRecord) -> Vec<u8> {
    let mut key = time_key(&record.plant_id, record.timestamp);
    key.extend_from_slice(record.id.as_bytes());
    key
}

fn decode<T: DeserializeOwned>(entry: Result<(IVec, IVec), sled::Error>) -> Result<T, StoreError> {
    let (_, value) = entry?;
    Ok(serde_json::from_slice(&value)?)
}

#[async_trait]
impl AnalyticsStore for SledStore {
    async fn fetch_records(
        &self,
        plant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EmissionRecord>, StoreError> {
        if start > end {
            return Ok(Vec::new());
        }
        // Keys carry whole milliseconds; the boundary millisecond may hold
        // records outside the window, so the exact bounds are checked again.
        let lo = time_key(plant_id, start);
        let hi = time_key(plant_id, end + chrono::Duration::milliseconds(1));
        let mut out = Vec::new();
        for entry in self.emissions.range(lo..hi) {
            let record: EmissionRecord = decode(entry)?;
            if record.timestamp >= start && record.timestamp <= end {
                out.push(record);
            }
        }
        sort_oldest_first(&mut out);
        Ok(out)
    }

    async fn fetch_latest_records(
        &self,
        plant_id: &str,
        limit: usize,
    ) -> Result<Vec<EmissionRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        // Finish the millisecond group the limit lands in, then order exactly.
        let mut out: Vec<EmissionRecord> = Vec::new();
        for entry in self.emissions.scan_prefix(plant_prefix(plant_id)).rev() {
            let record: EmissionRecord = decode(entry)?;
            if let Some(last) = out.last() {
                if out.len() >= limit
                    && last.timestamp.timestamp_millis() != record.timestamp.timestamp_millis()
                {
                    break;
                }
            }
            out.push(record);
        }
        sort_newest_first(&mut out);
        out.truncate(limit);
        Ok(out)
    }

    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<EmissionRecord>, StoreError> {
        let iter = match &query.plant_id {
            Some(plant_id) => self.emissions.scan_prefix(plant_prefix(plant_id)),
            None => self.emissions.iter(),
        };
        let mut out = Vec::new();
        for entry in iter {
            let record: EmissionRecord = decode(entry)?;
            if query.matches(&record) {
                out.push(record);
            }
        }
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn put_record(&self, record: &EmissionRecord) -> Result<(), StoreError> {
        self.emissions
            .insert(record_key(record), serde_json::to_vec(record)?)?;
        Ok(())
    }

    async fn fetch_plant(&self, plant_id: &str) -> Result<Option<Plant>, StoreError> {
        match self.plants.get(plant_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put_plant(&self, plant: &Plant) -> Result<(), StoreError> {
        self.plants
            .insert(plant.id.as_bytes(), serde_json::to_vec(plant)?)?;
        Ok(())
    }

    async fn fetch_optimizations(
        &self,
        plant_id: Option<&str>,
        status: Option<OptimizationStatus>,
    ) -> Result<Vec<OptimizationRecommendation>, StoreError> {
        let mut out = Vec::new();
        for entry in &self.optimizations {
            let opt: OptimizationRecommendation = decode(entry)?;
            if plant_id.map_or(true, |p| opt.plant_id == p) && status.map_or(true, |s| opt.status == s) {
                out.push(opt);
            }
        }
        sort_optimizations(&mut out);
        Ok(out)
    }

    async fn fetch_optimization(&self, id: &str) -> Result<Option<OptimizationRecommendation>, StoreError> {
        match self.optimizations.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put_optimization(&self, optimization: &OptimizationRecommendation) -> Result<(), StoreError> {
        self.optimizations
            .insert(optimization.id.as_bytes(), serde_json::to_vec(optimization)?)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}
