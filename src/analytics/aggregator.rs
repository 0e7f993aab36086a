//! Emission rollups: window totals, daily buckets, recent performance and KPIs
//!
//! Two averaging conventions coexist:
//! - `summarize` / `time_series` skip undefined values (a record without a
//!   carbon intensity does not drag the average down)
//! - `performance` counts undefined values as zero over the record count

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::defaults::NOMINAL_AVAILABILITY_PERCENT;
use crate::config::CostConfig;
use crate::types::{
    DailyBucket, EmissionRecord, EmissionTotals, EnvironmentalKpis, FinancialKpis, Kpis,
    OperationalKpis, OptimizationStats, PerformanceSnapshot, Plant, TimeWindow,
};

/// Running sums for one group of records.
#[derive(Debug, Default)]
struct Accumulator {
    co2: f64,
    ch4: f64,
    n2o: f64,
    co2e: f64,
    power: f64,
    efficiency_sum: f64,
    efficiency_count: usize,
    intensity_sum: f64,
    intensity_count: usize,
    max_efficiency: Option<f64>,
    min_intensity: Option<f64>,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, record: &EmissionRecord) {
        self.co2 += record.co2();
        self.ch4 += record.emissions.ch4.value;
        self.n2o += record.emissions.n2o.value;
        self.co2e += record.co2_equivalent();
        self.power += record.power();
        if let Some(eff) = record.efficiency.overall {
            self.efficiency_sum += eff;
            self.efficiency_count += 1;
            self.max_efficiency = Some(self.max_efficiency.map_or(eff, |m| m.max(eff)));
        }
        if let Some(ci) = record.carbon_intensity {
            self.intensity_sum += ci;
            self.intensity_count += 1;
            self.min_intensity = Some(self.min_intensity.map_or(ci, |m| m.min(ci)));
        }
        self.count += 1;
    }

    fn avg_efficiency(&self) -> Option<f64> {
        mean_of(self.efficiency_sum, self.efficiency_count)
    }

    fn avg_intensity(&self) -> Option<f64> {
        mean_of(self.intensity_sum, self.intensity_count)
    }

    fn totals(&self) -> EmissionTotals {
        EmissionTotals {
            total_co2: self.co2,
            total_ch4: self.ch4,
            total_n2o: self.n2o,
            total_co2e: self.co2e,
            total_power: self.power,
            avg_efficiency: self.avg_efficiency(),
            avg_carbon_intensity: self.avg_intensity(),
            max_efficiency: self.max_efficiency,
            min_carbon_intensity: self.min_intensity,
            count: self.count,
        }
    }

    fn bucket(&self, date: NaiveDate) -> DailyBucket {
        DailyBucket {
            date,
            co2: self.co2,
            ch4: self.ch4,
            n2o: self.n2o,
            power: self.power,
            efficiency: self.avg_efficiency(),
            carbon_intensity: self.avg_intensity(),
            count: self.count,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_of(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

/// Stateless rollups over record slices.
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Records of `plant_id` inside the closed window, oldest first.
    pub fn filter_window(
        records: &[EmissionRecord],
        plant_id: &str,
        window: &TimeWindow,
    ) -> Vec<EmissionRecord> {
        let mut selected: Vec<EmissionRecord> = records
            .iter()
            .filter(|r| r.plant_id == plant_id && window.contains(r.timestamp))
            .cloned()
            .collect();
        selected.sort_by_key(|r| r.timestamp);
        selected
    }

    pub fn summarize(records: &[EmissionRecord]) -> EmissionTotals {
        let mut acc = Accumulator::default();
        for record in records {
            acc.push(record);
        }
        acc.totals()
    }

    /// Per-day buckets keyed by the UTC calendar date, ascending.
    pub fn time_series(records: &[EmissionRecord]) -> Vec<DailyBucket> {
        let mut days: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
        for record in records {
            days.entry(record.timestamp.date_naive())
                .or_default()
                .push(record);
        }
        days.iter().map(|(date, acc)| acc.bucket(*date)).collect()
    }

    /// Recent-performance snapshot. Undefined efficiency and carbon
    /// intensity count as zero; the divisor is the record count.
    #[allow(clippy::cast_precision_loss)]
    pub fn performance(records: &[EmissionRecord]) -> PerformanceSnapshot {
        if records.is_empty() {
            return PerformanceSnapshot::default();
        }
        let n = records.len() as f64;
        PerformanceSnapshot {
            avg_efficiency: records
                .iter()
                .map(|r| r.efficiency.overall.unwrap_or(0.0))
                .sum::<f64>()
                / n,
            avg_carbon_intensity: records
                .iter()
                .map(|r| r.carbon_intensity.unwrap_or(0.0))
                .sum::<f64>()
                / n,
            total_co2: records.iter().map(EmissionRecord::co2).sum(),
            total_power: records.iter().map(EmissionRecord::power).sum(),
            availability: NOMINAL_AVAILABILITY_PERCENT,
            count: records.len(),
        }
    }

    /// Key performance indicators for a dashboard window.
    ///
    /// Plant-relative figures (cost per MWh, performance against design
    /// efficiency, emission reduction against the design carbon intensity)
    /// are zero without a plant.
    pub fn kpis(
        totals: &EmissionTotals,
        stats: &OptimizationStats,
        plant: Option<&Plant>,
        costs: &CostConfig,
    ) -> Kpis {
        let efficiency = totals.avg_efficiency.unwrap_or(0.0);
        let intensity = totals.avg_carbon_intensity.unwrap_or(0.0);

        let (cost_per_mwh, performance, emission_reduction) = match plant {
            Some(plant) => {
                let performance = if plant.efficiency_baseline > 0.0 && totals.avg_efficiency.is_some() {
                    efficiency / plant.efficiency_baseline * 100.0
                } else {
                    0.0
                };
                let reduction = if plant.carbon_intensity_baseline > 0.0
                    && totals.avg_carbon_intensity.is_some()
                {
                    ((plant.carbon_intensity_baseline - intensity) / plant.carbon_intensity_baseline
                        * 100.0)
                        .max(0.0)
                } else {
                    0.0
                };
                (costs.cost_per_mwh(plant.plant_type), performance, reduction)
            }
            None => (0.0, 0.0, 0.0),
        };

        Kpis {
            environmental: EnvironmentalKpis {
                total_co2: totals.total_co2,
                carbon_intensity: intensity,
                efficiency,
                emission_reduction,
            },
            financial: FinancialKpis {
                total_savings: stats.total_savings,
                average_roi: stats.avg_roi.unwrap_or(0.0),
                cost_per_mwh,
            },
            operational: OperationalKpis {
                total_power: totals.total_power,
                availability: if totals.count > 0 {
                    NOMINAL_AVAILABILITY_PERCENT
                } else {
                    0.0
                },
                performance,
            },
        }
    }
}
