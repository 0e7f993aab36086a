//! Plant performance against industry benchmarks

use serde::{Deserialize, Serialize};

use crate::types::{PerformanceSnapshot, PlantType, Priority, Recommendation, RecommendationKind};

/// Typical figures for a plant type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benchmark {
    /// Overall efficiency (%)
    pub efficiency: f64,
    /// kg CO2 per MWh
    pub carbon_intensity: f64,
    /// Availability (%)
    pub availability: f64,
}

impl Benchmark {
    /// Benchmark for `plant_type`. Types without their own table use coal.
    pub fn for_plant_type(plant_type: PlantType) -> Self {
        match plant_type {
            PlantType::NaturalGas => Self {
                efficiency: 50.0,
                carbon_intensity: 400.0,
                availability: 90.0,
            },
            PlantType::Oil => Self {
                efficiency: 40.0,
                carbon_intensity: 700.0,
                availability: 88.0,
            },
            _ => Self {
                efficiency: 35.0,
                carbon_intensity: 900.0,
                availability: 85.0,
            },
        }
    }
}

/// One metric: current value, benchmark and performance relative to it (%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub current: f64,
    pub benchmark: f64,
    /// `None` when the ratio is undefined
    pub performance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub efficiency: MetricComparison,
    pub carbon_intensity: MetricComparison,
    pub availability: MetricComparison,
}

pub struct BenchmarkComparator;

impl BenchmarkComparator {
    /// Efficiency and availability compare as `current / benchmark`; carbon
    /// intensity, where lower is better, as `benchmark / current`.
    pub fn compare(snapshot: &PerformanceSnapshot, benchmark: &Benchmark) -> BenchmarkComparison {
        let ratio = |num: f64, den: f64| (den != 0.0).then(|| num / den * 100.0);
        BenchmarkComparison {
            efficiency: MetricComparison {
                current: snapshot.avg_efficiency,
                benchmark: benchmark.efficiency,
                performance: ratio(snapshot.avg_efficiency, benchmark.efficiency),
            },
            carbon_intensity: MetricComparison {
                current: snapshot.avg_carbon_intensity,
                benchmark: benchmark.carbon_intensity,
                performance: ratio(benchmark.carbon_intensity, snapshot.avg_carbon_intensity),
            },
            availability: MetricComparison {
                current: snapshot.availability,
                benchmark: benchmark.availability,
                performance: ratio(snapshot.availability, benchmark.availability),
            },
        }
    }

    /// Efficiency first, then carbon intensity, for each metric performing
    /// below `alert_percent` of its benchmark.
    pub fn recommendations(comparison: &BenchmarkComparison, alert_percent: f64) -> Vec<Recommendation> {
        let below = |m: &MetricComparison| m.performance.is_some_and(|p| p < alert_percent);
        let mut out = Vec::new();

        if below(&comparison.efficiency) {
            out.push(Recommendation {
                kind: RecommendationKind::Efficiency,
                priority: Priority::High,
                title: "Improve Thermal Efficiency".to_string(),
                description: "Current efficiency is below industry benchmark".to_string(),
                potential_savings: None,
                action: "Implement efficiency optimization measures".to_string(),
                confidence: None,
            });
        }

        if below(&comparison.carbon_intensity) {
            out.push(Recommendation {
                kind: RecommendationKind::Emissions,
                priority: Priority::High,
                title: "Reduce Carbon Intensity".to_string(),
                description: "Carbon intensity exceeds industry benchmark".to_string(),
                potential_savings: None,
                action: "Implement emission reduction strategies".to_string(),
                confidence: None,
            });
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(eff: f64, ci: f64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            avg_efficiency: eff,
            avg_carbon_intensity: ci,
            total_co2: 0.0,
            total_power: 0.0,
            availability: 95.0,
            count: 1,
        }
    }

    #[test]
    fn test_unlisted_types_use_coal() {
        let coal = Benchmark::for_plant_type(PlantType::Coal);
        assert_eq!(Benchmark::for_plant_type(PlantType::Biomass), coal);
        assert_eq!(Benchmark::for_plant_type(PlantType::Unknown), coal);
        assert_eq!(Benchmark::for_plant_type(PlantType::NaturalGas).carbon_intensity, 400.0);
    }

    #[test]
    fn test_compare_ratios() {
        let c = BenchmarkComparator::compare(
            &snapshot(25.0, 500.0),
            &Benchmark::for_plant_type(PlantType::NaturalGas),
        );
        assert_eq!(c.efficiency.performance, Some(50.0));
        assert_eq!(c.carbon_intensity.performance, Some(80.0));
        assert!((c.availability.performance.unwrap() - 95.0 / 90.0 * 100.0).abs() < 1e-9);

        let recs = BenchmarkComparator::recommendations(&c, 90.0);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].kind, RecommendationKind::Efficiency);
        assert_eq!(recs[1].kind, RecommendationKind::Emissions);
    }

    #[test]
    fn test_zero_intensity_is_undefined_not_alerting() {
        let c = BenchmarkComparator::compare(&snapshot(40.0, 0.0), &Benchmark::for_plant_type(PlantType::Coal));
        assert_eq!(c.carbon_intensity.performance, None);
        assert!(BenchmarkComparator::recommendations(&c, 90.0).is_empty());
    }
}
