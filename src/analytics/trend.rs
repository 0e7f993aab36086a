//! Trend direction from a half-split mean comparison

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::types::{EmissionRecord, Fallback, TrendDirection, TrendSummary};

/// Confidence bounds for a computed trend (%).
const MIN_CONFIDENCE: f64 = 60.0;
const MAX_CONFIDENCE: f64 = 95.0;

/// Per-record value a trend or forecast is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesMetric {
    #[default]
    Co2,
    Ch4,
    N2o,
    Power,
    CarbonIntensity,
    Efficiency,
}

impl SeriesMetric {
    /// Value of this metric for a record; undefined values read as zero.
    pub fn value(self, record: &EmissionRecord) -> f64 {
        match self {
            SeriesMetric::Co2 => record.co2(),
            SeriesMetric::Ch4 => record.emissions.ch4.value,
            SeriesMetric::N2o => record.emissions.n2o.value,
            SeriesMetric::Power => record.power(),
            SeriesMetric::CarbonIntensity => record.carbon_intensity.unwrap_or(0.0),
            SeriesMetric::Efficiency => record.efficiency.overall.unwrap_or(0.0),
        }
    }

    pub fn values(self, records: &[EmissionRecord]) -> Vec<f64> {
        records.iter().map(|r| self.value(r)).collect()
    }
}

impl std::str::FromStr for SeriesMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "co2" => Ok(SeriesMetric::Co2),
            "ch4" => Ok(SeriesMetric::Ch4),
            "n2o" => Ok(SeriesMetric::N2o),
            "power" => Ok(SeriesMetric::Power),
            "carbonIntensity" | "carbon_intensity" => Ok(SeriesMetric::CarbonIntensity),
            "efficiency" => Ok(SeriesMetric::Efficiency),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

pub struct TrendEstimator;

impl TrendEstimator {
    /// Compare the mean of the first ⌊n/2⌋ values with the mean of the rest.
    ///
    /// Fewer than two values give a stable trend with zero confidence. A
    /// zero first-half mean gives a zero change flagged
    /// `Fallback::DivisionUndefined`.
    pub fn estimate(values: &[f64], threshold_percent: f64) -> TrendSummary {
        if values.len() < 2 {
            return TrendSummary {
                direction: TrendDirection::Stable,
                change: 0.0,
                confidence: 0.0,
                fallback: Some(Fallback::InsufficientData),
            };
        }

        let (first, second) = values.split_at(values.len() / 2);
        let first_mean = first.mean();
        let second_mean = second.mean();

        let (change, fallback) = if first_mean == 0.0 {
            (0.0, Some(Fallback::DivisionUndefined))
        } else {
            ((second_mean - first_mean) / first_mean * 100.0, None)
        };

        let direction = if change > threshold_percent {
            TrendDirection::Increasing
        } else if change < -threshold_percent {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        TrendSummary {
            direction,
            change: (change * 100.0).round() / 100.0,
            confidence: (100.0 - change.abs()).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
            fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 5.0;

    #[test]
    fn test_increasing_trend() {
        let trend = TrendEstimator::estimate(&[100.0, 100.0, 110.0, 110.0], THRESHOLD);
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert_eq!(trend.change, 10.0);
        assert_eq!(trend.confidence, 90.0);
        assert!(trend.fallback.is_none());
    }

    #[test]
    fn test_odd_length_puts_extra_value_in_second_half() {
        // first = [100], second = [90, 90]
        let trend = TrendEstimator::estimate(&[100.0, 90.0, 90.0], THRESHOLD);
        assert_eq!(trend.direction, TrendDirection::Decreasing);
        assert_eq!(trend.change, -10.0);
    }

    #[test]
    fn test_within_threshold_is_stable() {
        let trend = TrendEstimator::estimate(&[100.0, 104.0], THRESHOLD);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.confidence, 95.0);
    }

    #[test]
    fn test_confidence_floor() {
        let trend = TrendEstimator::estimate(&[10.0, 30.0], THRESHOLD);
        assert_eq!(trend.change, 200.0);
        assert_eq!(trend.confidence, 60.0);
    }

    #[test]
    fn test_change_rounded_to_two_decimals() {
        let trend = TrendEstimator::estimate(&[3.0, 3.1], THRESHOLD);
        assert_eq!(trend.change, 3.33);
    }

    #[test]
    fn test_insufficient_data() {
        let trend = TrendEstimator::estimate(&[42.0], THRESHOLD);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.confidence, 0.0);
        assert_eq!(trend.fallback, Some(Fallback::InsufficientData));
    }

    #[test]
    fn test_zero_first_half_is_flagged() {
        let trend = TrendEstimator::estimate(&[0.0, 0.0, 5.0, 5.0], THRESHOLD);
        assert_eq!(trend.change, 0.0);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.fallback, Some(Fallback::DivisionUndefined));
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("co2".parse::<SeriesMetric>(), Ok(SeriesMetric::Co2));
        assert_eq!(
            "carbonIntensity".parse::<SeriesMetric>(),
            Ok(SeriesMetric::CarbonIntensity)
        );
        assert!("so2".parse::<SeriesMetric>().is_err());
    }
}
