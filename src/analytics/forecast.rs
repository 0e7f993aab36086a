//! Linear-regression forecast over timestamped values

use chrono::{DateTime, Duration, Utc};
use statrs::statistics::Statistics;

use crate::types::{Fallback, ForecastPoint, ForecastReport};

pub struct ForecastEngine;

impl ForecastEngine {
    /// Fit `value = slope * t + intercept` by ordinary least squares, with `t`
    /// in epoch milliseconds, and project one point per day for `days` days
    /// after the latest sample. Projections are clamped to zero.
    ///
    /// Fewer than `min_points` samples, or all samples at one instant, give an
    /// empty report carrying the matching fallback marker.
    #[allow(clippy::cast_precision_loss)]
    pub fn forecast(
        series: &[(DateTime<Utc>, f64)],
        days: u32,
        min_points: usize,
    ) -> ForecastReport {
        if series.len() < min_points.max(2) {
            return ForecastReport {
                points: Vec::new(),
                fallback: Some(Fallback::InsufficientData),
            };
        }

        let xs: Vec<f64> = series
            .iter()
            .map(|(ts, _)| ts.timestamp_millis() as f64)
            .collect();
        let ys: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

        // Centred form: same fit as the raw normal equations, without
        // squaring 1e12-scale timestamps.
        let x_mean = xs.iter().mean();
        let y_mean = ys.iter().mean();
        let (sxy, sxx) = xs
            .iter()
            .zip(&ys)
            .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
                let dx = x - x_mean;
                (sxy + dx * (y - y_mean), sxx + dx * dx)
            });

        if sxx == 0.0 {
            return ForecastReport {
                points: Vec::new(),
                fallback: Some(Fallback::DivisionUndefined),
            };
        }
        let slope = sxy / sxx;

        let Some(last) = series.iter().map(|(ts, _)| *ts).max() else {
            return ForecastReport::default();
        };

        let points = (1..=i64::from(days))
            .map(|i| {
                let date = last + Duration::days(i);
                let x = date.timestamp_millis() as f64;
                ForecastPoint {
                    date,
                    value: slope.mul_add(x - x_mean, y_mean).max(0.0),
                }
            })
            .collect();

        ForecastReport {
            points,
            fallback: None,
        }
    }
}
