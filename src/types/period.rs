//! Reporting windows

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Named look-back window. Unrecognised names fall back to 30 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PeriodWindow {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl PeriodWindow {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("7d") => PeriodWindow::Week,
            Some("90d") => PeriodWindow::Quarter,
            Some("1y") => PeriodWindow::Year,
            _ => PeriodWindow::Month,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            PeriodWindow::Week => 7,
            PeriodWindow::Month => 30,
            PeriodWindow::Quarter => 90,
            PeriodWindow::Year => 365,
        }
    }

    /// Closed interval ending at `now`.
    pub fn resolve(self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            start: now - Duration::days(self.days()),
            end: now,
        }
    }
}

/// Closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Whole days covered, rounded up.
    pub fn days(&self) -> i64 {
        let millis = (self.end - self.start).num_milliseconds().max(0);
        let day = Duration::days(1).num_milliseconds();
        (millis + day - 1) / day
    }

    pub fn summary(&self) -> PeriodSummary {
        PeriodSummary {
            start: self.start,
            end: self.end,
            days: self.days(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_with_fallback() {
        assert_eq!(PeriodWindow::parse(Some("7d")), PeriodWindow::Week);
        assert_eq!(PeriodWindow::parse(Some("1y")), PeriodWindow::Year);
        assert_eq!(PeriodWindow::parse(Some("2w")), PeriodWindow::Month);
        assert_eq!(PeriodWindow::parse(None), PeriodWindow::Month);
    }

    #[test]
    fn test_resolve_and_days() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let window = PeriodWindow::Quarter.resolve(now);
        assert_eq!(window.days(), 90);
        assert!(window.contains(window.start));
        assert!(window.contains(now));
        assert!(!window.contains(now + Duration::seconds(1)));
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let window = TimeWindow {
            start,
            end: start + Duration::hours(25),
        };
        assert_eq!(window.days(), 2);
    }
}
