use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Analysis window keywords accepted by the analyze endpoint.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum Timeframe {
    #[serde(rename = "7days")]
    Days7,
    #[serde(rename = "30days")]
    Days30,
    #[serde(rename = "90days")]
    Days90,
    #[serde(rename = "semester")]
    Semester,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Days30
    }
}

/// Inclusive date window. `start` and `end` both belong to the window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Timeframe {
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Days7 => "7days",
            Timeframe::Days30 => "30days",
            Timeframe::Days90 => "90days",
            Timeframe::Semester => "semester",
        }
    }

    /// Window length in days. A semester is treated as a fixed 183 days.
    pub fn days(self) -> i64 {
        match self {
            Timeframe::Days7 => 7,
            Timeframe::Days30 => 30,
            Timeframe::Days90 => 90,
            Timeframe::Semester => 183,
        }
    }

    /// Window of `days()` calendar days ending at `end`, both edges inclusive.
    pub fn range_ending(self, end: NaiveDate) -> DateRange {
        DateRange {
            start: end - Duration::days(self.days() - 1),
            end,
        }
    }
}

impl DateRange {
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The equal-length window immediately before this one. The previous
    /// window ends the day before `start`, so the two never share a date.
    pub fn previous(&self) -> DateRange {
        let len = self.len_days();
        let end = self.start - Duration::days(1);
        DateRange {
            start: end - Duration::days(len - 1),
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn seven_day_window_is_seven_days_inclusive() {
        let r = Timeframe::Days7.range_ending(d("2026-08-29"));
        assert_eq!(r.start, d("2026-08-23"));
        assert_eq!(r.end, d("2026-08-29"));
        assert_eq!(r.len_days(), 7);
    }

    #[test]
    fn window_lengths() {
        for (tf, len) in [
            (Timeframe::Days7, 7),
            (Timeframe::Days30, 30),
            (Timeframe::Days90, 90),
            (Timeframe::Semester, 183),
        ] {
            assert_eq!(tf.range_ending(d("2026-08-29")).len_days(), len);
        }
    }

    #[test]
    fn previous_window_is_adjacent_and_equal_length() {
        let r = Timeframe::Days30.range_ending(d("2026-08-29"));
        let prev = r.previous();
        assert_eq!(prev.len_days(), r.len_days());
        // previous window ends exactly one day before the current one starts
        assert_eq!(prev.end + Duration::days(1), r.start);
    }

    #[test]
    fn windows_never_overlap() {
        let r = Timeframe::Days7.range_ending(d("2026-01-03"));
        let prev = r.previous();
        assert!(prev.end < r.start);
    }

    #[test]
    fn timeframe_deserializes_from_keyword() {
        let tf: Timeframe = serde_json::from_str("\"7days\"").unwrap();
        assert_eq!(tf, Timeframe::Days7);
        assert!(serde_json::from_str::<Timeframe>("\"yesterday\"").is_err());
    }
}
