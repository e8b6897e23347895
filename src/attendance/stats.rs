use crate::model::attendance::AttendanceRecord;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Derived aggregate over a scoped record set. Never persisted; recomputed
/// from the underlying rows on every fetch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "total_days": 20,
    "present_days": 17,
    "absent_days": 2,
    "late_days": 1,
    "excused_days": 0,
    "attendance_percentage": 85
}))]
pub struct AttendanceSummary {
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub late_days: u32,
    pub excused_days: u32,
    pub attendance_percentage: u32,
}

/// Chart-ready bucket for one ISO week inside the analysis window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeekBucket {
    #[schema(example = "Week 35")]
    pub week: String,
    /// present / total for this week, rounded
    pub attendance: u32,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
}

/// round(present / total * 100), with an empty set defined as 0.
pub fn percentage(present: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((present as f64 / total as f64) * 100.0).round() as u32
}

impl AttendanceSummary {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let total = records.len() as u32;
        let mut present = 0u32;
        let mut absent = 0u32;
        let mut late = 0u32;
        let mut excused = 0u32;

        for record in records {
            match record.status.as_str() {
                "present" => present += 1,
                "absent" => absent += 1,
                "late" => late += 1,
                _ => excused += 1,
            }
        }

        AttendanceSummary {
            total_days: total,
            present_days: present,
            absent_days: absent,
            late_days: late,
            excused_days: excused,
            attendance_percentage: percentage(present, total),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_days == 0
    }
}

#[derive(Default)]
struct WeekCounts {
    present: u32,
    absent: u32,
    late: u32,
    total: u32,
}

/// Buckets records by ISO week, ordered by (iso year, week number).
pub fn weekly_series(records: &[AttendanceRecord]) -> Vec<WeekBucket> {
    let mut weeks: BTreeMap<(i32, u32), WeekCounts> = BTreeMap::new();

    for record in records {
        let iso = record.date.iso_week();
        let counts = weeks.entry((iso.year(), iso.week())).or_default();
        match record.status.as_str() {
            "present" => counts.present += 1,
            "absent" => counts.absent += 1,
            "late" => counts.late += 1,
            _ => {}
        }
        counts.total += 1;
    }

    weeks
        .into_iter()
        .map(|((_, week), counts)| WeekBucket {
            week: format!("Week {}", week),
            attendance: percentage(counts.present, counts.total),
            present: counts.present,
            absent: counts.absent,
            late: counts.late,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record(date: &str, status: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            class_id: Uuid::new_v4(),
            date: date.parse::<NaiveDate>().unwrap(),
            status: status.to_string(),
            check_in_time: None,
            location_verified: false,
            marked_by: None,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn counts_sum_to_total() {
        let records = vec![
            record("2026-08-24", "present"),
            record("2026-08-25", "present"),
            record("2026-08-26", "absent"),
            record("2026-08-27", "late"),
            record("2026-08-28", "excused"),
        ];
        let s = AttendanceSummary::from_records(&records);
        assert_eq!(s.total_days, 5);
        assert_eq!(
            s.present_days + s.absent_days + s.late_days + s.excused_days,
            s.total_days
        );
        assert_eq!(s.attendance_percentage, 40);
    }

    #[test]
    fn empty_set_has_zero_percentage() {
        let s = AttendanceSummary::from_records(&[]);
        assert!(s.is_empty());
        assert_eq!(s.attendance_percentage, 0);
    }

    #[test]
    fn percentage_rounds() {
        // 2 of 3 present -> 66.67 -> 67
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn only_marked_records_count() {
        // class of 3, two marked present, one never marked: the unmarked
        // student simply does not appear in the set
        let records = vec![
            record("2026-08-28", "present"),
            record("2026-08-28", "present"),
        ];
        let s = AttendanceSummary::from_records(&records);
        assert_eq!(s.total_days, 2);
        assert_eq!(s.present_days, 2);
        assert_eq!(s.absent_days, 0);
        assert_eq!(s.attendance_percentage, 100);
    }

    #[test]
    fn weekly_buckets_follow_iso_weeks() {
        // 2026-08-24 is a Monday (ISO week 35); the next Monday starts week 36
        let records = vec![
            record("2026-08-24", "present"),
            record("2026-08-25", "absent"),
            record("2026-08-31", "present"),
            record("2026-09-01", "late"),
        ];
        let series = weekly_series(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].week, "Week 35");
        assert_eq!(series[0].present, 1);
        assert_eq!(series[0].absent, 1);
        assert_eq!(series[0].attendance, 50);
        assert_eq!(series[1].week, "Week 36");
        assert_eq!(series[1].late, 1);
    }

    #[test]
    fn weekly_buckets_order_across_year_boundary() {
        let records = vec![
            record("2026-01-05", "present"),
            record("2025-12-29", "present"),
        ];
        let series = weekly_series(&records);
        // ISO week 1 of 2026 sorts after week 53-ish of 2025
        assert_eq!(series.len(), 2);
        assert!(series[0].week != series[1].week);
    }

    #[test]
    fn empty_series_for_no_records() {
        assert!(weekly_series(&[]).is_empty());
    }
}
