use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Attendance status as stored in the `attendance.status` column.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Present and late students have a check-in moment; absent/excused do not.
    pub fn has_check_in(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }

    /// Only an unexcused absence notifies the linked parents.
    pub fn triggers_absence_notice(self) -> bool {
        matches!(self, AttendanceStatus::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_match_column_values() {
        assert_eq!(AttendanceStatus::Present.as_ref(), "present");
        assert_eq!(AttendanceStatus::Absent.as_ref(), "absent");
        assert_eq!(AttendanceStatus::Late.as_ref(), "late");
        assert_eq!(AttendanceStatus::Excused.as_ref(), "excused");
    }

    #[test]
    fn only_absent_notifies_parents() {
        assert!(AttendanceStatus::Absent.triggers_absence_notice());
        assert!(!AttendanceStatus::Present.triggers_absence_notice());
        assert!(!AttendanceStatus::Late.triggers_absence_notice());
        assert!(!AttendanceStatus::Excused.triggers_absence_notice());
    }

    #[test]
    fn only_present_and_late_check_in() {
        assert!(AttendanceStatus::Present.has_check_in());
        assert!(AttendanceStatus::Late.has_check_in());
        assert!(!AttendanceStatus::Absent.has_check_in());
        assert!(!AttendanceStatus::Excused.has_check_in());
    }
}
