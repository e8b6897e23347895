use crate::attendance::stats::AttendanceSummary;
use crate::attendance::{stats, timeframe::Timeframe};
use crate::model::role::Role;

/// Shown instead of insights when the completion service fails.
pub const ANALYZER_FALLBACK: &str =
    "I'm sorry, I'm having trouble analyzing the data right now. Please try again later.";

/// Shown instead of a chat reply when the completion service fails.
pub const CHAT_FALLBACK: &str = "I'm sorry, I'm having trouble processing your request right now. \
     Please try again later or contact support if the issue persists.";

/// Instruction preamble for the analysis proxy.
pub fn analyst_preamble(role: Role) -> String {
    format!(
        "You are an educational data analyst providing insights for a {}. \
         Analyze the provided data and give meaningful, actionable insights in a friendly, \
         encouraging tone. Focus on trends, improvements, areas of concern, and practical \
         recommendations. Keep the response concise but informative.",
        role
    )
}

/// Instruction preamble for the chatbot, with a role-specific section when
/// the caller identified themselves.
pub fn chat_preamble(role: Option<Role>) -> String {
    let mut preamble = String::from(
        "You are a helpful AI assistant for a school attendance and curriculum portal. \
         Be helpful, friendly, and provide relevant information about: \
         attendance tracking and statistics, curriculum and assignments, \
         school activities and schedules, academic progress and performance, \
         and general school information.",
    );

    let section = match role {
        Some(Role::Student) => {
            "\nFor students, you can help with: checking attendance records, \
             viewing assignments and deadlines, understanding academic progress, \
             school schedule queries, and general study tips."
        }
        Some(Role::Teacher) => {
            "\nFor teachers, you can help with: managing class attendance, \
             organizing curriculum, tracking student progress, creating assignments, \
             and generating reports."
        }
        Some(Role::Parent) => {
            "\nFor parents, you can help with: monitoring your child's attendance, \
             viewing academic progress, understanding school activities, \
             communication with teachers, and school event information."
        }
        Some(Role::Admin) => {
            "\nFor administrators, you can help with: institution-wide analytics, \
             managing users and classes, system administration, report generation, \
             and policy questions."
        }
        None => "",
    };

    preamble.push_str(section);
    preamble
}

/// Fixed-format textual attendance report forwarded to the completion
/// service. An empty window still produces an explicit no-data summary, so
/// the completion call is made either way.
pub fn render_attendance_report(
    timeframe: Timeframe,
    current: &AttendanceSummary,
    previous: Option<&AttendanceSummary>,
) -> String {
    if current.is_empty() {
        return format!(
            "Attendance Analysis ({}): no attendance records were found in this period.",
            timeframe.label()
        );
    }

    let mut report = format!(
        "Attendance Analysis ({}):\n\
         - Total Days: {}\n\
         - Present: {} days ({}%)\n\
         - Absent: {} days ({}%)\n\
         - Late: {} days ({}%)\n\
         - Overall Attendance Rate: {}%",
        timeframe.label(),
        current.total_days,
        current.present_days,
        current.attendance_percentage,
        current.absent_days,
        stats::percentage(current.absent_days, current.total_days),
        current.late_days,
        stats::percentage(current.late_days, current.total_days),
        current.attendance_percentage,
    );

    if let Some(prev) = previous.filter(|p| !p.is_empty()) {
        let change =
            current.attendance_percentage as i64 - prev.attendance_percentage as i64;
        report.push_str(&format!(
            "\n\nComparison with previous period:\n\
             - Previous attendance: {}%\n\
             - Change: {}{}%",
            prev.attendance_percentage,
            if change > 0 { "+" } else { "" },
            change
        ));
    }

    report
}

/// Report body for analysis types with no structured data source yet.
pub fn render_unscoped_report(analysis_type: &str) -> String {
    format!(
        "No structured {} data is collected for this portal yet. \
         Explain briefly what kind of {} insights will become available.",
        analysis_type, analysis_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(present: u32, absent: u32, late: u32) -> AttendanceSummary {
        let total = present + absent + late;
        AttendanceSummary {
            total_days: total,
            present_days: present,
            absent_days: absent,
            late_days: late,
            excused_days: 0,
            attendance_percentage: stats::percentage(present, total),
        }
    }

    #[test]
    fn empty_window_renders_explicit_no_data_summary() {
        let s = summary(0, 0, 0);
        let report = render_attendance_report(Timeframe::Days7, &s, None);
        assert!(report.contains("no attendance records"));
        assert!(report.contains("7days"));
    }

    #[test]
    fn report_contains_all_counts() {
        let s = summary(17, 2, 1);
        let report = render_attendance_report(Timeframe::Days30, &s, None);
        assert!(report.contains("Total Days: 20"));
        assert!(report.contains("Present: 17 days (85%)"));
        assert!(report.contains("Absent: 2 days (10%)"));
        assert!(report.contains("Late: 1 days (5%)"));
        assert!(!report.contains("previous period"));
    }

    #[test]
    fn comparison_block_shows_signed_change() {
        let current = summary(9, 1, 0); // 90%
        let previous = summary(8, 2, 0); // 80%
        let report = render_attendance_report(Timeframe::Days30, &current, Some(&previous));
        assert!(report.contains("Previous attendance: 80%"));
        assert!(report.contains("Change: +10%"));

        let report = render_attendance_report(Timeframe::Days30, &previous, Some(&current));
        assert!(report.contains("Change: -10%"));
    }

    #[test]
    fn empty_previous_period_is_omitted() {
        let current = summary(9, 1, 0);
        let previous = summary(0, 0, 0);
        let report = render_attendance_report(Timeframe::Days30, &current, Some(&previous));
        assert!(!report.contains("previous period"));
    }

    #[test]
    fn preambles_name_the_role() {
        assert!(analyst_preamble(Role::Parent).contains("for a parent"));
        assert!(chat_preamble(Some(Role::Teacher)).contains("For teachers"));
        assert!(chat_preamble(None).contains("school attendance"));
    }
}
