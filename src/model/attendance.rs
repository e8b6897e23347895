use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One attendance row, unique per (student_id, class_id, date).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,

    #[schema(value_type = String, format = "uuid")]
    pub student_id: Uuid,

    #[schema(value_type = String, format = "uuid")]
    pub class_id: Uuid,

    #[schema(example = "2026-08-29", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "present")]
    pub status: String,

    #[schema(example = "08:45:00", value_type = String, nullable = true)]
    pub check_in_time: Option<NaiveTime>,

    pub location_verified: bool,

    #[schema(value_type = String, format = "uuid", nullable = true)]
    pub marked_by: Option<Uuid>,

    #[schema(example = "arrived after first bell", nullable = true)]
    pub notes: Option<String>,

    #[schema(example = "2026-08-29T08:45:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
