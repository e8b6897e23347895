use crate::attendance::scope::{AttendanceFilter, Caller, fetch_scoped};
use crate::attendance::stats::AttendanceSummary;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::AttendanceRecord;
use crate::model::class::Class;
use crate::model::status::AttendanceStatus;
use crate::utils::notify;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub records: Vec<AttendanceRecord>,
    pub stats: AttendanceSummary,
}

#[derive(Serialize, ToSchema)]
pub struct TodayClassResponse {
    pub class: Class,
    pub records: Vec<AttendanceRecord>,
    pub stats: AttendanceSummary,
}

#[derive(Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: Uuid,
    #[schema(value_type = String, format = "uuid")]
    pub class_id: Uuid,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    /// Defaults to today when omitted
    #[schema(example = "2026-08-29", value_type = String, format = "date", nullable = true)]
    pub date: Option<NaiveDate>,
    #[schema(example = "arrived after first bell", nullable = true)]
    pub notes: Option<String>,
}

/// Upsert row resolved from a marking request. Kept separate from the
/// payload so the defaulting rules stay testable.
pub struct ResolvedMark {
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<NaiveTime>,
    pub marked_by: Uuid,
    pub notes: Option<String>,
}

impl ResolvedMark {
    pub fn from_payload(
        payload: &MarkAttendance,
        marked_by: Uuid,
        today: NaiveDate,
        now: NaiveTime,
    ) -> Self {
        ResolvedMark {
            student_id: payload.student_id,
            class_id: payload.class_id,
            date: payload.date.unwrap_or(today),
            status: payload.status,
            check_in_time: payload.status.has_check_in().then_some(now),
            marked_by,
            notes: payload.notes.clone(),
        }
    }
}

/// Role-scoped attendance listing with derived summary
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Scoped records and summary", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Data service unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn fetch_attendance(
    auth: AuthUser,
    pool: web::Data<PgPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    let profile_id = auth.require_profile()?;

    let caller = Caller {
        profile_id,
        role: auth.role,
    };

    tracing::debug!(user_id = %auth.user_id, role = ?auth.role, "Fetching scoped attendance");

    let records = fetch_scoped(pool.get_ref(), &caller, &query.into_inner()).await?;
    let stats = AttendanceSummary::from_records(&records);

    Ok(HttpResponse::Ok().json(AttendanceListResponse { records, stats }))
}

/// Teacher-only attendance marking (upsert on student+class+date)
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body(
        content = MarkAttendance,
        description = "Marking payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Attendance marked", body = Object, example = json!({
            "message": "Attendance marked",
            "status": "absent"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown class or student"),
        (status = 503, description = "Data service unavailable, nothing recorded")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    pool: web::Data<PgPool>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    let teacher_id = auth.require_teacher()?;

    tracing::info!(
        teacher = %auth.username,
        student_id = %payload.student_id,
        status = %payload.status,
        "Marking attendance"
    );

    let now = Utc::now();
    let mark = ResolvedMark::from_payload(&payload, teacher_id, now.date_naive(), now.time());

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
            (student_id, class_id, date, status, check_in_time, marked_by, notes, location_verified)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
        ON CONFLICT (student_id, class_id, date)
        DO UPDATE SET
            status = EXCLUDED.status,
            check_in_time = EXCLUDED.check_in_time,
            marked_by = EXCLUDED.marked_by,
            notes = EXCLUDED.notes,
            location_verified = EXCLUDED.location_verified
        "#,
    )
    .bind(mark.student_id)
    .bind(mark.class_id)
    .bind(mark.date)
    .bind(mark.status.as_ref())
    .bind(mark.check_in_time)
    .bind(mark.marked_by)
    .bind(&mark.notes)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = result {
        if let sqlx::Error::Database(db_err) = &e {
            // foreign_key_violation
            if db_err.code().as_deref() == Some("23503") {
                return Err(ApiError::not_found("Unknown class or student").into());
            }
        }
        tracing::error!(error = %e, student_id = %mark.student_id, "Attendance write failed");
        return Err(ApiError::DataUnavailable.into());
    }

    // Absence fan-out to linked parents, fire-and-forget: a notification
    // failure never rolls back or fails the marking response.
    if mark.status.triggers_absence_notice() {
        let pool = pool.get_ref().clone();
        let student_id = mark.student_id;
        actix_web::rt::spawn(async move {
            if let Err(e) = notify::notify_absence(&pool, student_id).await {
                tracing::warn!(error = %e, %student_id, "Absence notification failed");
            }
        });
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance marked",
        "status": mark.status
    })))
}

/// Today's marks for one of the caller's classes
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today/{class_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class to list today's marks for")
    ),
    responses(
        (status = 200, description = "Class details and today's records", body = TodayClassResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found or not taught by caller")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today_for_class(
    auth: AuthUser,
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    let teacher_id = auth.require_teacher()?;
    let class_id = path.into_inner();

    let class = sqlx::query_as::<_, Class>(
        r#"
        SELECT id, name, grade, section, teacher_id
        FROM classes
        WHERE id = $1 AND teacher_id = $2
        "#,
    )
    .bind(class_id)
    .bind(teacher_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ApiError::from)?
    .ok_or_else(|| ApiError::not_found("Class not found"))?;

    let today = Utc::now().date_naive();
    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, student_id, class_id, date, status, check_in_time,
               location_verified, marked_by, notes, created_at
        FROM attendance
        WHERE class_id = $1 AND date = $2
        "#,
    )
    .bind(class_id)
    .bind(today)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    let stats = AttendanceSummary::from_records(&records);

    Ok(HttpResponse::Ok().json(TodayClassResponse {
        class,
        records,
        stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(status: AttendanceStatus, date: Option<NaiveDate>) -> MarkAttendance {
        MarkAttendance {
            student_id: Uuid::new_v4(),
            class_id: Uuid::new_v4(),
            status,
            date,
            notes: None,
        }
    }

    #[test]
    fn date_defaults_to_today() {
        let today: NaiveDate = "2026-08-29".parse().unwrap();
        let now: NaiveTime = "08:45:00".parse().unwrap();
        let mark = ResolvedMark::from_payload(
            &payload(AttendanceStatus::Present, None),
            Uuid::new_v4(),
            today,
            now,
        );
        assert_eq!(mark.date, today);
    }

    #[test]
    fn explicit_date_wins() {
        let today: NaiveDate = "2026-08-29".parse().unwrap();
        let asked: NaiveDate = "2026-08-28".parse().unwrap();
        let now: NaiveTime = "08:45:00".parse().unwrap();
        let mark = ResolvedMark::from_payload(
            &payload(AttendanceStatus::Late, Some(asked)),
            Uuid::new_v4(),
            today,
            now,
        );
        assert_eq!(mark.date, asked);
    }

    #[test]
    fn check_in_stamped_only_for_present_and_late() {
        let today: NaiveDate = "2026-08-29".parse().unwrap();
        let now: NaiveTime = "08:45:00".parse().unwrap();

        for (status, expect) in [
            (AttendanceStatus::Present, Some(now)),
            (AttendanceStatus::Late, Some(now)),
            (AttendanceStatus::Absent, None),
            (AttendanceStatus::Excused, None),
        ] {
            let mark =
                ResolvedMark::from_payload(&payload(status, None), Uuid::new_v4(), today, now);
            assert_eq!(mark.check_in_time, expect, "status {:?}", status);
        }
    }
}
