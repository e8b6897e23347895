use crate::ai::client::CompletionClient;
use crate::ai::prompts;
use crate::attendance::scope::{AttendanceFilter, Caller, fetch_scoped};
use crate::attendance::stats::{AttendanceSummary, WeekBucket, weekly_series};
use crate::attendance::timeframe::Timeframe;
use crate::error::ApiError;
use crate::model::{profile::Profile, role::Role};
use actix_web::{HttpResponse, Responder, ResponseError, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Attendance,
    Performance,
    Engagement,
    Institutional,
}

impl Default for AnalysisType {
    fn default() -> Self {
        AnalysisType::Attendance
    }
}

impl AnalysisType {
    pub fn label(self) -> &'static str {
        match self {
            AnalysisType::Attendance => "attendance",
            AnalysisType::Performance => "performance",
            AnalysisType::Engagement => "engagement",
            AnalysisType::Institutional => "institutional",
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[schema(value_type = String, format = "uuid", nullable = true)]
    pub user_id: Option<Uuid>,
    #[schema(example = "student", nullable = true)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub timeframe: Timeframe,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub insights: String,
    pub chart_data: Vec<WeekBucket>,
    pub raw_data: String,
    pub timeframe: String,
    pub analysis_type: String,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
}

/// Analysis proxy: aggregates role-scoped attendance for the requested
/// window, renders a fixed-format summary, and forwards it to the
/// completion service once. No retry; a failed completion call degrades to
/// the fixed fallback string.
#[utoipa::path(
    post,
    path = "/functions/analyze",
    request_body(content = AnalyzeRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Insights and chart-ready series", body = AnalyzeResponse),
        (status = 400, description = "Missing caller identity or role"),
        (status = 404, description = "Profile not found"),
        (status = 502, description = "Completion service failed", body = Object, example = json!({
            "error": "Completion service failed",
            "insights": "I'm sorry, I'm having trouble analyzing the data right now. Please try again later."
        })),
        (status = 503, description = "Data service unavailable")
    ),
    tag = "Functions"
)]
pub async fn analyze(
    pool: web::Data<PgPool>,
    completion: web::Data<CompletionClient>,
    payload: web::Json<AnalyzeRequest>,
) -> actix_web::Result<impl Responder> {
    // validation happens before any external call
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::bad_request("User ID and role are required"))?;
    let role_name = payload
        .user_role
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("User ID and role are required"))?;
    let role = Role::from_name(role_name)
        .ok_or_else(|| ApiError::bad_request("Invalid role. Allowed: student, teacher, parent, admin"))?;

    let profile = sqlx::query_as::<_, Profile>(
        "SELECT id, user_id, first_name, last_name, role, email, phone \
         FROM profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ApiError::from)?
    .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    let caller = Caller {
        profile_id: profile.id,
        role,
    };

    let timeframe = payload.timeframe;
    let range = timeframe.range_ending(Utc::now().date_naive());

    let (raw_data, chart_data) = match payload.analysis_type {
        AnalysisType::Attendance => {
            let filter = AttendanceFilter {
                from: Some(range.start),
                to: Some(range.end),
                ..Default::default()
            };
            let records = fetch_scoped(pool.get_ref(), &caller, &filter).await?;
            let summary = AttendanceSummary::from_records(&records);
            let chart = weekly_series(&records);

            let prev_range = range.previous();
            let prev_filter = AttendanceFilter {
                from: Some(prev_range.start),
                to: Some(prev_range.end),
                ..Default::default()
            };
            let prev_records = fetch_scoped(pool.get_ref(), &caller, &prev_filter).await?;
            let previous = AttendanceSummary::from_records(&prev_records);

            let report = prompts::render_attendance_report(timeframe, &summary, Some(&previous));
            (report, chart)
        }
        other => (prompts::render_unscoped_report(other.label()), Vec::new()),
    };

    let insights = match completion
        .complete(
            &prompts::analyst_preamble(role),
            &format!(
                "Please analyze this educational data and provide insights:\n\n{}",
                raw_data
            ),
            500,
        )
        .await
    {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Analysis completion call failed");
            let err = ApiError::Upstream;
            return Ok(HttpResponse::build(err.status_code()).json(serde_json::json!({
                "error": err.to_string(),
                "insights": prompts::ANALYZER_FALLBACK
            })));
        }
    };

    Ok(HttpResponse::Ok().json(AnalyzeResponse {
        insights,
        chart_data,
        raw_data,
        timeframe: timeframe.label().to_string(),
        analysis_type: payload.analysis_type.label().to_string(),
        timestamp: Utc::now(),
    }))
}
