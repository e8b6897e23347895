use crate::api::analysis::{AnalysisType, AnalyzeRequest, AnalyzeResponse};
use crate::api::attendance::{AttendanceListResponse, MarkAttendance, TodayClassResponse};
use crate::api::chat::{ChatReply, ChatRequest};
use crate::attendance::stats::{AttendanceSummary, WeekBucket};
use crate::attendance::timeframe::Timeframe;
use crate::model::attendance::AttendanceRecord;
use crate::model::class::Class;
use crate::model::profile::Profile;
use crate::model::role::Role;
use crate::model::status::AttendanceStatus;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SAMS API",
        version = "1.0.0",
        description = r#"
## School Attendance Management System

This API powers a school attendance/curriculum portal with role-based data
access for students, teachers, parents and administrators.

### Key Features
- **Attendance**
  - Role-scoped record listing with derived summary statistics
  - Teacher-only marking (upsert on student + class + date)
  - Today's marks per class
- **Analysis**
  - Attendance aggregation over a timeframe, forwarded to a completion
    service for generated insights, with chart-ready weekly series
- **Chatbot**
  - Context-aware assistant proxying the completion service

### Security
Attendance endpoints are protected with **JWT Bearer authentication**.
The function endpoints mirror the original public edge functions and answer
CORS preflight permissively.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::fetch_attendance,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::today_for_class,

        crate::api::analysis::analyze,
        crate::api::chat::chat,
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceSummary,
            AttendanceListResponse,
            AttendanceStatus,
            MarkAttendance,
            AnalysisType,
            AnalyzeRequest,
            AnalyzeResponse,
            ChatRequest,
            ChatReply,
            Class,
            Profile,
            Role,
            Timeframe,
            TodayClassResponse,
            WeekBucket
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Functions", description = "Analysis and chatbot proxy APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
