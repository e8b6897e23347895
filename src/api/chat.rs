use crate::ai::client::CompletionClient;
use crate::ai::prompts;
use crate::error::ApiError;
use crate::model::notification::NotificationDigest;
use crate::model::{profile::Profile, role::Role};
use actix_web::{HttpResponse, Responder, ResponseError, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[schema(example = "How was my attendance this month?", nullable = true)]
    pub message: Option<String>,
    #[schema(value_type = String, format = "uuid", nullable = true)]
    pub user_id: Option<Uuid>,
    #[schema(example = "student", nullable = true)]
    pub user_role: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatReply {
    pub response: String,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
}

fn snippet(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

/// Best-effort role-scoped context: profile name, a student's most recent
/// marks, their latest notifications. Every lookup failure is swallowed;
/// the chat call proceeds with whatever was gathered.
async fn gather_context(pool: &PgPool, user_id: Uuid, role: Option<Role>) -> (Option<Uuid>, String) {
    let mut context = String::new();

    let profile = match sqlx::query_as::<_, Profile>(
        "SELECT id, user_id, first_name, last_name, role, email, phone \
         FROM profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, "Chat context: profile lookup failed");
            None
        }
    };

    let Some(profile) = profile else {
        return (None, context);
    };

    context.push_str(&format!(
        "User: {} ({})\n",
        profile.full_name(),
        profile.role
    ));

    if role == Some(Role::Student) {
        match sqlx::query_as::<_, (NaiveDate, String)>(
            "SELECT date, status FROM attendance \
             WHERE student_id = $1 ORDER BY date DESC LIMIT 5",
        )
        .bind(profile.id)
        .fetch_all(pool)
        .await
        {
            Ok(rows) if !rows.is_empty() => {
                let recent = rows
                    .iter()
                    .map(|(date, status)| format!("{}: {}", date, status))
                    .collect::<Vec<_>>()
                    .join(", ");
                context.push_str(&format!("Recent attendance: {}\n", recent));
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "Chat context: attendance lookup failed"),
        }
    }

    match sqlx::query_as::<_, NotificationDigest>(
        "SELECT title, message, created_at FROM notifications \
         WHERE recipient_id = $1 ORDER BY created_at DESC LIMIT 3",
    )
    .bind(profile.id)
    .fetch_all(pool)
    .await
    {
        Ok(rows) if !rows.is_empty() => {
            let titles = rows
                .iter()
                .map(|n| n.title.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            context.push_str(&format!("Recent notifications: {}\n", titles));
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(error = %e, "Chat context: notification lookup failed"),
    }

    (Some(profile.id), context)
}

/// Chat proxy: forwards a free-text message, optional role preamble, and
/// best-effort caller context to the completion service in one request.
#[utoipa::path(
    post,
    path = "/functions/chat",
    request_body(content = ChatRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Chatbot reply", body = ChatReply),
        (status = 400, description = "Missing message"),
        (status = 502, description = "Completion service failed", body = Object, example = json!({
            "error": "Completion service failed",
            "response": "I'm sorry, I'm having trouble processing your request right now. Please try again later or contact support if the issue persists."
        }))
    ),
    tag = "Functions"
)]
pub async fn chat(
    pool: web::Data<PgPool>,
    completion: web::Data<CompletionClient>,
    payload: web::Json<ChatRequest>,
) -> actix_web::Result<impl Responder> {
    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Message is required"))?
        .to_string();

    let role = match payload.user_role.as_deref() {
        Some(name) => Some(
            Role::from_name(name).ok_or_else(|| {
                ApiError::bad_request("Invalid role. Allowed: student, teacher, parent, admin")
            })?,
        ),
        None => None,
    };

    let mut system = prompts::chat_preamble(role);
    let mut recipient: Option<Uuid> = None;

    if let Some(user_id) = payload.user_id {
        let (profile_id, context) = gather_context(pool.get_ref(), user_id, role).await;
        recipient = profile_id;
        if !context.is_empty() {
            system.push_str(&format!("\n\nUser Context:\n{}", context));
        }
    }

    let response = match completion.complete(&system, &message, 1000).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Chat completion call failed");
            let err = ApiError::Upstream;
            return Ok(HttpResponse::build(err.status_code()).json(serde_json::json!({
                "error": err.to_string(),
                "response": prompts::CHAT_FALLBACK
            })));
        }
    };

    // Best-effort exchange log; a failure here never reaches the caller.
    if let Some(recipient_id) = recipient {
        let pool = pool.get_ref().clone();
        let log_line = format!(
            "Asked: \"{}\" | Response: \"{}\"",
            snippet(&message, 50),
            snippet(&response, 50)
        );
        actix_web::rt::spawn(async move {
            if let Err(e) = sqlx::query(
                r#"
                INSERT INTO notifications (recipient_id, title, message, type)
                VALUES ($1, 'Chatbot Interaction', $2, 'general')
                "#,
            )
            .bind(recipient_id)
            .bind(&log_line)
            .execute(&pool)
            .await
            {
                tracing::debug!(error = %e, "Failed to log chat exchange");
            }
        });
    }

    Ok(HttpResponse::Ok().json(ChatReply {
        response,
        timestamp: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_truncates_long_text() {
        assert_eq!(snippet("short", 50), "short");
        let long = "x".repeat(60);
        let s = snippet(&long, 50);
        assert_eq!(s.chars().count(), 53);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let text = "αβγδε";
        assert_eq!(snippet(text, 3), "αβγ...");
    }
}
