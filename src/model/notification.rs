use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Slice of a notification row used when building chat context.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct NotificationDigest {
    pub title: String,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}
