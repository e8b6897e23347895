use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Class {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,

    #[schema(example = "Mathematics")]
    pub name: String,

    #[schema(example = "8")]
    pub grade: String,

    #[schema(example = "B")]
    pub section: String,

    #[schema(value_type = String, format = "uuid")]
    pub teacher_id: Uuid,
}
