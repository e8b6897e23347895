use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Portal profile row. `user_id` links to the login account, `id` is the
/// identity every attendance/relationship row references.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "a3bb1896-1d7e-4f86-9d3e-0a4f2d9c11aa",
        "user_id": "7f1c6a52-93b4-4f0f-8a24-5e0e4f7d20bb",
        "first_name": "Anita",
        "last_name": "Roy",
        "role": "student",
        "email": "anita.roy@school.example",
        "phone": "+8801712345678"
    })
)]
pub struct Profile {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,

    #[schema(value_type = String, format = "uuid")]
    pub user_id: Uuid,

    #[schema(example = "Anita")]
    pub first_name: String,

    #[schema(example = "Roy")]
    pub last_name: String,

    #[schema(example = "student")]
    pub role: String,

    #[schema(example = "anita.roy@school.example", nullable = true)]
    pub email: Option<String>,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
