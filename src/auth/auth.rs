use crate::config::Config;
use crate::error::ApiError;
use crate::{model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};
use uuid::Uuid;

pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to a portal profile
    pub profile_id: Option<Uuid>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_name(&data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
            profile_id: data.claims.profile_id,
        }))
    }
}

impl AuthUser {
    pub fn require_teacher(&self) -> actix_web::Result<Uuid> {
        if self.role != Role::Teacher {
            return Err(ApiError::forbidden("Teacher only").into());
        }
        self.profile_id
            .ok_or_else(|| ApiError::forbidden("No teacher profile").into())
    }

    /// Scoping identity for reads; every account is linked to a profile row.
    pub fn require_profile(&self) -> actix_web::Result<Uuid> {
        self.profile_id
            .ok_or_else(|| ApiError::forbidden("No portal profile").into())
    }
}
