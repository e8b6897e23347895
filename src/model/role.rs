use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Closed set of portal roles. Role strings coming from tokens or request
/// bodies are parsed once at the boundary; everything past that point
/// matches exhaustively on this enum.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
    Admin,
}

impl Role {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "parent" => Some(Role::Parent),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!(Role::from_name("student"), Some(Role::Student));
        assert_eq!(Role::from_name("teacher"), Some(Role::Teacher));
        assert_eq!(Role::from_name("parent"), Some(Role::Parent));
        assert_eq!(Role::from_name("admin"), Some(Role::Admin));
    }

    #[test]
    fn rejects_unknown_role() {
        assert_eq!(Role::from_name("superuser"), None);
        assert_eq!(Role::from_name(""), None);
        // role strings are stored lowercase, parsing is case-sensitive
        assert_eq!(Role::from_name("Student"), None);
    }

    #[test]
    fn role_name_round_trips() {
        for role in [Role::Student, Role::Teacher, Role::Parent, Role::Admin] {
            assert_eq!(Role::from_name(role.as_ref()), Some(role));
        }
    }
}
