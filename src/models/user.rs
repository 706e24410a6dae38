// src/models/user.rs
// DOCUMENTATION: User accounts, auth request DTOs and the public user view
// PURPOSE: Map the users table and validate registration/profile input

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::timestamps::iso8601;

/// Account role, stored as an integer column (0 = member, 1 = admin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member = 0,
    Admin = 1,
}

/// Complete user record from the database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User plus aggregate counters, as loaded for profile responses
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    #[sqlx(flatten)]
    pub user: User,
    pub photo_count: i64,
    pub favorite_count: i64,
}

/// Public user representation
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub photo_count: i64,
    pub favorite_count: i64,
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.user.id,
            username: self.user.username.clone(),
            email: self.user.email.clone(),
            bio: self.user.bio.clone(),
            avatar_url: self.user.avatar_url.clone(),
            role: self.user.role,
            photo_count: self.photo_count,
            favorite_count: self.favorite_count,
            created_at: self.user.created_at,
        }
    }
}

/// Compact `{id, username}` reference embedded in photos and albums
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

/// POST /auth/register body
/// Fields are optional so that missing values surface as 422 details
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "can't be blank"),
        length(min = 3, max = 30, message = "must be between 3 and 30 characters"),
        custom = "validate_username"
    )]
    pub username: Option<String>,

    #[validate(required(message = "can't be blank"), email(message = "is invalid"))]
    pub email: Option<String>,

    #[validate(
        required(message = "can't be blank"),
        length(min = 8, message = "is too short (minimum is 8 characters)")
    )]
    pub password: Option<String>,

    pub password_confirmation: Option<String>,
}

/// POST /auth/login body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/refresh body
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// POST /auth/logout body (optional)
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// PUT /auth/profile body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 3, max = 30, message = "must be between 3 and 30 characters"),
        custom = "validate_username"
    )]
    pub username: Option<String>,

    pub bio: Option<String>,

    #[validate(length(max = 2048, message = "is too long (maximum is 2048 characters)"))]
    pub avatar_url: Option<String>,
}

/// Usernames are limited to ASCII letters, digits and underscores
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Ok(());
    }

    let mut err = ValidationError::new("username_format");
    err.message = Some(Cow::from("only allows letters, numbers, and underscores"));
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::validation_details;

    fn valid_registration() -> RegisterRequest {
        RegisterRequest {
            username: Some("testuser".to_string()),
            email: Some("test@example.com".to_string()),
            password: Some("password123".to_string()),
            password_confirmation: Some("password123".to_string()),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let req = RegisterRequest {
            username: Some("test".to_string()),
            ..Default::default()
        };
        let errors = req.validate().unwrap_err();
        let details = validation_details(&errors);
        assert!(details.contains(&"Email can't be blank".to_string()));
        assert!(details.contains(&"Password can't be blank".to_string()));
    }

    #[test]
    fn test_username_format() {
        let req = RegisterRequest {
            username: Some("bad user!".to_string()),
            ..valid_registration()
        };
        let details = validation_details(&req.validate().unwrap_err());
        assert_eq!(
            details,
            vec!["Username only allows letters, numbers, and underscores".to_string()]
        );
    }

    #[test]
    fn test_username_length_and_email_format() {
        let req = RegisterRequest {
            username: Some("ab".to_string()),
            email: Some("not-an-email".to_string()),
            ..valid_registration()
        };
        let details = validation_details(&req.validate().unwrap_err());
        assert!(details.contains(&"Email is invalid".to_string()));
        assert!(details.contains(&"Username must be between 3 and 30 characters".to_string()));
    }

    #[test]
    fn test_short_password() {
        let req = RegisterRequest {
            password: Some("short".to_string()),
            ..valid_registration()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_profile_update_allows_partial_bodies() {
        let req = UpdateProfileRequest {
            bio: Some("Street photographer".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let req = UpdateProfileRequest {
            username: Some("no spaces allowed".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&UserRole::Member).unwrap(), "\"member\"");
    }
}
