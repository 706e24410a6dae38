// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and the
/// `{error: {message, status, details?}}` envelope
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("You are not authorized to perform this action")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    NotFoundMessage(String),

    #[error("{message}")]
    Unprocessable {
        message: String,
        details: Vec<String>,
    },

    #[error("Rate limit exceeded. Too many requests.")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{0}")]
    InternalError(String),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn unprocessable(message: impl Into<String>, details: Vec<String>) -> Self {
        ApiError::Unprocessable {
            message: message.into(),
            details,
        }
    }

    /// Build a 422 from `validator` output
    pub fn from_validation(message: impl Into<String>, errors: &ValidationErrors) -> Self {
        Self::unprocessable(message, validation_details(errors))
    }

    /// Re-label a 422 raised deeper in the stack (e.g. by a constraint)
    pub fn with_message(self, message: &str) -> Self {
        match self {
            ApiError::Unprocessable { details, .. } => Self::unprocessable(message, details),
            other => other,
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Never leak SQL details to clients
        let message = match self {
            ApiError::DatabaseError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let mut body = json!({
            "error": {
                "message": message,
                "status": status.as_u16(),
            }
        });

        match self {
            ApiError::Unprocessable { details, .. } => {
                body["error"]["details"] = json!(details);
            }
            ApiError::RateLimited {
                retry_after_seconds,
            } => {
                body["error"]["retry_after_seconds"] = json!(retry_after_seconds);
                return HttpResponse::build(status)
                    .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
                    .json(body);
            }
            _ => {}
        }

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::NotFoundMessage(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Map a sqlx error, turning known constraint violations into 422s
/// DOCUMENTATION: Constraint names come from the files in migrations/
pub fn map_db_error(context: &str, e: sqlx::Error) -> ApiError {
    if let Some(db_err) = e.as_database_error() {
        if let Some(detail) = db_err.constraint().and_then(constraint_message) {
            log::warn!("Constraint violation during {}: {}", context, detail);
            return ApiError::unprocessable("Validation failed", vec![detail.to_string()]);
        }
    }

    log::error!("Database error during {}: {}", context, e);
    ApiError::DatabaseError(e.to_string())
}

fn constraint_message(constraint: &str) -> Option<&'static str> {
    match constraint {
        "index_users_on_lower_email" => Some("Email has already been taken"),
        "index_users_on_lower_username" => Some("Username has already been taken"),
        "index_photos_on_pexels_id" => Some("Pexels has already been taken"),
        "index_photographers_on_pexels_id" => Some("Pexels has already been taken"),
        "index_albums_on_owner_id_and_name" => Some("Name has already been taken"),
        "fk_photos_photographer" => Some("Photographer must exist"),
        _ => None,
    }
}

/// Flatten `validator` errors into human readable messages
/// e.g. `avg_color` + "must be a valid hex color" => "Avg color must be a valid hex color"
pub fn validation_details(errors: &ValidationErrors) -> Vec<String> {
    let mut details: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", err.code));
                format!("{} {}", humanize(field), message)
            })
        })
        .collect();

    details.sort();
    details
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use validator::ValidationError;

    #[test]
    fn test_humanize_field_names() {
        assert_eq!(humanize("avg_color"), "Avg color");
        assert_eq!(humanize("password_confirmation"), "Password confirmation");
        assert_eq!(humanize("url"), "Url");
    }

    #[test]
    fn test_validation_details_are_sorted_and_readable() {
        let mut errors = ValidationErrors::new();
        let mut width = ValidationError::new("range");
        width.message = Some("must be greater than 0".into());
        errors.add("width", width);
        let mut color = ValidationError::new("hex_color");
        color.message = Some("must be a valid hex color".into());
        errors.add("avg_color", color);

        let details = validation_details(&errors);
        assert_eq!(
            details,
            vec![
                "Avg color must be a valid hex color".to_string(),
                "Width must be greater than 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("Photo".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::unprocessable("Validation failed", vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::RateLimited {
                retry_after_seconds: 3
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn test_error_envelope_with_details() {
        let err = ApiError::unprocessable("Registration failed", vec!["Email is invalid".into()]);
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["message"], "Registration failed");
        assert_eq!(value["error"]["status"], 422);
        assert_eq!(value["error"]["details"][0], "Email is invalid");
    }

    #[actix_web::test]
    async fn test_rate_limited_sets_retry_after() {
        let resp = ApiError::RateLimited {
            retry_after_seconds: 42,
        }
        .error_response();

        assert_eq!(
            resp.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["retry_after_seconds"], 42);
        assert!(value["error"].get("details").is_none());
    }

    #[actix_web::test]
    async fn test_database_errors_are_masked() {
        let resp = ApiError::DatabaseError("relation \"users\" does not exist".into())
            .error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["message"], "Internal server error");
        assert_eq!(value["error"]["status"], 500);
    }
}
