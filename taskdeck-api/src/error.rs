/// Error handling for the API server
///
/// All handlers and middleware return `Result<T, ApiError>`. `ApiError`
/// is the single error normalizer: it maps every failure to an HTTP status
/// and the uniform envelope `{success: false, message, errors?, detail?}`.
/// Handlers never format error bodies themselves.
///
/// Persistence-constraint errors are translated here: a unique violation
/// becomes 400 "already exists" and a missing referenced record becomes
/// 404, mirroring how the database reports them. Internal errors are
/// logged in full and masked in the response; the raw detail is included
/// only when the process runs in development mode.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use taskdeck_shared::auth::{identity::AuthError, jwt::JwtError, password::PasswordError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Whether 500 responses carry the raw error detail
///
/// Set once at startup from the runtime mode flag; development only.
static EXPOSE_ERROR_DETAIL: AtomicBool = AtomicBool::new(false);

/// Enables or disables error detail in 500 responses
pub fn set_expose_error_detail(expose: bool) {
    EXPOSE_ERROR_DETAIL.store(expose, Ordering::Relaxed);
}

fn expose_error_detail() -> bool {
    EXPOSE_ERROR_DETAIL.load(Ordering::Relaxed)
}

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthenticated (401) - missing/invalid/expired token
    Unauthorized(String),

    /// Forbidden (403) - wrong owner or role
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Validation failure (400) with the full list of field violations
    Validation(Vec<FieldError>),

    /// Internal server error (500)
    Internal(String),
}

/// A single field violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

/// Error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always false
    pub success: bool,

    /// Human-readable error message
    pub message: String,

    /// Field violations, present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,

    /// Raw error detail, present only in development mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiError {
    /// Builds a validation error for a single field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors),
                None,
            ),
            ApiError::Internal(msg) => {
                // Full detail goes to the log; the client sees it only in
                // development mode.
                tracing::error!("Internal error: {}", msg);
                let detail = expose_error_detail().then_some(msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    None,
                    detail,
                )
            }
        };

        let body = Json(ErrorBody {
            success: false,
            message,
            errors,
            detail,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors, translating the known constraint violations
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => {
                    ApiError::BadRequest("A record with this value already exists".to_string())
                }
                // foreign_key_violation
                Some("23503") => ApiError::NotFound("Record not found".to_string()),
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert request authentication errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Not authenticated".to_string())
            }
            AuthError::InvalidToken(_) => ApiError::Unauthorized("Invalid token".to_string()),
            AuthError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            AuthError::UserGone => ApiError::Unauthorized("User no longer exists".to_string()),
            AuthError::DatabaseError(msg) => ApiError::Internal(msg),
        }
    }
}

/// Convert JWT errors (login/register token issuance)
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token has expired".to_string()),
            JwtError::ValidationError(_) => ApiError::Unauthorized("Invalid token".to_string()),
            JwtError::CreateError(msg) => {
                ApiError::Internal(format!("Token creation failed: {}", msg))
            }
        }
    }
}

/// Convert password hashing errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert validator output into the field-violation list
///
/// The per-field map is unordered; violations are sorted by field name so
/// the list is deterministic.
impl From<validator::ValidationErrors> for ApiError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errs
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        fields.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));

        ApiError::Validation(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct SampleRequest {
        #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
        name: String,

        #[validate(email(message = "Please provide a valid email"))]
        email: String,

        #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
        password: String,
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");

        let err = ApiError::validation("title", "too short");
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                ApiError::BadRequest("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Unauthorized("x".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::Forbidden("x".to_string()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
            (
                ApiError::Validation(vec![]),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Internal("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_404() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_validation_errors_collected_and_sorted() {
        let request = SampleRequest {
            name: "J".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };

        let err = ApiError::from(request.validate().unwrap_err());

        let ApiError::Validation(fields) = err else {
            panic!("Expected validation error");
        };

        // All three violations present, in field order
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[1].field, "name");
        assert_eq!(fields[2].field, "password");
        assert_eq!(fields[1].message, "Name must be at least 2 characters");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::MissingCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::UserGone),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::DatabaseError("boom".to_string())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            success: false,
            message: "Validation failed".to_string(),
            errors: Some(vec![FieldError {
                field: "title".to_string(),
                message: "Title must be between 3 and 100 characters".to_string(),
            }]),
            detail: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0]["field"], "title");
        // detail is omitted entirely when absent
        assert!(json.get("detail").is_none());
    }
}
