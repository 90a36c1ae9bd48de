/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Register a new account
/// - `POST /api/v1/auth/login` - Login and receive a token
/// - `GET  /api/v1/auth/me` - Return the authenticated identity
///
/// Register and login are public; `/me` sits behind the bearer layer.
/// Both credential failures on login answer with the same 401 so account
/// existence is not leaked.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use taskdeck_shared::{
    auth::{identity::CurrentUser, jwt, password},
    models::user::{CreateUser, User, UserRole},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Optional role, defaults to STANDARD
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Payload for register and login responses
#[derive(Debug, Serialize)]
pub struct AuthData {
    /// The account, without its credential
    pub user: User,

    /// Signed bearer token
    pub token: String,
}

/// Payload for the `/me` endpoint
#[derive(Debug, Serialize)]
pub struct MeData {
    pub user: CurrentUser,
}

fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let claims = jwt::Claims::new(user.id, Duration::hours(state.config.jwt.expires_hours));
    Ok(jwt::create_token(&claims, state.jwt_secret())?)
}

fn parse_role(raw: Option<&str>) -> Result<UserRole, ApiError> {
    match raw {
        None | Some("") => Ok(UserRole::Standard),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::validation("role", "Role must be STANDARD or ADMIN")),
    }
}

/// Register a new account
///
/// Email uniqueness is enforced by the database; a duplicate surfaces
/// through the error normalizer as a 400.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or email already registered
/// - `500 Internal Server Error`: hashing or persistence failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthData>>)> {
    req.validate()?;
    let role = parse_role(req.role.as_deref())?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            name: req.name,
            password_hash,
            role,
        },
    )
    .await?;

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully",
            AuthData { user, token },
        )),
    ))
}

/// Login with email and password
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthData>>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = issue_token(&state, &user)?;

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        AuthData { user, token },
    )))
}

/// Return the authenticated caller's identity
pub async fn me(Extension(user): Extension<CurrentUser>) -> ApiResult<Json<ApiResponse<MeData>>> {
    Ok(Json(ApiResponse::data(MeData { user })))
}
