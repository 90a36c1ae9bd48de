/// Bearer-token authentication layer
///
/// Applied with `axum::middleware::from_fn_with_state` to every route
/// group that requires a caller identity. On success a
/// [`CurrentUser`] is inserted into the request extensions; on any
/// failure the request short-circuits with a 401 and no handler runs.
///
/// The token subject is re-resolved against the database on every
/// request, so a deleted account is locked out immediately even while
/// its token is still formally valid.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{app::AppState, error::ApiError};
use taskdeck_shared::{
    auth::{
        identity::{AuthError, CurrentUser},
        jwt::{self, JwtError},
    },
    models::user::User,
};

/// Validates the bearer token and attaches the resolved identity
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingCredentials)?;

    let claims = jwt::validate_token(token, state.jwt_secret()).map_err(|e| match e {
        JwtError::Expired => AuthError::TokenExpired,
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    // The subject must still map to a persisted account
    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UserGone)?;

    req.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(req).await)
}
