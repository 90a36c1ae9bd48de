/// Admin role gate
///
/// Runs after the authentication layer on the `/users` route group.
/// A request that somehow reaches this point without an identity gets a
/// 401; an authenticated non-admin gets a 403.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use taskdeck_shared::auth::identity::CurrentUser;

/// Restricts the route group to ADMIN identities
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    if !user.is_admin() {
        return Err(ApiError::Forbidden(
            "Access denied. Admin privileges required.".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
