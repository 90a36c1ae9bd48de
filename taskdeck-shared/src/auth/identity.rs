/// Request identity resolved by the authentication middleware
///
/// After the bearer token is validated and its subject looked up, a
/// [`CurrentUser`] is inserted into the request extensions. Handlers read
/// it back with Axum's `Extension` extractor; the role middleware checks
/// it before admin routes run.

use serde::Serialize;
use uuid::Uuid;

use crate::models::user::{User, UserRole};

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header, or not a Bearer scheme
    #[error("Not authenticated")]
    MissingCredentials,

    /// Token failed signature or claim validation
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token was valid once but has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Token subject no longer maps to a persisted account
    #[error("User no longer exists")]
    UserGone,

    /// Lookup of the token subject failed
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Authenticated identity attached to the request
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    /// Authenticated user ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Account role, used by the admin gate
    pub role: UserRole,
}

impl CurrentUser {
    /// Shorthand for the admin check
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_user_drops_credential() {
        let user = sample_user(UserRole::Standard);
        let id = user.id;

        let current = CurrentUser::from(user);
        assert_eq!(current.id, id);
        assert_eq!(current.email, "user@example.com");

        let json = serde_json::to_string(&current).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_is_admin() {
        assert!(CurrentUser::from(sample_user(UserRole::Admin)).is_admin());
        assert!(!CurrentUser::from(sample_user(UserRole::Standard)).is_admin());
    }
}
