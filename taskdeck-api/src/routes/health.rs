/// Welcome / health endpoint
///
/// `GET /` is public and doubles as a liveness probe: it reports the
/// service name, version, and whether the database answers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{app::AppState, error::ApiResult};

/// Welcome response
#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,

    /// Application version
    pub version: String,

    /// "running" or "degraded"
    pub status: String,

    /// Database status
    pub database: String,
}

/// Welcome / health handler
pub async fn welcome(State(state): State<AppState>) -> ApiResult<Json<WelcomeResponse>> {
    let database = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(WelcomeResponse {
        message: "Welcome to TaskDeck API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: if database == "connected" {
            "running".to_string()
        } else {
            "degraded".to_string()
        },
        database: database.to_string(),
    }))
}
