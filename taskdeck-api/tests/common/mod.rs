/// Common test utilities for integration tests
///
/// Provides a TestContext that builds the full router against a real
/// database, plus helpers for creating accounts, minting tokens, and
/// driving requests through the router as a tower service.
///
/// Tests that need the database skip themselves when `DATABASE_URL` is
/// not set, so the unit-test suite stays runnable without infrastructure.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::{ApiConfig, Config, DatabaseConfig, Environment, JwtConfig};
use taskdeck_shared::auth::jwt::{create_token, Claims};
use taskdeck_shared::auth::password::hash_password;
use taskdeck_shared::models::user::{CreateUser, User, UserRole};

pub const TEST_PASSWORD: &str = "secret1";

/// Test context containing the app, its database, and its config
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a test context, or `None` when no database is configured
    pub async fn try_new() -> anyhow::Result<Option<Self>> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("skipping: DATABASE_URL not set");
            return Ok(None);
        };

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origin: "*".to_string(),
                environment: Environment::Development,
            },
            database: DatabaseConfig {
                url: database_url.clone(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: "integration-test-secret-at-least-32-bytes".to_string(),
                expires_hours: 1,
            },
        };

        let db = PgPool::connect(&database_url).await?;

        // Path relative to the crate manifest, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(Some(TestContext { db, app, config }))
    }

    /// Creates an account directly in the database and mints a token for it
    pub async fn create_user(&self, role: UserRole) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                name: "Test User".to_string(),
                password_hash: hash_password(TEST_PASSWORD)?,
                role,
            },
        )
        .await?;

        let token = self.token_for(&user)?;
        Ok((user, token))
    }

    /// Signs a token for an existing account
    pub fn token_for(&self, user: &User) -> anyhow::Result<String> {
        let claims = Claims::new(user.id, chrono::Duration::hours(1));
        Ok(create_token(&claims, &self.config.jwt.secret)?)
    }

    /// Drives one request through the router and parses the JSON body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Deletes test accounts (their tasks cascade)
    pub async fn cleanup(&self, user_ids: &[Uuid]) -> anyhow::Result<()> {
        for id in user_ids {
            User::delete(&self.db, *id).await?;
        }
        Ok(())
    }
}

/// Creates a task through the API and returns its ID
pub async fn create_task_via_api(
    ctx: &TestContext,
    token: &str,
    title: &str,
) -> anyhow::Result<Uuid> {
    let (status, body) = ctx
        .request(
            "POST",
            "/api/v1/tasks",
            Some(token),
            Some(serde_json::json!({ "title": title })),
        )
        .await;

    anyhow::ensure!(
        status == StatusCode::CREATED,
        "task creation failed: {} {}",
        status,
        body
    );

    let id = body["data"]["task"]["id"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("missing task id in {}", body))?;
    Ok(id.parse()?)
}
