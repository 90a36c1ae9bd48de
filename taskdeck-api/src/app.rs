/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, middleware, routes};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. The pool
/// and config are the only process-wide state; both are constructed in
/// `main` and injected here, so tests can build the router around any
/// database.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /                        # Welcome / health (public)
/// └── /api/v1/
///     ├── /auth/
///     │   ├── POST /register       # Public
///     │   ├── POST /login          # Public
///     │   └── GET  /me             # Bearer
///     ├── /tasks/                  # Bearer
///     │   ├── GET/POST /
///     │   └── GET/PUT/DELETE /:id
///     └── /users/                  # Bearer + admin
///         ├── GET /
///         └── GET/DELETE /:id
/// ```
///
/// The bearer layer resolves the token to a persisted identity before any
/// handler runs; the admin gate stacks on top of it for `/users`.
pub fn build_router(state: AppState) -> Router {
    // Auth routes: register/login public, /me behind the bearer layer
    let auth_routes = Router::new()
        .route("/register", axum::routing::post(routes::auth::register))
        .route("/login", axum::routing::post(routes::auth::login))
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .layer(from_fn_with_state(
                    state.clone(),
                    middleware::auth::require_auth,
                )),
        );

    // Task routes: every route requires authentication
    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // User routes: authentication plus the admin gate.
    // Layers run outermost-last, so require_auth is added after
    // require_admin to execute first.
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/:id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        .layer(from_fn(middleware::role::require_admin))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/users", user_routes);

    // Configure CORS from the environment
    let cors = if state.config.api.cors_origin == "*" {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = std::iter::once(&state.config.api.cors_origin)
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/", get(routes::health::welcome))
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
