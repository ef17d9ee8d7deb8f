/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasknest_api::{app::{build_router, AppState}, config::Config};
/// use tasknest_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config)?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tasknest_shared::{
    auth::{
        jwt::{TokenIssuer, TokenValidator},
        middleware::require_auth,
        password::PasswordHasher,
        service::{AuthService, AuthServiceError},
    },
    store::{CategoryStore, Store, TaskStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Registration and login
    pub auth: Arc<AuthService>,

    /// Session token validator used by the authentication gate
    pub validator: Arc<TokenValidator>,

    /// Owned task storage
    pub tasks: Arc<dyn TaskStore>,

    /// Owned category storage
    pub categories: Arc<dyn CategoryStore>,

    /// Whole backend, for health checks
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the auth service and stores onto one storage backend
    ///
    /// # Errors
    ///
    /// Fails if the configured password hash parameters are unusable
    pub fn new<S: Store + 'static>(store: Arc<S>, config: Config) -> Result<Self, AuthServiceError> {
        let hasher = PasswordHasher::new(config.password_hash);
        let issuer = TokenIssuer::new(&config.jwt.secret, config.jwt.ttl());
        let validator = TokenValidator::new(&config.jwt.secret);

        Ok(Self {
            auth: Arc::new(AuthService::new(store.clone(), hasher, issuer)?),
            validator: Arc::new(validator),
            tasks: store.clone(),
            categories: store.clone(),
            store,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health              # Health check (public)
/// ├── POST   /register            # Create identity (public)
/// ├── POST   /login               # Issue session token (public)
/// └── (authentication gate)
///     ├── GET    /me
///     ├── POST   /tasks
///     ├── GET    /tasks?category_id=N
///     ├── GET    /tasks/:id
///     ├── PUT    /tasks/:id
///     ├── PATCH  /tasks/:id
///     ├── DELETE /tasks/:id
///     ├── POST   /categories
///     ├── GET    /categories
///     ├── GET    /categories/:id
///     └── DELETE /categories/:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost last):
/// 1. Authentication gate (protected routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .patch(routes::tasks::set_task_completion)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/categories",
            post(routes::categories::create_category).get(routes::categories::list_categories),
        )
        .route(
            "/categories/:id",
            get(routes::categories::get_category).delete(routes::categories::delete_category),
        )
        .route_layer(middleware::from_fn_with_state(
            state.validator.clone(),
            require_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
