/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use traintrack_api::{app::{build_router, AppState}, config::Config};
/// use traintrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let state = AppState::new(Arc::new(MemoryStore::new()), Config::for_tests());
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{security::security_headers, session::session_layer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use traintrack_shared::{
    auth::service::AuthService, compliance::ComplianceAggregator, store::Store,
};

/// Shared application state
///
/// Cloned per request; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Backing store for records and health checks
    pub store: Arc<dyn Store>,

    pub auth: AuthService,

    pub compliance: ComplianceAggregator,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services to one store
    pub fn new<S: Store + 'static>(store: Arc<S>, config: Config) -> Self {
        let auth = AuthService::new(store.clone(), store.clone(), config.session_ttl());
        let compliance = ComplianceAggregator::new(store.clone());

        Self {
            store,
            auth,
            compliance,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /v1/
///     ├── /auth/         register, login, logout, reset-password, me
///     ├── GET /dashboard
///     ├── /compliance/   overview, monthly, collaborators, lookup
///     ├── /trainings     list (login), create/update/delete (manager)
///     └── /technicians   list (login), create/update/delete (manager)
/// ```
///
/// Every `/v1` request passes through the session layer, which resolves the
/// session cookie; handlers do their own gating.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/reset-password", post(routes::auth::reset_password))
        .route("/me", get(routes::auth::me));

    let compliance_routes = Router::new()
        .route("/overview", get(routes::compliance::overview))
        .route("/monthly", get(routes::compliance::monthly))
        .route("/collaborators", get(routes::compliance::collaborators))
        .route("/lookup", post(routes::compliance::lookup));

    let training_routes = Router::new()
        .route(
            "/",
            get(routes::trainings::list_trainings).post(routes::trainings::create_training),
        )
        .route(
            "/:id",
            put(routes::trainings::update_training).delete(routes::trainings::delete_training),
        );

    let technician_routes = Router::new()
        .route(
            "/",
            get(routes::technicians::list_technicians).post(routes::technicians::create_technician),
        )
        .route(
            "/:id",
            put(routes::technicians::update_technician)
                .delete(routes::technicians::delete_technician),
        );

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/dashboard", get(routes::compliance::dashboard))
        .nest("/compliance", compliance_routes)
        .nest("/trainings", training_routes)
        .nest("/technicians", technician_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
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
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            production,
            security_headers,
        ))
        .with_state(state)
}
