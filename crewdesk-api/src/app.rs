/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check
/// └── /v1/
///     ├── /companies/                # Company registration and lookup
///     ├── /users/                    # People and the reporting tree
///     ├── /tasks/                    # Work items, audit trail, comments
///     ├── /leave/                    # Vacation requests and balances
///     └── /punches/                  # Time clock
/// ```
use crate::{config::Config, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use crewdesk_shared::store::RecordsStore;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning; every clone sees the same records store.
#[derive(Clone)]
pub struct AppState {
    /// The records store
    pub store: Arc<RecordsStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<RecordsStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let company_routes = Router::new()
        .route(
            "/",
            post(routes::companies::create_company).get(routes::companies::list_companies),
        )
        .route(
            "/:id",
            get(routes::companies::get_company).put(routes::companies::update_company),
        )
        .route(
            "/:id/deactivate",
            post(routes::companies::deactivate_company),
        );

    let user_routes = Router::new()
        .route(
            "/",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route(
            "/:id",
            get(routes::users::get_user).put(routes::users::update_user),
        )
        .route("/:id/deactivate", post(routes::users::deactivate_user));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route("/assign", post(routes::tasks::assign_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::archive_task),
        )
        .route("/:id/status", post(routes::tasks::update_task_status))
        .route("/:id/history", get(routes::tasks::get_task_history))
        .route(
            "/:id/observations",
            get(routes::tasks::list_observations).post(routes::tasks::add_observation),
        );

    let leave_routes = Router::new()
        .route(
            "/requests",
            post(routes::leave::create_leave_request).get(routes::leave::list_leave_requests),
        )
        .route("/requests/:id", get(routes::leave::get_leave_request))
        .route(
            "/requests/:id/approve",
            post(routes::leave::approve_leave_request),
        )
        .route(
            "/requests/:id/reject",
            post(routes::leave::reject_leave_request),
        )
        .route("/balance/:user_id", get(routes::leave::get_leave_balance));

    let punch_routes = Router::new()
        .route("/", post(routes::punches::record_punch))
        .route("/:user_id", get(routes::punches::list_punches));

    let v1_routes = Router::new()
        .nest("/companies", company_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/leave", leave_routes)
        .nest("/punches", punch_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
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

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
