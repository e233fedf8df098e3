//! Dairy Ledger
//!
//! Customers, daily milk variations, monthly sheets and bills for a dairy
//! delivery round, plus a free-text assistant that drives the same services.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod assistant;
pub mod billing;
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod report;
pub mod services;
pub mod telemetry;
pub mod types;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use utoipa::ToSchema;

/// Upper bound on the time a single request may take.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = services::AppServices::new(db.clone(), &config);
        Self {
            db,
            config,
            services,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

/// The JSON API, without state or middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route("/customers/:id", get(handlers::customers::get_customer))
        .route(
            "/customers/:id/monthly_sheet",
            get(handlers::billing::monthly_sheet),
        )
        .route(
            "/customers/:id/variations_summary",
            get(handlers::billing::variations_summary),
        )
        .route("/customers/:id/bill", get(handlers::billing::monthly_bill))
        .route("/variations", post(handlers::variations::record_variation))
        .route("/assistant", post(handlers::assistant::ask))
}

/// Full application router: API, Swagger UI and the request middleware stack
pub fn build_router(state: AppState) -> Router {
    api_routes()
        .merge(openapi::swagger_ui())
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(telemetry::configure_http_tracing())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        // Outermost, so every inner layer sees the request id
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

/// CORS policy from configuration.
///
/// Explicit origins win; otherwise the permissive policy is used when the
/// environment allows it. `None` means the configuration is unusable.
pub fn cors_layer(cfg: &config::AppConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = cfg
        .cors_allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if cfg.should_allow_permissive_cors() {
        Some(CorsLayer::permissive())
    } else {
        None
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message", body = WelcomeResponse)),
    tag = "Status"
)]
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Dairy Project API".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable"),
    ),
    tag = "Status"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, db_status) = match db::check_connection(&state.db).await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        status,
        Json(json!({
            "status": db_status,
            "checks": { "database": db_status },
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

async fn request_logging_middleware(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    metrics::counter!("dairy.http.requests", 1, "status" => status.as_u16().to_string());
    tracing::info!(
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
