//! HTTP surface: JSON API, dashboard page and static assets.
//!
//! [`build_router`] is shared by the server binary and the integration tests
//! so both run the same middleware stack.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

use std::time::Duration;

use axum::http::{HeaderName, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use error::{AppError, AppResult};
pub use state::AppState;

use handlers::{auth, health, pages, plants, readings, tasks, tips};

pub const STATIC_DIR: &str = "static";

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/readings", get(readings::latest_all))
        .route("/readings/{source}", get(readings::latest_one))
        .route("/refresh", post(readings::refresh))
        .route("/history", get(readings::history))
        .route("/recommendation", get(readings::recommendation))
        .route("/esp32/data", post(readings::ingest_esp32))
        .route("/plants", get(plants::list_plants).post(plants::create_plant))
        .route(
            "/plants/{id}",
            get(plants::get_plant)
                .put(plants::update_plant)
                .delete(plants::delete_plant),
        )
        .route("/plants/{id}/water", post(plants::water_plant))
        .route(
            "/plant-types",
            get(plants::list_plant_types).post(plants::upsert_plant_type),
        )
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/{id}/complete", post(tasks::complete_task))
        .route("/tips", get(tips::list_tips).post(tips::create_tip))
        .route("/tips/random", get(tips::random_tip))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

/// The full application with its middleware stack, applied bottom-up:
/// request id, tracing, request-id propagation, timeout, panic recovery.
pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let timeout = Duration::from_secs(state.config.http.request_timeout_secs);

    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(health::health))
        .nest("/api", api_routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}
