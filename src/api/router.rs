//! Router setup and configuration.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{exercises, health, users};
use crate::api::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let config = &state.config;

    // Health and metrics routes
    let mut health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready));
    if config.observability.metrics_enabled {
        health_routes = health_routes.route(&config.observability.metrics_path, get(health::metrics));
    }

    // User and exercise routes
    let api_routes = Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/{id}/exercises", post(exercises::add_exercise))
        .route("/users/{id}/logs", get(exercises::get_logs));

    // Landing page and public assets
    let index = ServeFile::new(&config.assets.index_file);
    let public = ServeDir::new(&config.assets.public_dir);

    Router::new()
        .route_service("/", index)
        .merge(health_routes)
        .nest("/api", api_routes)
        .fallback_service(public)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
