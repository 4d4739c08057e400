use crate::config::{CorsConfig, ServerConfig};
use crate::middleware::{make_request_span, request_id_middleware};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::health;
use super::url_handlers;
use super::AppState;

/// Create application router
pub fn create_router(state: Arc<AppState>, server: &ServerConfig, cors: &CorsConfig) -> Router {
    let cors_layer = if cors.allows_any() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<http::HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|s| s.parse::<http::HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        .route("/shorten", post(url_handlers::create_url))
        .route(
            "/shorten/{short_code}",
            get(url_handlers::get_url)
                .put(url_handlers::update_url)
                .delete(url_handlers::delete_url),
        )
        .route("/shorten/{short_code}/stats", get(url_handlers::get_url_stats))
        .route("/{short_code}", get(url_handlers::redirect_url))
        .route("/_health", get(health::health_check));

    let mut router = if server.api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(&server.api_prefix, api_routes)
    };

    // Front-end assets; unknown paths get index.html for client-side routing
    if let Some(dir) = &server.static_dir {
        let assets = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(assets);
    }

    router
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
