use crate::error::AppResult;
use crate::models::UrlRequest;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use std::sync::Arc;

use super::AppState;

/// Create a short URL, or return the existing one for the same URL
pub async fn create_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let outcome = state.url_service.create(&payload.url).await?;

    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(outcome.into_mapping())))
}

/// Get a short URL record, counting the access
pub async fn get_url(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mapping = state.url_service.fetch(&short_code).await?;
    Ok(Json(mapping))
}

/// Point a short URL at a new target
pub async fn update_url(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let mapping = state.url_service.update(&short_code, &payload.url).await?;
    Ok(Json(mapping))
}

/// Delete a short URL
pub async fn delete_url(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.url_service.delete(&short_code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get a short URL record without counting an access
pub async fn get_url_stats(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mapping = state.url_service.stats(&short_code).await?;
    Ok(Json(mapping))
}

/// Resolve a short URL and redirect to its target
pub async fn redirect_url(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let target = state.url_service.redirect(&short_code).await?;

    // Serialized form is ASCII-only, so it always fits in a header
    let location = url::Url::parse(&target).map(String::from).unwrap_or(target);

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}
