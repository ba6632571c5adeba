use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use snaplink_core::ShortCode;
use tracing::{debug, info, instrument};

use crate::error::{AppError, Result};
use crate::model::{MappingResponse, MappingView, StatsResponse, UrlPayload};
use crate::state::AppState;

/// Pulls a usable url out of the request body.
///
/// Unparsable bodies and bodies without a non-empty string `url` are both
/// answered with the same validation error.
fn extract_url(payload: std::result::Result<Json<UrlPayload>, JsonRejection>) -> Result<String> {
    match payload {
        Ok(Json(payload)) => payload.into_url().ok_or(AppError::InvalidUrl),
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "rejected request body");
            Err(AppError::InvalidUrl)
        }
    }
}

/// A code that cannot have been issued is reported as missing.
fn parse_code(code: &str) -> Result<ShortCode> {
    ShortCode::new(code).map_err(|_| AppError::NotFound)
}

#[instrument(skip_all)]
pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UrlPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<MappingResponse>)> {
    let url = extract_url(payload)?;
    let mapping = state.shortener().shorten(&url).await?;

    info!(code = %mapping.short_code, id = mapping.id, "created short url");
    Ok((StatusCode::CREATED, Json(mapping.into())))
}

#[instrument(skip(state))]
pub async fn get_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MappingView>> {
    let code = parse_code(&code)?;
    let mapping = state.shortener().resolve(&code).await?;
    Ok(Json(mapping.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    payload: std::result::Result<Json<UrlPayload>, JsonRejection>,
) -> Result<Json<MappingView>> {
    let url = extract_url(payload)?;
    let code = parse_code(&code)?;
    let mapping = state.shortener().update(&code, &url).await?;

    info!(id = mapping.id, "updated short url");
    Ok(Json(mapping.into()))
}

#[instrument(skip(state))]
pub async fn delete_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let code = parse_code(&code)?;
    state.shortener().delete(&code).await?;

    info!("deleted short url");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>> {
    let code = parse_code(&code)?;
    let mapping = state.shortener().stats(&code).await?;
    Ok(Json(mapping.into()))
}

pub async fn fallback_handler() -> AppError {
    AppError::UnknownRoute
}

pub async fn method_not_allowed_handler() -> AppError {
    AppError::MethodNotAllowed
}
