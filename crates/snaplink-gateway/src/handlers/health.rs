use axum::extract::State;
use axum::Json;

use crate::error::Result;
use crate::model::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    state.shortener().health().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}
