use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::core::errors::ApiError;
use crate::server::handlers::utils::request_config;
use crate::state::AppState;

/// `GET /api/config`: the effective configuration with secrets masked.
pub async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let config = request_config(&state)?;
    let redacted = state.config.redact_sensitive_values(&config)?;
    Ok(Json(redacted))
}
