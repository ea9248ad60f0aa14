use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::state::AppState;

/// Loads configuration for a request. A broken config file is a server
/// fault here, not a client one.
pub fn request_config(state: &AppState) -> Result<AppConfig, ApiError> {
    state.config.load().map_err(|err| match err {
        ApiError::BadRequest(msg) => ApiError::Internal(msg),
        other => other,
    })
}
