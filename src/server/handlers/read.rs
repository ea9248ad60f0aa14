use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::rag::{history_from_value, query_vector_store_and_llm};
use crate::server::handlers::utils::request_config;
use crate::state::AppState;

pub const MISSING_QUESTION: &str = "Missing question in request body";

#[derive(Debug, Default, Deserialize)]
pub struct ReadRequest {
    #[serde(default)]
    pub question: Option<String>,
    /// Kept loose: entries of any shape are read leniently and a
    /// non-array value counts as no history.
    #[serde(default, rename = "chatHistory")]
    pub chat_history: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub data: String,
}

/// `POST /api/read`: answers a question from the indexed documents.
///
/// The body is parsed regardless of `Content-Type`.
pub async fn read(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnswerResponse>, ApiError> {
    let payload: ReadRequest = serde_json::from_slice(&body).map_err(|err| {
        tracing::info!("Status: 400, Error: Invalid request body: {}", err);
        ApiError::BadRequest(format!("Invalid request body: {}", err))
    })?;

    let question = match payload.question {
        Some(question) if !question.is_empty() => question,
        _ => {
            tracing::info!("Status: 400, Error: {}", MISSING_QUESTION);
            return Err(ApiError::BadRequest(MISSING_QUESTION.to_string()));
        }
    };

    let history = payload.chat_history.as_ref().and_then(history_from_value);

    let config = request_config(&state)?;
    let index = state.connector.vector_index(&config).await?;
    let llm = state.connector.llm(&config)?;

    let text = query_vector_store_and_llm(
        index.as_ref(),
        llm.as_ref(),
        &question,
        history.as_deref(),
    )
    .await?;

    tracing::info!("Status: 200, Answer: {}", text);
    Ok(Json(AnswerResponse { data: text }))
}
