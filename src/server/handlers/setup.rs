use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag::indexer::{
    ensure_index, index_documents, load_documents, IndexReport, READY_POLL_INTERVAL,
};
use crate::server::handlers::utils::request_config;
use crate::state::AppState;

pub const SETUP_DONE: &str = "successfully created index and loaded data into pinecone...";

/// `POST /api/setup`: creates the index if needed and loads the documents
/// directory into it.
pub async fn setup(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let config = request_config(&state)?;
    let indexing = &config.indexing;
    let index_name = config.pinecone.index_name.clone();

    let documents = load_documents(&indexing.documents_dir)?;
    if documents.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "No .txt or .md documents found in {}",
            indexing.documents_dir.display()
        )));
    }

    let controller = state.connector.index_controller(&config)?;
    let created = ensure_index(
        controller.as_ref(),
        &index_name,
        indexing,
        READY_POLL_INTERVAL,
    )
    .await?;

    let llm = state.connector.llm(&config)?;
    let index = state.connector.vector_index(&config).await?;
    let (chunks, upserted) =
        index_documents(index.as_ref(), llm.as_ref(), &documents, indexing).await?;

    let report = IndexReport {
        index: index_name,
        created,
        documents: documents.len(),
        chunks,
        upserted,
    };
    tracing::info!(
        index = %report.index,
        created = report.created,
        documents = report.documents,
        chunks = report.chunks,
        "Index setup finished"
    );

    Ok(Json(json!({
        "data": SETUP_DONE,
        "report": report,
    })))
}
