use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use ragchat_backend::core;
use ragchat_backend::server;
use ragchat_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize()?;
    core::logging::init(&state.paths);

    let config = state.config.load()?;
    let bind_addr = config.server.bind_addr();

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("RAGCHAT_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);
    tracing::info!(
        index = %config.pinecone.index_name,
        documents = %config.indexing.documents_dir.display(),
        "Configuration loaded"
    );

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
