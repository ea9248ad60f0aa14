//! Builds the vector index from a local documents directory.
//!
//! Flow: make sure the index exists (creating it and waiting for readiness
//! when missing), load `.txt`/`.md` files, split them, embed each batch and
//! upsert the vectors with their text under `pageContent`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Map};
use sha2::{Digest, Sha256};

use super::splitter::{RecursiveCharacterSplitter, TextChunk};
use crate::core::config::IndexingConfig;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;
use crate::vector::{IndexController, VectorIndex, VectorRecord, PAGE_CONTENT_KEY};

pub const READY_POLL_INTERVAL: Duration = Duration::from_secs(5);

const DOCUMENT_EXTENSIONS: [&str; 2] = ["txt", "md"];

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexReport {
    pub index: String,
    pub created: bool,
    pub documents: usize,
    pub chunks: usize,
    pub upserted: usize,
}

/// Creates `name` if it does not exist yet. Returns whether it was created.
pub async fn ensure_index(
    controller: &dyn IndexController,
    name: &str,
    indexing: &IndexingConfig,
    poll_interval: Duration,
) -> Result<bool, ApiError> {
    let existing = controller.list_indexes().await?;
    if existing.iter().any(|index| index == name) {
        tracing::info!("Index {} already exists", name);
        return Ok(false);
    }

    tracing::info!("Creating index {}...", name);
    controller
        .create_index(name, indexing.vector_dimension, &indexing.metric)
        .await?;

    wait_until_ready(
        controller,
        name,
        Duration::from_secs(indexing.ready_timeout_secs),
        poll_interval,
    )
    .await?;
    Ok(true)
}

async fn wait_until_ready(
    controller: &dyn IndexController,
    name: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), ApiError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match controller.describe_index(name).await {
            Ok(description) if description.ready => {
                tracing::info!("Index {} is ready", name);
                return Ok(());
            }
            Ok(_) => tracing::debug!("Index {} not ready yet", name),
            // Freshly created indexes can briefly 404 on describe.
            Err(ApiError::NotFound(_)) => tracing::debug!("Index {} not visible yet", name),
            Err(err) => return Err(err),
        }

        if tokio::time::Instant::now() + poll_interval > deadline {
            return Err(ApiError::upstream(
                "pinecone",
                format!("index {} was not ready within {:?}", name, timeout),
            ));
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Reads every `.txt` and `.md` file under `dir`, sorted by path.
pub fn load_documents(dir: &Path) -> Result<Vec<SourceDocument>, ApiError> {
    if !dir.is_dir() {
        return Err(ApiError::BadRequest(format!(
            "Documents directory {} does not exist",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).map_err(ApiError::internal)? {
            let path = entry.map_err(ApiError::internal)?.path();
            if path.is_dir() {
                pending.push(path);
            } else if has_document_extension(&path) {
                paths.push(path);
            }
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(text) => documents.push(SourceDocument { path, text }),
            Err(err) => tracing::warn!("Skipping {}: {}", path.display(), err),
        }
    }
    Ok(documents)
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Splits, embeds and upserts `documents`, one embedding call per batch.
pub async fn index_documents(
    index: &dyn VectorIndex,
    llm: &dyn LlmProvider,
    documents: &[SourceDocument],
    indexing: &IndexingConfig,
) -> Result<(usize, usize), ApiError> {
    let splitter = RecursiveCharacterSplitter::new(indexing.chunk_size, indexing.chunk_overlap);
    let chunks: Vec<TextChunk> = documents
        .iter()
        .flat_map(|doc| splitter.split_document(&doc.text, &doc.path.to_string_lossy()))
        .collect();

    tracing::info!(
        "Split {} documents into {} chunks",
        documents.len(),
        chunks.len()
    );

    let mut upserted = 0;
    for batch in chunks.chunks(indexing.batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = llm.embed_documents(&texts).await?;
        let records = batch
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| chunk_record(chunk, values))
            .collect::<Vec<_>>();
        let count = records.len();
        let reported = index.upsert(records).await?;
        // Some deployments omit upsertedCount; fall back to what was sent.
        upserted += if reported == 0 { count } else { reported };
        tracing::debug!("Upserted batch of {} vectors", count);
    }

    Ok((chunks.len(), upserted))
}

fn chunk_record(chunk: &TextChunk, values: Vec<f32>) -> VectorRecord {
    let mut metadata = Map::new();
    metadata.insert(PAGE_CONTENT_KEY.to_string(), json!(chunk.text));
    metadata.insert("txtPath".to_string(), json!(chunk.source));
    metadata.insert("loc".to_string(), json!({ "chunkIndex": chunk.chunk_index }));

    VectorRecord {
        id: chunk_id(&chunk.source, chunk.chunk_index),
        values,
        metadata,
    }
}

/// Stable id so re-indexing the same file overwrites instead of duplicating.
fn chunk_id(source: &str, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"#");
    hasher.update(chunk_index.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::rag::query::fakes::{FakeIndex, FakeLlm};
    use crate::vector::IndexDescription;

    struct FakeController {
        existing: Vec<String>,
        ready_after: usize,
        describes: AtomicUsize,
        created: Mutex<Vec<(String, usize, String)>>,
    }

    impl FakeController {
        fn new(existing: &[&str], ready_after: usize) -> Self {
            Self {
                existing: existing.iter().map(|s| s.to_string()).collect(),
                ready_after,
                describes: AtomicUsize::new(0),
                created: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IndexController for FakeController {
        async fn list_indexes(&self) -> Result<Vec<String>, ApiError> {
            Ok(self.existing.clone())
        }

        async fn create_index(
            &self,
            name: &str,
            dimension: usize,
            metric: &str,
        ) -> Result<(), ApiError> {
            self.created
                .lock()
                .unwrap()
                .push((name.to_string(), dimension, metric.to_string()));
            Ok(())
        }

        async fn describe_index(&self, name: &str) -> Result<IndexDescription, ApiError> {
            let seen = self.describes.fetch_add(1, Ordering::SeqCst) + 1;
            if seen == 1 {
                return Err(ApiError::NotFound(name.to_string()));
            }
            Ok(IndexDescription {
                name: name.to_string(),
                dimension: Some(1536),
                ready: seen >= self.ready_after,
                host: Some("docs.example".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn existing_index_is_left_alone() {
        let controller = FakeController::new(&["docs"], 1);
        let created = ensure_index(
            &controller,
            "docs",
            &IndexingConfig::default(),
            Duration::from_millis(1),
        )
        .await
        .unwrap();
        assert!(!created);
        assert!(controller.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_index_is_created_and_awaited() {
        let controller = FakeController::new(&["other"], 3);
        let created = ensure_index(
            &controller,
            "docs",
            &IndexingConfig::default(),
            Duration::from_millis(1),
        )
        .await
        .unwrap();

        assert!(created);
        assert_eq!(
            controller.created.lock().unwrap()[0],
            ("docs".to_string(), 1536, "cosine".to_string())
        );
        assert_eq!(controller.describes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn readiness_wait_times_out() {
        let controller = FakeController::new(&[], usize::MAX);
        let result = wait_until_ready(
            &controller,
            "docs",
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Upstream { .. })));
    }

    #[test]
    fn load_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "bee").unwrap();
        fs::write(dir.path().join("a.txt"), "ay").unwrap();
        fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.TXT"), "see").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        let names: Vec<String> = docs
            .iter()
            .map(|d| {
                d.path
                    .strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.txt", "b.md", "nested/c.TXT"]);
    }

    #[test]
    fn missing_documents_dir_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_documents(&dir.path().join("absent"));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn documents_are_embedded_in_batches_and_upserted() {
        let index = FakeIndex::default();
        let llm = FakeLlm::answering("unused");
        let indexing = IndexingConfig {
            chunk_size: 10,
            chunk_overlap: 0,
            batch_size: 2,
            ..IndexingConfig::default()
        };
        let documents = vec![SourceDocument {
            path: PathBuf::from("notes.txt"),
            text: "alpha beta gamma delta epsilon".to_string(),
        }];

        let (chunks, upserted) = index_documents(&index, &llm, &documents, &indexing)
            .await
            .unwrap();

        assert_eq!(chunks, 4);
        assert_eq!(upserted, 4);
        assert_eq!(llm.embed_calls.load(Ordering::SeqCst), 2);

        let records = index.upserted.lock().unwrap();
        assert_eq!(records[0].metadata["pageContent"], "alpha beta");
        assert_eq!(records[0].metadata["txtPath"], "notes.txt");
        assert_eq!(records[3].metadata["loc"]["chunkIndex"], 3);
        assert_eq!(records[0].id, chunk_id("notes.txt", 0));
        assert_ne!(records[0].id, records[1].id);
    }
}
