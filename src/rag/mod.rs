//! Retrieval-augmented answering.
//!
//! - `query`: embeds a question, retrieves neighbours and asks the completion model
//! - `prompt`: the fixed prompt template and chat-history transcript
//! - `indexer` / `splitter`: build the vector index from local documents

pub mod indexer;
pub mod prompt;
pub mod query;
pub mod splitter;

pub use prompt::{history_from_value, serialize_chat_history, HistoryMessage, QUESTION_PROMPT};
pub use query::{query_vector_store_and_llm, NO_MATCHES_ANSWER, TOP_K};
