//! Vector index access: shared types and the Pinecone implementation.

mod pinecone;
mod store;

pub use pinecone::{PineconeController, PineconeIndex};
pub use store::{
    IndexController, IndexDescription, QueryResponse, VectorIndex, VectorMatch, VectorQuery,
    VectorRecord, PAGE_CONTENT_KEY,
};
