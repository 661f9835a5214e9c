//! Retrieval-augmented generation: chunking, session vector stores, and
//! similarity retrieval.
//!
//! Write path: uploaded text → [`chunker`] → embedding backend →
//! [`SessionRegistry`]. Read path: query → embedding backend →
//! [`RagService::retrieve_context`] over the stored chunks.

pub mod chunker;
pub mod service;
pub mod similarity;
pub mod store;

pub use chunker::{chunk_text, ChunkerConfig};
pub use service::{RagService, DEFAULT_TOP_K};
pub use similarity::cosine_similarity;
pub use store::{DocumentChunk, SessionRegistry, VectorStore};
