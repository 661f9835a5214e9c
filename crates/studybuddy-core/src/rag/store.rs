//! In-memory session vector stores.
//!
//! Each session owns at most one [`VectorStore`]; re-indexing replaces the
//! session's store wholesale rather than merging into it, so a store never
//! mixes chunks (or embedding dimensionalities) from two uploads.
//!
//! The registry is shared mutable state. A retrieval racing a re-index on the
//! same session observes either the old store or the new one — never a
//! partially written one, because [`SessionRegistry::replace`] swaps in a
//! fully built store under the write lock. Callers that need stronger
//! ordering must serialize per-session access themselves.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::rag::similarity::cosine_similarity;

/// One retrievable unit of indexed text
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    /// Unique within a session: `"{session_id}-{ordinal}"`
    pub id: String,

    /// The chunk text as stored (whitespace-normalized)
    pub text: String,

    /// Embedding vector, dimensionality fixed by the producing provider
    pub embedding: Vec<f32>,
}

impl DocumentChunk {
    pub fn new(
        session_id: &str,
        ordinal: usize,
        text: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: format!("{session_id}-{ordinal}"),
            text: text.into(),
            embedding,
        }
    }
}

/// Ordered collection of chunks for one session.
///
/// Insertion order equals chunk ordinal within the source document.
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    chunks: Vec<DocumentChunk>,
}

impl VectorStore {
    pub fn new(chunks: Vec<DocumentChunk>) -> Self {
        Self { chunks }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }
}

/// Registry mapping session ids to their vector stores.
///
/// Cloning the registry clones a handle to the same underlying map; the host
/// application controls its lifecycle by owning the first instance. There is
/// no eviction — stores live as long as the registry does.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    stores: Arc<RwLock<HashMap<String, VectorStore>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store for `session_id` wholesale.
    ///
    /// This is the only write path; it is not additive.
    pub fn replace(&self, session_id: &str, store: VectorStore) {
        let mut stores = self.stores.write().expect("session registry poisoned");
        stores.insert(session_id.to_string(), store);
    }

    /// True iff the session has a store with at least one chunk
    pub fn has_documents(&self, session_id: &str) -> bool {
        let stores = self.stores.read().expect("session registry poisoned");
        stores.get(session_id).is_some_and(|s| !s.is_empty())
    }

    /// Number of chunks indexed for the session (0 when absent)
    pub fn chunk_count(&self, session_id: &str) -> usize {
        let stores = self.stores.read().expect("session registry poisoned");
        stores.get(session_id).map_or(0, |s| s.len())
    }

    /// Chunk ids for the session, in insertion order
    pub fn chunk_ids(&self, session_id: &str) -> Vec<String> {
        let stores = self.stores.read().expect("session registry poisoned");
        stores.get(session_id).map_or_else(Vec::new, |s| {
            s.chunks().iter().map(|c| c.id.clone()).collect()
        })
    }

    /// Score every chunk of the session against `query_embedding` and return
    /// the texts of the `top_k` best matches, highest similarity first.
    ///
    /// The sort is stable, so equal scores keep insertion order. Returns an
    /// empty vec for an unknown session.
    pub fn top_k_texts(&self, session_id: &str, query_embedding: &[f32], top_k: usize) -> Vec<String> {
        let stores = self.stores.read().expect("session registry poisoned");
        let Some(store) = stores.get(session_id) else {
            return Vec::new();
        };

        let mut scored: Vec<(f32, &DocumentChunk)> = store
            .chunks()
            .iter()
            .map(|chunk| (cosine_similarity(query_embedding, &chunk.embedding), chunk))
            .collect();

        // Stable descending sort keeps ties in insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .map(|(_, chunk)| chunk.text.clone())
            .collect()
    }
}
