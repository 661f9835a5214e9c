//! Indexing and retrieval over session vector stores.

use std::sync::Arc;

use tracing::{debug, info};

use crate::embedding::{Embedder, EmbeddingMode};
use crate::error::{Result, StudyBuddyError};
use crate::rag::chunker::{chunk_text, ChunkerConfig};
use crate::rag::store::{DocumentChunk, SessionRegistry, VectorStore};

/// Default number of chunks returned by retrieval
pub const DEFAULT_TOP_K: usize = 3;

/// Chunks, embeds, and retrieves documents for sessions.
///
/// Holds the registry and an embedding backend; the same service instance is
/// both the only writer of the registry and the read path for retrieval.
#[derive(Clone)]
pub struct RagService {
    registry: SessionRegistry,
    embedder: Arc<dyn Embedder>,
    chunker: ChunkerConfig,
}

impl RagService {
    pub fn new(registry: SessionRegistry, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            registry,
            embedder,
            chunker: ChunkerConfig::default(),
        }
    }

    /// Use a non-default chunker configuration
    pub fn with_chunker(mut self, chunker: ChunkerConfig) -> Self {
        self.chunker = chunker;
        self
    }

    /// Access the underlying session registry
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Index `text` for `session_id`, replacing any previously indexed
    /// document for that session. Returns the number of chunks indexed.
    ///
    /// All chunk embeddings are computed before the registry is touched, so
    /// a failure leaves the session's previous store fully intact and a
    /// reader never observes a partially built store.
    pub async fn index_document(&self, session_id: &str, text: &str) -> Result<usize> {
        let chunks = chunk_text(text, &self.chunker);
        debug!(session_id, chunk_count = chunks.len(), "chunked document");

        let mut indexed = Vec::with_capacity(chunks.len());
        for (ordinal, chunk) in chunks.into_iter().enumerate() {
            let embedding = self
                .embedder
                .embed(&chunk, EmbeddingMode::Document)
                .await?;
            indexed.push(DocumentChunk::new(session_id, ordinal, chunk, embedding));
        }

        let count = indexed.len();
        self.registry.replace(session_id, VectorStore::new(indexed));
        info!(
            session_id,
            count,
            provider = %self.embedder.provider(),
            "indexed document"
        );
        Ok(count)
    }

    /// True iff the session has at least one indexed chunk
    pub fn has_documents(&self, session_id: &str) -> bool {
        self.registry.has_documents(session_id)
    }

    /// Retrieve the `top_k` most relevant chunk texts for `query`.
    ///
    /// A session without documents yields an empty result without calling
    /// the embedding backend; an embedding failure surfaces as an error so
    /// callers can tell "nothing indexed" from "retrieval failed".
    pub async fn retrieve_context(
        &self,
        session_id: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<String>> {
        if top_k == 0 {
            return Err(StudyBuddyError::validation(
                "top_k",
                "must be a positive integer",
            ));
        }

        if !self.registry.has_documents(session_id) {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query, EmbeddingMode::Query).await?;
        let results = self
            .registry
            .top_k_texts(session_id, &query_embedding, top_k);
        debug!(session_id, hits = results.len(), "retrieved context");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingError, MockEmbedder};
    use crate::provider::Provider;
    use mockall::predicate::*;

    fn mock_with_constant_vector(vector: Vec<f32>) -> MockEmbedder {
        let mut mock = MockEmbedder::new();
        mock.expect_embed()
            .returning(move |_, _| Ok(vector.clone()));
        mock.expect_provider().return_const(Provider::Gemini);
        mock.expect_model_name()
            .return_const("mock-embedding".to_string());
        mock
    }

    fn service_with(mock: MockEmbedder) -> RagService {
        RagService::new(SessionRegistry::new(), Arc::new(mock))
    }

    #[tokio::test]
    async fn test_index_empty_text_indexes_zero_chunks() {
        let service = service_with(mock_with_constant_vector(vec![1.0]));
        let count = service.index_document("s1", "   ").await.unwrap();
        assert_eq!(count, 0);
        assert!(!service.has_documents("s1"));
    }

    #[tokio::test]
    async fn test_index_short_text_single_chunk() {
        let service = service_with(mock_with_constant_vector(vec![1.0, 0.0]));
        let count = service
            .index_document("s1", "photosynthesis converts light to energy")
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(service.has_documents("s1"));
        assert_eq!(service.registry().chunk_ids("s1"), vec!["s1-0"]);
    }

    #[tokio::test]
    async fn test_reindex_replaces_store() {
        let text_600: String = (0..600)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ");

        let service = service_with(mock_with_constant_vector(vec![1.0]));
        let count = service.index_document("s1", &text_600).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(service.registry().chunk_ids("s1"), vec!["s1-0", "s1-1"]);

        let count = service.index_document("s1", "short note").await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(service.registry().chunk_ids("s1"), vec!["s1-0"]);
        assert_eq!(service.registry().chunk_count("s1"), 1);
    }

    #[tokio::test]
    async fn test_index_failure_leaves_previous_store_intact() {
        let service = service_with(mock_with_constant_vector(vec![1.0]));
        service.index_document("s1", "original notes").await.unwrap();

        // Swap in a service whose embedder fails, sharing the registry.
        let mut failing = MockEmbedder::new();
        failing.expect_embed().returning(|_, _| {
            Err(EmbeddingError::Network {
                message: "connection reset".to_string(),
            })
        });
        failing.expect_provider().return_const(Provider::Gemini);
        let broken = RagService::new(service.registry().clone(), Arc::new(failing));

        let result = broken.index_document("s1", "replacement notes").await;
        assert!(result.is_err());

        // The original single-chunk store is still there.
        assert!(service.has_documents("s1"));
        assert_eq!(service.registry().chunk_count("s1"), 1);
    }

    #[tokio::test]
    async fn test_retrieve_without_documents_skips_embedder() {
        let mut mock = MockEmbedder::new();
        mock.expect_embed().times(0);
        mock.expect_provider().return_const(Provider::Gemini);
        let service = service_with(mock);

        let results = service.retrieve_context("s1", "anything", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_top_k_zero_is_an_error() {
        let service = service_with(mock_with_constant_vector(vec![1.0]));
        let err = service.retrieve_context("s1", "query", 0).await.unwrap_err();
        assert!(matches!(err, StudyBuddyError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_retrieve_embedding_failure_is_an_error_not_empty() {
        let service = service_with(mock_with_constant_vector(vec![1.0]));
        service.index_document("s1", "some notes").await.unwrap();

        let mut failing = MockEmbedder::new();
        failing.expect_embed().returning(|_, _| {
            Err(EmbeddingError::Timeout { timeout_secs: 60 })
        });
        failing.expect_provider().return_const(Provider::Gemini);
        let broken = RagService::new(service.registry().clone(), Arc::new(failing));

        let result = broken.retrieve_context("s1", "query", 3).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_retrieve_queries_with_query_mode() {
        let mut mock = MockEmbedder::new();
        mock.expect_embed()
            .with(always(), eq(EmbeddingMode::Document))
            .returning(|_, _| Ok(vec![1.0, 0.0]));
        mock.expect_embed()
            .with(always(), eq(EmbeddingMode::Query))
            .times(1)
            .returning(|_, _| Ok(vec![1.0, 0.0]));
        mock.expect_provider().return_const(Provider::Gemini);
        let service = service_with(mock);

        service.index_document("s1", "notes about cells").await.unwrap();
        let results = service.retrieve_context("s1", "cells", 3).await.unwrap();
        assert_eq!(results, vec!["notes about cells".to_string()]);
    }

    #[tokio::test]
    async fn test_retrieve_ranks_by_similarity() {
        // Embedder that maps known texts to fixed vectors.
        let mut mock = MockEmbedder::new();
        mock.expect_embed().returning(|text, _| {
            Ok(match text {
                t if t.contains("mitochondria") => vec![1.0, 0.0, 0.0],
                t if t.contains("ribosome") => vec![0.0, 1.0, 0.0],
                t if t.contains("nucleus") => vec![0.0, 0.0, 1.0],
                // Query lands nearest the ribosome chunk.
                _ => vec![0.1, 1.0, 0.2],
            })
        });
        mock.expect_provider().return_const(Provider::Gemini);

        let service = RagService::new(SessionRegistry::new(), Arc::new(mock))
            .with_chunker(ChunkerConfig::new(4, 0).unwrap());

        // 12 words, chunk_size 4, no overlap: three 4-word chunks.
        let notes = "the mitochondria makes energy \
                     the ribosome builds proteins \
                     the nucleus stores dna";
        let count = service.index_document("s1", notes).await.unwrap();
        assert_eq!(count, 3);

        let top = service
            .retrieve_context("s1", "protein factory", 1)
            .await
            .unwrap();
        assert_eq!(top, vec!["the ribosome builds proteins".to_string()]);

        let all = service
            .retrieve_context("s1", "protein factory", 5)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], "the ribosome builds proteins");
    }
}
