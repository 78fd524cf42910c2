//! Retrieval collaborator seams.
//!
//! The vector store and the reranker are external engines; the pipeline only
//! depends on these traits. Asking for a monotonically larger `k` must be a
//! superset-compatible request; that is the store's obligation, not ours.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::ScoredDocument;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return up to `k` documents ranked by relevance to `query`,
    /// most relevant first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>>;
}

#[async_trait]
pub trait Reranker: Send + Sync {
    /// Re-order `candidates` by relevance to `query` and keep the top `k`.
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<ScoredDocument>,
        k: usize,
    ) -> Result<Vec<ScoredDocument>>;
}
