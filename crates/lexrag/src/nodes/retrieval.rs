//! Retrieval prompt optimization and bounded recursive retrieval.
//!
//! The retriever over-fetches from the store (`base_k` plus one slot per
//! already-seen document), filters out everything retrieved before, keeps
//! the top `base_k`, and asks a completeness oracle whether the accumulated
//! context answers the original question. Missing topics become composite
//! sub-queries that recurse into another round, sharing the same
//! `excluded_ids` and `depth`. The loop terminates within `max_depth`
//! rounds regardless of oracle behaviour.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::oracle::{decide, LlmClient};
use crate::prompts;
use crate::state::SessionState;
use crate::store::{Reranker, VectorStore};

/// Rewrite `state.query` into a retrieval-optimized form. Prior grading
/// failures, when present, steer the rewrite away from previous mistakes.
pub async fn optimize_query(
    llm: &dyn LlmClient,
    state: &mut SessionState,
    failure_reasons: Option<&str>,
) -> Result<()> {
    let prompt = prompts::optimize_prompt(&state.query, &state.intent, failure_reasons);
    let rewritten = llm.generate(&prompt).await?;
    let rewritten = rewritten.trim();
    if !rewritten.is_empty() {
        tracing::debug!(from = %state.query, to = %rewritten, "query rewritten for retrieval");
        state.query = rewritten.to_string();
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SufficiencyCheck {
    is_sufficient: bool,
    #[serde(default)]
    missing_queries: Vec<String>,
}

/// Whether a retrieval episode produced anything at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Found,
    Empty,
}

pub struct RecursiveRetriever<'a> {
    pub llm: &'a dyn LlmClient,
    pub store: &'a dyn VectorStore,
    pub reranker: Option<&'a dyn Reranker>,
    pub config: &'a PipelineConfig,
}

impl<'a> RecursiveRetriever<'a> {
    /// Run one retrieval episode against `state.query`. `state.depth` must
    /// be 0 on entry; `excluded_ids` may carry ids from earlier episodes so
    /// grading retries never re-fetch the same documents.
    pub async fn retrieve(&self, state: &mut SessionState) -> Result<RetrievalOutcome> {
        self.round(state).await?;
        if state.retrieved_docs.is_empty() {
            tracing::info!(query = %state.query, "retrieval found no documents");
            Ok(RetrievalOutcome::Empty)
        } else {
            tracing::info!(
                docs = state.retrieved_docs.len(),
                depth = state.depth,
                "retrieval episode complete"
            );
            Ok(RetrievalOutcome::Found)
        }
    }

    /// One retrieval round. Recursion is boxed; every path through here
    /// either increments `depth` once or returns without recursing, so at
    /// most `max_depth` rounds run per episode.
    fn round<'s>(
        &'s self,
        state: &'s mut SessionState,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 's>> {
        Box::pin(async move {
            // Over-fetch to compensate for the excluded-id filter below.
            let k = self.config.base_k + state.excluded_ids.len();
            let mut candidates = self.store.similarity_search(&state.query, k).await?;

            if self.config.enable_reranking {
                if let Some(reranker) = self.reranker {
                    candidates = reranker.rerank(&state.query, candidates, k).await?;
                }
            }

            candidates.retain(|c| !state.excluded_ids.contains(&c.document.metadata.id));
            candidates.truncate(self.config.base_k);

            if candidates.is_empty() {
                // Nothing new at this level; do not recurse.
                tracing::debug!(depth = state.depth, "retrieval round yielded no new candidates");
                return Ok(());
            }

            for candidate in candidates {
                state.record_document(candidate.document);
            }
            state.depth += 1;

            if state.depth >= self.config.max_depth {
                tracing::debug!("recursion limit reached, returning best-effort results");
                return Ok(());
            }

            let check: SufficiencyCheck = decide(
                self.llm,
                &prompts::sufficiency_prompt(&state.original_query, &state.system_context),
            )
            .await?;

            if check.is_sufficient || check.missing_queries.is_empty() {
                return Ok(());
            }

            tracing::debug!(
                missing = check.missing_queries.len(),
                depth = state.depth,
                "context insufficient, fanning out sub-queries"
            );

            // Composite sub-queries carry the previous query for context.
            let previous_query = state.query.clone();
            for missing in check.missing_queries {
                if state.depth >= self.config.max_depth {
                    break;
                }
                state.query = format!("{missing} (in the context of: {previous_query})");
                optimize_query(self.llm, state, None).await?;
                self.round(state).await?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::state::{Document, DocumentMetadata, ScoredDocument};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scored(id: &str, content: &str, score: f32) -> ScoredDocument {
        ScoredDocument {
            document: Document {
                content: content.to_string(),
                metadata: DocumentMetadata {
                    id: id.to_string(),
                    source: None,
                    jurisdiction: None,
                },
            },
            score,
        }
    }

    /// Always reports the context insufficient with one more missing topic.
    struct InsatiableLlm;

    #[async_trait]
    impl LlmClient for InsatiableLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("retrieval completeness") {
                Ok(r#"{"is_sufficient": false, "missing_queries": ["another missing topic"]}"#
                    .to_string())
            } else {
                // Optimizer calls: echo something stable.
                Ok("optimized sub-query".to_string())
            }
        }
    }

    /// Hands out a fresh batch of unique documents on every call.
    struct EndlessStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VectorStore for EndlessStore {
        async fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..k)
                .map(|i| scored(&format!("doc-{call}-{i}"), "some legal text", 0.9))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_depth_never_exceeds_max_depth() {
        let config = PipelineConfig::default();
        let store = EndlessStore {
            calls: AtomicUsize::new(0),
        };
        let retriever = RecursiveRetriever {
            llm: &InsatiableLlm,
            store: &store,
            reranker: None,
            config: &config,
        };
        let mut state = SessionState::new("q", "summary", None);

        let outcome = retriever.retrieve(&mut state).await.unwrap();
        assert_eq!(outcome, RetrievalOutcome::Found);
        assert!(state.depth <= config.max_depth);
        assert_eq!(state.depth, config.max_depth);
    }

    #[tokio::test]
    async fn test_retrieved_ids_are_pairwise_distinct() {
        let config = PipelineConfig::default();
        let store = EndlessStore {
            calls: AtomicUsize::new(0),
        };
        let retriever = RecursiveRetriever {
            llm: &InsatiableLlm,
            store: &store,
            reranker: None,
            config: &config,
        };
        let mut state = SessionState::new("q", "summary", None);
        retriever.retrieve(&mut state).await.unwrap();

        let mut ids: Vec<&str> = state
            .retrieved_docs
            .iter()
            .map(|d| d.metadata.id.as_str())
            .collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
        assert_eq!(state.excluded_ids.len(), before);
    }

    #[tokio::test]
    async fn test_empty_first_round_does_not_recurse() {
        struct EmptyStore {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl VectorStore for EmptyStore {
            async fn similarity_search(
                &self,
                _query: &str,
                _k: usize,
            ) -> Result<Vec<ScoredDocument>> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            }
        }

        struct UnreachableLlm;

        #[async_trait]
        impl LlmClient for UnreachableLlm {
            async fn generate(&self, _prompt: &str) -> Result<String> {
                Err(PipelineError::Oracle(
                    "sufficiency oracle must not be consulted on empty retrieval".to_string(),
                ))
            }
        }

        let config = PipelineConfig::default();
        let store = EmptyStore {
            calls: AtomicUsize::new(0),
        };
        let retriever = RecursiveRetriever {
            llm: &UnreachableLlm,
            store: &store,
            reranker: None,
            config: &config,
        };
        let mut state = SessionState::new("q", "summary", None);

        let outcome = retriever.retrieve(&mut state).await.unwrap();
        assert_eq!(outcome, RetrievalOutcome::Empty);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.depth, 0);
    }

    #[tokio::test]
    async fn test_over_fetch_grows_with_excluded_ids() {
        struct KRecorder {
            ks: std::sync::Mutex<Vec<usize>>,
        }

        #[async_trait]
        impl VectorStore for KRecorder {
            async fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
                self.ks.lock().unwrap().push(k);
                Ok((0..3).map(|i| scored(&format!("doc-{k}-{i}"), "text", 0.5)).collect())
            }
        }

        let config = PipelineConfig::default();
        let store = KRecorder {
            ks: std::sync::Mutex::new(Vec::new()),
        };
        let retriever = RecursiveRetriever {
            llm: &InsatiableLlm,
            store: &store,
            reranker: None,
            config: &config,
        };
        let mut state = SessionState::new("q", "summary", None);
        retriever.retrieve(&mut state).await.unwrap();

        let ks = store.ks.lock().unwrap();
        // First round asks for base_k; later rounds over-fetch by the number
        // of ids already excluded.
        assert_eq!(ks[0], 3);
        assert!(ks.windows(2).all(|w| w[1] > w[0]));
    }

    #[tokio::test]
    async fn test_optimizer_leaves_query_unchanged_when_oracle_echoes() {
        struct EchoLlm;

        #[async_trait]
        impl LlmClient for EchoLlm {
            async fn generate(&self, _prompt: &str) -> Result<String> {
                Ok("Singapore employment law: termination notice period".to_string())
            }
        }

        let mut state =
            SessionState::new("Singapore employment law: termination notice period", "s", None);
        optimize_query(&EchoLlm, &mut state, None).await.unwrap();
        let first = state.query.clone();
        optimize_query(&EchoLlm, &mut state, None).await.unwrap();
        assert_eq!(state.query, first);
    }
}
