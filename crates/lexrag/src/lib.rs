//! lexrag: a self-correcting retrieval pipeline for a legal assistant.
//!
//! Given a user question (optionally with uploaded-document text), the
//! pipeline classifies intent, scores how much retrieval the question
//! needs, performs bounded-depth recursive retrieval against a vector
//! store, drafts an answer, and grades that answer for hallucination,
//! quality, and jurisdictional compliance, looping back to retrieval when
//! a grade fails, within hard retry and depth bounds.
//!
//! The vector store, reranker, document extractor, and LLM are external
//! collaborators behind traits; see `store`, `extract`, and `oracle`.

pub mod config;
pub mod error;
pub mod extract;
pub mod graph;
pub mod nodes;
pub mod oracle;
pub mod prompts;
pub mod state;
pub mod store;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use graph::{wants_download, Answer, Pipeline};
pub use oracle::{decide, LlmClient, OpenAiClient};
pub use state::{
    Complexity, Document, DocumentMetadata, IntentType, ScoredDocument, SessionState,
};
pub use store::{Reranker, VectorStore};
