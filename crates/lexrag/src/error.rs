//! Error taxonomy for the pipeline.
//!
//! Failures are typed so the orchestrator can pick the right terminal
//! behaviour: schema violations become visible error messages in the final
//! answer, timeouts end the session, and empty retrieval is recovered
//! locally with a canned reply rather than propagated.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The decision oracle produced output that cannot be coerced into the
    /// expected schema. Never retried automatically.
    #[error("oracle output did not match the expected schema: {detail}")]
    SchemaViolation { detail: String },

    /// The oracle did not answer in time. Fatal for the current session.
    #[error("oracle call timed out")]
    OracleTimeout,

    /// Any other oracle transport failure (connection refused, bad status,
    /// malformed response envelope).
    #[error("oracle transport failure: {0}")]
    Oracle(String),

    /// The vector store collaborator failed.
    #[error("vector store failure: {0}")]
    Store(String),

    /// Uploaded document bytes could not be turned into text.
    #[error("document extraction failure: {0}")]
    Extraction(String),

    /// The pipeline was constructed with a broken configuration.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    pub fn schema(detail: impl Into<String>) -> Self {
        Self::SchemaViolation {
            detail: detail.into(),
        }
    }
}
