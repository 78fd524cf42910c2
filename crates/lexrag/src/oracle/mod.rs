//! Decision oracle seam.
//!
//! Every LLM call in the pipeline goes through `LlmClient`. Free-text calls
//! use `generate` directly; structured decisions go through `decide`, which
//! coerces the model's JSON into a serde type and fails with
//! `SchemaViolation` when the output cannot be parsed. Tests script the
//! oracle with fakes; production wires up the OpenAI-compatible client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{PipelineError, Result};

pub mod openai;

pub use openai::OpenAiClient;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Ask the oracle for a typed decision.
///
/// The model is expected to answer with a JSON object; markdown fences and
/// surrounding prose are tolerated, anything that does not decode into `T`
/// is a `SchemaViolation`.
pub async fn decide<T: DeserializeOwned>(llm: &dyn LlmClient, prompt: &str) -> Result<T> {
    let raw = llm.generate(prompt).await?;
    let json = extract_json_object(&raw);
    serde_json::from_str(json).map_err(|e| {
        let preview: String = raw.chars().take(200).collect();
        PipelineError::schema(format!("{e}; oracle said: {preview}"))
    })
}

/// Slice out the outermost JSON object from a model reply, tolerating code
/// fences and explanatory text around it.
fn extract_json_object(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw.trim(),
    }
}
