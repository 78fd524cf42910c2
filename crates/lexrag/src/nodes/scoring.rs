//! Complexity scoring.
//!
//! Ranks the query against the knowledge-base summary into LOW, MEDIUM, or
//! UNRELATED. This label is the sole routing signal for the next graph
//! edge, so the decode is strict: an unrecognized label is a schema
//! violation, never a silently-accepted default.

use serde::Deserialize;

use crate::error::Result;
use crate::oracle::{decide, LlmClient};
use crate::prompts;
use crate::state::{Complexity, SessionState};

#[derive(Debug, Deserialize)]
struct ComplexityRank {
    complexity: Complexity,
}

pub async fn score_complexity(llm: &dyn LlmClient, state: &SessionState) -> Result<Complexity> {
    let prompt = prompts::complexity_prompt(state);
    let rank: ComplexityRank = decide(llm, &prompt).await?;
    tracing::debug!(complexity = ?rank.complexity, "query complexity scored");
    Ok(rank.complexity)
}
