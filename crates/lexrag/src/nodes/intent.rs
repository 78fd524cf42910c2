//! Intent classification.
//!
//! Tags the query as question-answering, summarisation, or both. The
//! contract is multi-label but closed: any query that mentions handling a
//! document must carry the summarise tag. An ill-typed oracle reply is not
//! fatal; classification falls back to plain question-answering.

use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::oracle::{decide, LlmClient};
use crate::prompts;
use crate::state::{IntentType, SessionState};

#[derive(Debug, Deserialize)]
struct IntentDecision {
    intent_type: IntentType,
    intent: String,
}

pub async fn classify_intent(llm: &dyn LlmClient, state: &mut SessionState) -> Result<()> {
    let prompt = prompts::intent_prompt(&state.query);
    match decide::<IntentDecision>(llm, &prompt).await {
        Ok(decision) => {
            tracing::debug!(intent_type = ?decision.intent_type, "intent classified");
            state.intent_type = decision.intent_type;
            state.intent = decision.intent;
        }
        Err(PipelineError::SchemaViolation { detail }) => {
            tracing::warn!(%detail, "intent classification ill-typed, defaulting to qa");
            state.intent_type = IntentType::Qa;
            state.intent = "The user is asking a direct question (fallback classification)."
                .to_string();
        }
        Err(e) => return Err(e),
    }
    Ok(())
}
