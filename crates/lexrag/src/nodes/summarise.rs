//! Uploaded-context summarisation.
//!
//! Condenses the user's uploaded document in service of the detected
//! intent, replacing `user_context` in place. Only runs when the intent
//! includes summarisation and context is actually present.

use crate::error::Result;
use crate::oracle::LlmClient;
use crate::prompts;
use crate::state::SessionState;

pub async fn summarise_context(llm: &dyn LlmClient, state: &mut SessionState) -> Result<()> {
    let Some(user_context) = state.user_context.as_deref() else {
        return Ok(());
    };
    let prompt = prompts::summarise_prompt(&state.intent, user_context);
    let summary = llm.generate(&prompt).await?;
    tracing::debug!(
        before = user_context.len(),
        after = summary.len(),
        "uploaded context summarised"
    );
    state.user_context = Some(summary.trim().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedLlm(String);

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_replaces_user_context() {
        let llm = CannedLlm("The contract runs for two years.".to_string());
        let mut state = SessionState::new(
            "summarise this",
            "s",
            Some("very long contract text ...".to_string()),
        );
        summarise_context(&llm, &mut state).await.unwrap();
        assert_eq!(
            state.user_context.as_deref(),
            Some("The contract runs for two years.")
        );
    }

    #[tokio::test]
    async fn test_noop_without_context() {
        let llm = CannedLlm("should never be used".to_string());
        let mut state = SessionState::new("summarise this", "s", None);
        summarise_context(&llm, &mut state).await.unwrap();
        assert!(state.user_context.is_none());
    }
}
