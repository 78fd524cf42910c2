//! Response construction.
//!
//! Synthesizes the draft answer from the retrieved context, the uploaded
//! context, and the original query. The prompt mandates the Legal Basis /
//! Analysis / Conclusion structure and tells the model to flag missing
//! information instead of inventing it; the hallucination grader holds it
//! to that.

use crate::error::Result;
use crate::oracle::LlmClient;
use crate::prompts;
use crate::state::SessionState;

pub async fn construct_response(
    llm: &dyn LlmClient,
    state: &mut SessionState,
    jurisdiction: &str,
) -> Result<()> {
    let prompt = prompts::response_prompt(state, jurisdiction);
    let draft = llm.generate(&prompt).await?;
    tracing::debug!(chars = draft.len(), "draft response constructed");
    state.response = Some(draft.trim().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingLlm {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_response_grounds_on_original_query() {
        let llm = RecordingLlm {
            reply: "- **Legal Basis**: Employment Act s. 10".to_string(),
            prompts: Mutex::new(Vec::new()),
        };
        let mut state = SessionState::new("what is the minimum notice period", "s", None);
        // The retrieval optimizer has mutated the working query.
        state.query = "Singapore Employment Act termination notice statute".to_string();
        state.system_context = "Employment Act s. 10: notice periods ...".to_string();

        construct_response(&llm, &mut state, "Singapore").await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("what is the minimum notice period"));
        assert!(state.response.as_deref().unwrap().contains("Legal Basis"));
    }
}
