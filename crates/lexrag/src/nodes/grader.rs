//! Response graders: hallucination, quality, and jurisdictional compliance.
//!
//! Each grader is a pure check of `(response, supporting context)` that
//! writes a boolean verdict plus a reason into the session state. The
//! orchestrator routes on those verdicts; the graders themselves never
//! branch.

use serde::Deserialize;

use crate::error::Result;
use crate::oracle::{decide, LlmClient};
use crate::prompts;
use crate::state::SessionState;

#[derive(Debug, Deserialize)]
struct HallucinationGrade {
    /// True means the response contains claims not traceable to context,
    /// which is a failing grade.
    hallucination: bool,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct QualityGrade {
    relevance: bool,
    coherence: bool,
    completeness: bool,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct ComplianceGrade {
    /// True means the response is jurisdictionally valid and free of bias,
    /// which is a passing grade.
    compliance: bool,
    reason: String,
}

pub async fn grade_hallucination(llm: &dyn LlmClient, state: &mut SessionState) -> Result<()> {
    let grade: HallucinationGrade = decide(llm, &prompts::hallucination_prompt(state)).await?;
    tracing::debug!(hallucination = grade.hallucination, reason = %grade.reason, "hallucination graded");
    state.hallucination = Some(grade.hallucination);
    state.hallucination_reason = grade.reason;
    Ok(())
}

pub async fn grade_quality(llm: &dyn LlmClient, state: &mut SessionState) -> Result<()> {
    let grade: QualityGrade = decide(llm, &prompts::quality_prompt(state)).await?;
    // Quality holds only when all three sub-criteria hold.
    let quality = grade.relevance && grade.coherence && grade.completeness;
    tracing::debug!(
        relevance = grade.relevance,
        coherence = grade.coherence,
        completeness = grade.completeness,
        "quality graded"
    );
    state.quality = Some(quality);
    state.quality_reason = grade.reason;
    Ok(())
}

pub async fn grade_compliance(
    llm: &dyn LlmClient,
    state: &mut SessionState,
    jurisdiction: &str,
) -> Result<()> {
    let response = state.response.as_deref().unwrap_or_default();
    let grade: ComplianceGrade =
        decide(llm, &prompts::compliance_prompt(response, jurisdiction)).await?;
    tracing::debug!(compliance = grade.compliance, reason = %grade.reason, "compliance graded");
    state.compliance = Some(grade.compliance);
    state.compliance_reason = grade.reason;
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

    fn drafted_state() -> SessionState {
        let mut state = SessionState::new("q", "summary", None);
        state.response = Some("- **Legal Basis**: Employment Act s. 10".to_string());
        state
    }

    #[tokio::test]
    async fn test_hallucination_verdict_recorded() {
        let llm = CannedLlm(
            r#"{"hallucination": true, "reason": "cites a case absent from context"}"#.to_string(),
        );
        let mut state = drafted_state();
        grade_hallucination(&llm, &mut state).await.unwrap();
        assert_eq!(state.hallucination, Some(true));
        assert!(state.hallucination_reason.contains("absent"));
    }

    #[tokio::test]
    async fn test_quality_requires_all_three_criteria() {
        let llm = CannedLlm(
            r#"{"relevance": true, "coherence": true, "completeness": false, "reason": "no conclusion"}"#
                .to_string(),
        );
        let mut state = drafted_state();
        grade_quality(&llm, &mut state).await.unwrap();
        assert_eq!(state.quality, Some(false));

        let llm = CannedLlm(
            r#"{"relevance": true, "coherence": true, "completeness": true, "reason": "solid"}"#
                .to_string(),
        );
        grade_quality(&llm, &mut state).await.unwrap();
        assert_eq!(state.quality, Some(true));
    }

    #[tokio::test]
    async fn test_compliance_verdict_recorded() {
        let llm = CannedLlm(
            r#"{"compliance": false, "reason": "cites UK precedent inapplicable in Singapore"}"#
                .to_string(),
        );
        let mut state = drafted_state();
        grade_compliance(&llm, &mut state, "Singapore").await.unwrap();
        assert_eq!(state.compliance, Some(false));
    }
}
