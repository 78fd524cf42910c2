//! The orchestration graph.
//!
//! An explicit finite-state machine over the pipeline nodes: intent →
//! (summarise) → complexity → branch → retrieval → response → three graders
//! in sequence. A failing grade routes back to the retrieval-prompt
//! optimizer carrying the failure reason; a shared retry counter bounds
//! those feedback edges, and the recursion depth bounds each retrieval
//! episode, so every session terminates.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::nodes::grader::{grade_compliance, grade_hallucination, grade_quality};
use crate::nodes::intent::classify_intent;
use crate::nodes::respond::construct_response;
use crate::nodes::retrieval::{optimize_query, RecursiveRetriever, RetrievalOutcome};
use crate::nodes::scoring::score_complexity;
use crate::nodes::summarise::summarise_context;
use crate::oracle::LlmClient;
use crate::prompts::{NO_DOCUMENTS_RESPONSE, OUT_OF_SCOPE_RESPONSE};
use crate::state::{Complexity, SessionState};
use crate::store::{Reranker, VectorStore};

static DOWNLOAD_KEYWORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(generate|create|draft|write|document|contract)\b")
        .expect("download keyword regex is valid")
});

/// Fixed keyword heuristic, not LLM-driven: does the query ask for a
/// downloadable artifact?
pub fn wants_download(query: &str) -> bool {
    DOWNLOAD_KEYWORDS_RE.is_match(query)
}

/// What the caller gets back.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub content: String,
    pub wants_download: bool,
}

/// Named states of the control graph. Transitions are decided in
/// `run_session`; each state maps to exactly one node call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ClassifyIntent,
    Summarise,
    ScoreComplexity,
    OptimizeQuery,
    Retrieve,
    Respond,
    GradeHallucination,
    GradeQuality,
    GradeCompliance,
}

pub struct Pipeline {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn VectorStore>,
    reranker: Option<Arc<dyn Reranker>>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn VectorStore>,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate().map_err(PipelineError::InvalidConfig)?;
        Ok(Self {
            llm,
            store,
            reranker: None,
            config,
        })
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Caller-facing entry point. Oracle failures never panic the caller:
    /// schema violations and timeouts come back as visible error answers.
    pub async fn answer(
        &self,
        query: &str,
        vectorstore_summary: &str,
        user_context: Option<String>,
    ) -> Answer {
        let wants_download = wants_download(query);
        let mut state = SessionState::new(query, vectorstore_summary, user_context);

        match self.run_session(&mut state).await {
            Ok(content) => Answer {
                content,
                wants_download,
            },
            Err(PipelineError::SchemaViolation { detail }) => {
                tracing::error!(%detail, "session ended on schema violation");
                Answer {
                    content: format!(
                        "I could not complete this request: the assistant produced an \
                         ill-formed decision ({detail}). Please rephrase and try again."
                    ),
                    wants_download: false,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "session ended on oracle failure");
                Answer {
                    content: format!("I could not complete this request: {e}."),
                    wants_download: false,
                }
            }
        }
    }

    /// Walk the state machine to a terminal response.
    async fn run_session(&self, state: &mut SessionState) -> Result<String> {
        let llm = self.llm.as_ref();
        let mut stage = Stage::ClassifyIntent;

        loop {
            tracing::debug!(?stage, depth = state.depth, retries = state.grading_retries, "entering stage");
            stage = match stage {
                Stage::ClassifyIntent => {
                    classify_intent(llm, state).await?;
                    if state.intent_type.includes_summarise() && state.user_context.is_some() {
                        Stage::Summarise
                    } else {
                        Stage::ScoreComplexity
                    }
                }
                Stage::Summarise => {
                    summarise_context(llm, state).await?;
                    Stage::ScoreComplexity
                }
                Stage::ScoreComplexity => {
                    let complexity = score_complexity(llm, state).await?;
                    state.complexity = Some(complexity);
                    match complexity {
                        Complexity::Low => Stage::Respond,
                        Complexity::Medium => Stage::OptimizeQuery,
                        Complexity::Unrelated => {
                            tracing::info!("query ruled out of scope, no retrieval performed");
                            return Ok(OUT_OF_SCOPE_RESPONSE.to_string());
                        }
                    }
                }
                Stage::OptimizeQuery => {
                    let failure_reasons = state.failed_grade_reasons();
                    optimize_query(llm, state, failure_reasons.as_deref()).await?;
                    Stage::Retrieve
                }
                Stage::Retrieve => {
                    // Each retrieval episode gets the full depth budget;
                    // excluded_ids persist so retries never re-fetch.
                    state.depth = 0;
                    let retriever = RecursiveRetriever {
                        llm,
                        store: self.store.as_ref(),
                        reranker: self.reranker.as_deref(),
                        config: &self.config,
                    };
                    match retriever.retrieve(state).await? {
                        RetrievalOutcome::Empty => {
                            return Ok(NO_DOCUMENTS_RESPONSE.to_string());
                        }
                        RetrievalOutcome::Found => Stage::Respond,
                    }
                }
                Stage::Respond => {
                    construct_response(llm, state, &self.config.jurisdiction).await?;
                    Stage::GradeHallucination
                }
                Stage::GradeHallucination => {
                    grade_hallucination(llm, state).await?;
                    if state.hallucination == Some(true) {
                        match self.next_after_failed_grade(state, "hallucination") {
                            Some(next) => next,
                            None => return Ok(self.best_effort(state)),
                        }
                    } else {
                        Stage::GradeQuality
                    }
                }
                Stage::GradeQuality => {
                    grade_quality(llm, state).await?;
                    if state.quality == Some(false) {
                        match self.next_after_failed_grade(state, "quality") {
                            Some(next) => next,
                            None => return Ok(self.best_effort(state)),
                        }
                    } else {
                        Stage::GradeCompliance
                    }
                }
                Stage::GradeCompliance => {
                    grade_compliance(llm, state, &self.config.jurisdiction).await?;
                    if state.compliance == Some(false) {
                        match self.next_after_failed_grade(state, "compliance") {
                            Some(next) => next,
                            None => return Ok(self.best_effort(state)),
                        }
                    } else {
                        tracing::info!(
                            retries = state.grading_retries,
                            docs = state.retrieved_docs.len(),
                            "all grades passed"
                        );
                        return Ok(state
                            .response
                            .clone()
                            .unwrap_or_else(|| NO_DOCUMENTS_RESPONSE.to_string()));
                    }
                }
            };
        }
    }

    /// Take a grading feedback edge, or report that the retry budget is
    /// spent (None means: return the current draft best-effort).
    fn next_after_failed_grade(&self, state: &mut SessionState, grade: &str) -> Option<Stage> {
        state.grading_retries += 1;
        if state.grading_retries > self.config.max_grading_retries {
            tracing::warn!(
                grade,
                retries = state.grading_retries - 1,
                "grading retry cap reached, returning best-effort draft"
            );
            None
        } else {
            tracing::info!(grade, retry = state.grading_retries, "grade failed, re-entering retrieval");
            Some(Stage::OptimizeQuery)
        }
    }

    fn best_effort(&self, state: &SessionState) -> String {
        state
            .response
            .clone()
            .unwrap_or_else(|| NO_DOCUMENTS_RESPONSE.to_string())
    }
}
