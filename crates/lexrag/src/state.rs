//! Session state threaded through every pipeline node.
//!
//! One `SessionState` is created per user query, mutated step by step as the
//! orchestrator walks the graph, and discarded once the final answer crosses
//! back to the caller. Nothing here is shared across sessions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A retrieved legal document. Identity is `metadata.id`; the exclusion
/// logic in the recursive retriever depends on ids being unique and stable
/// across calls to the vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

/// A document paired with the relevance score the store (or reranker)
/// assigned to it. Ordering within one result set is the store's own.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// What the user is asking the assistant to do. Multi-label in spirit
/// ("summarise this contract and tell me if clause 4 is enforceable"),
/// closed to three variants so downstream routing stays single-dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentType {
    #[serde(rename = "qa")]
    Qa,
    #[serde(rename = "summarise")]
    Summarise,
    #[serde(rename = "qa+summarise")]
    QaSummarise,
}

impl IntentType {
    pub fn includes_summarise(self) -> bool {
        matches!(self, Self::Summarise | Self::QaSummarise)
    }

    pub fn includes_qa(self) -> bool {
        matches!(self, Self::Qa | Self::QaSummarise)
    }
}

/// How much external retrieval the query needs. This is the sole routing
/// signal after scoring; an unrecognized label is a schema violation, never
/// a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Complexity {
    /// Answerable from reasoning or uploaded context alone.
    Low,
    /// Vector-store retrieval is required.
    Medium,
    /// Outside the knowledge domain covered by the store.
    Unrelated,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    /// Current (possibly rewritten) question. Mutated by the prompt
    /// optimizer and by sub-query generation.
    pub query: String,
    /// Immutable copy of the user's question, kept for final-answer
    /// grounding while `query` mutates.
    pub original_query: String,
    /// One-line natural-language description of vector-store coverage.
    pub vectorstore_summary: String,
    /// Extracted (and possibly summarised) uploaded-document text.
    pub user_context: Option<String>,
    /// Concatenated retrieved-document contents, accumulated across rounds.
    pub system_context: String,
    pub intent_type: IntentType,
    pub intent: String,
    pub complexity: Option<Complexity>,
    /// Documents found so far this session, in retrieval order.
    pub retrieved_docs: Vec<Document>,
    /// Ids of documents already retrieved; grows monotonically and is never
    /// cleared, so recursive rounds never re-fetch the same document.
    pub excluded_ids: HashSet<String>,
    /// Retrieval rounds performed in the current retrieval episode.
    /// Invariant: 0 <= depth <= config.max_depth.
    pub depth: usize,
    /// Grading feedback edges taken so far, shared across all three graders.
    pub grading_retries: usize,
    /// Current draft answer.
    pub response: Option<String>,
    pub hallucination: Option<bool>,
    pub hallucination_reason: String,
    pub quality: Option<bool>,
    pub quality_reason: String,
    pub compliance: Option<bool>,
    pub compliance_reason: String,
}

impl SessionState {
    pub fn new(
        query: impl Into<String>,
        vectorstore_summary: impl Into<String>,
        user_context: Option<String>,
    ) -> Self {
        let query = query.into();
        Self {
            original_query: query.clone(),
            query,
            vectorstore_summary: vectorstore_summary.into(),
            user_context,
            system_context: String::new(),
            intent_type: IntentType::Qa,
            intent: String::new(),
            complexity: None,
            retrieved_docs: Vec::new(),
            excluded_ids: HashSet::new(),
            depth: 0,
            grading_retries: 0,
            response: None,
            hallucination: None,
            hallucination_reason: String::new(),
            quality: None,
            quality_reason: String::new(),
            compliance: None,
            compliance_reason: String::new(),
        }
    }

    /// Record a newly retrieved document: mark its id as seen, keep the
    /// document, and fold its content into the accumulated context.
    /// Returns false if the id was already recorded (the document is dropped).
    pub fn record_document(&mut self, document: Document) -> bool {
        if !self.excluded_ids.insert(document.metadata.id.clone()) {
            return false;
        }
        if !self.system_context.is_empty() {
            self.system_context.push_str("\n\n");
        }
        self.system_context.push_str(&document.content);
        self.retrieved_docs.push(document);
        true
    }

    /// Reasons from grades that failed on the current draft, for steering
    /// the next retrieval-prompt rewrite. None if nothing has failed.
    pub fn failed_grade_reasons(&self) -> Option<String> {
        let mut reasons = Vec::new();
        if self.hallucination == Some(true) {
            reasons.push(format!("hallucination: {}", self.hallucination_reason));
        }
        if self.quality == Some(false) {
            reasons.push(format!("quality: {}", self.quality_reason));
        }
        if self.compliance == Some(false) {
            reasons.push(format!("compliance: {}", self.compliance_reason));
        }
        if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, content: &str) -> Document {
        Document {
            content: content.to_string(),
            metadata: DocumentMetadata {
                id: id.to_string(),
                source: None,
                jurisdiction: None,
            },
        }
    }

    #[test]
    fn test_record_document_deduplicates_by_id() {
        let mut state = SessionState::new("q", "summary", None);
        assert!(state.record_document(doc("a", "first")));
        assert!(!state.record_document(doc("a", "duplicate")));
        assert_eq!(state.retrieved_docs.len(), 1);
        assert_eq!(state.system_context, "first");
    }

    #[test]
    fn test_excluded_ids_only_grow() {
        let mut state = SessionState::new("q", "summary", None);
        state.record_document(doc("a", "first"));
        state.record_document(doc("b", "second"));
        assert_eq!(state.excluded_ids.len(), 2);
        assert!(state.system_context.contains("first"));
        assert!(state.system_context.contains("second"));
    }

    #[test]
    fn test_original_query_preserved() {
        let mut state = SessionState::new("what is the notice period", "summary", None);
        state.query = "Singapore employment law notice period statute".to_string();
        assert_eq!(state.original_query, "what is the notice period");
    }

    #[test]
    fn test_failed_grade_reasons_collects_only_failures() {
        let mut state = SessionState::new("q", "summary", None);
        assert!(state.failed_grade_reasons().is_none());

        state.hallucination = Some(false);
        state.quality = Some(false);
        state.quality_reason = "answer is incomplete".to_string();
        let reasons = state.failed_grade_reasons().unwrap();
        assert!(reasons.contains("quality: answer is incomplete"));
        assert!(!reasons.contains("hallucination"));
    }

    #[test]
    fn test_complexity_labels_decode_strictly() {
        assert_eq!(
            serde_json::from_str::<Complexity>("\"LOW\"").unwrap(),
            Complexity::Low
        );
        assert_eq!(
            serde_json::from_str::<Complexity>("\"UNRELATED\"").unwrap(),
            Complexity::Unrelated
        );
        assert!(serde_json::from_str::<Complexity>("\"HIGHEST\"").is_err());
    }
}
