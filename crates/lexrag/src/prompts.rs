//! Prompt builders for every oracle call, plus the canned terminal
//! responses. Structured calls state their JSON contract inline; the typed
//! decode lives next to the node that issues the call.

use crate::state::SessionState;

/// Returned verbatim when the complexity scorer rules the query outside the
/// knowledge base.
pub const OUT_OF_SCOPE_RESPONSE: &str = "This question falls outside the scope of the legal \
     knowledge base I have access to, so I cannot provide a reliable answer. Please consult a \
     qualified legal professional for matters beyond my coverage.";

/// Returned verbatim when retrieval finds nothing at all.
pub const NO_DOCUMENTS_RESPONSE: &str =
    "No relevant legal documents were found in the knowledge base for this query.";

pub fn intent_prompt(query: &str) -> String {
    format!(
        r#"You are a precise legal AI assistant. Identify the intent behind the user's query.

Rules:
- "qa": the user asks a question and expects an answer.
- "summarise": the user wants a document or text summarised. If the query mentions handling a document (uploading, reviewing, summarising it), the intent must include "summarise".
- "qa+summarise": both at once.

Answer with a JSON object only:
{{"intent_type": "qa" | "summarise" | "qa+summarise", "intent": "one-sentence explanation"}}

User query:
"{query}""#
    )
}

pub fn summarise_prompt(intent: &str, user_context: &str) -> String {
    format!(
        r#"You are a legal AI assistant. Produce a concise and informative summary of the user's uploaded context, keeping every fact that matters for the stated intent and dropping repetition. Be clear, professional, and accurate.

Intent:
{intent}

User context:
{user_context}

Summary:"#
    )
}

pub fn complexity_prompt(state: &SessionState) -> String {
    let user_context = match &state.user_context {
        Some(ctx) => format!("\nUploaded context from the user:\n{ctx}\n"),
        None => String::new(),
    };
    format!(
        r#"You are evaluating a legal query against a knowledge base. Rank the complexity of the query using only the knowledge-base summary below.

- LOW: answerable without retrieval, from reasoning or the uploaded context alone.
- MEDIUM: the knowledge base must be searched to answer.
- UNRELATED: the query is outside the domain the knowledge base covers.

Knowledge-base summary:
{summary}
{user_context}
User query:
{query}

Answer with a JSON object only:
{{"complexity": "LOW" | "MEDIUM" | "UNRELATED"}}"#,
        summary = state.vectorstore_summary,
        query = state.query,
    )
}

pub fn optimize_prompt(query: &str, intent: &str, failure_reasons: Option<&str>) -> String {
    let feedback = match failure_reasons {
        Some(reasons) => format!(
            "\nThe previous answer was rejected for these reasons; steer the rewrite away from them:\n{reasons}\n"
        ),
        None => String::new(),
    };
    format!(
        r#"You optimize queries for similarity-based vector retrieval. Rewrite the query for vector retrieval: keyword-dense, jurisdiction-qualified, unambiguous, aligned with how legal documents are indexed. Keep key legal terms, statutes, and case names; drop filler.

Intent: {intent}
{feedback}
User query:
{query}

Reply with the rewritten query only."#
    )
}

pub fn sufficiency_prompt(original_query: &str, system_context: &str) -> String {
    format!(
        r#"You are checking retrieval completeness. Given the user's question and everything retrieved so far, decide whether the retrieved context is sufficient to answer the question fully. If not, list short retrieval queries for the missing topics (cited sections whose text is absent, referenced statutes, undefined terms).

Question:
{original_query}

Retrieved context:
{system_context}

Answer with a JSON object only:
{{"is_sufficient": true | false, "missing_queries": ["..."]}}"#
    )
}

pub fn response_prompt(state: &SessionState, jurisdiction: &str) -> String {
    let user_context = match &state.user_context {
        Some(ctx) => format!("\nUser-uploaded context:\n{ctx}\n"),
        None => String::new(),
    };
    let system_context = if state.system_context.is_empty() {
        String::new()
    } else {
        format!("\nRetrieved legal context:\n{}\n", state.system_context)
    };
    format!(
        r#"You are a highly skilled legal expert specializing in {jurisdiction} law. Using only the context below, provide a well-structured legal response to the user's query. Cite specific clauses, cases, or acts where possible. If the context does not cover something, say so explicitly instead of inventing it.

Intent: {intent}
{system_context}{user_context}
User query:
{query}

Format your answer as:
- **Legal Basis**: [specific clauses or laws]
- **Analysis**: [how the law applies]
- **Conclusion**: [the legal standing]"#,
        intent = state.intent,
        query = state.original_query,
    )
}

pub fn hallucination_prompt(state: &SessionState) -> String {
    let response = state.response.as_deref().unwrap_or_default();
    let system_context = if state.system_context.is_empty() {
        String::new()
    } else {
        format!("\nRetrieved legal context:\n{}\n", state.system_context)
    };
    let user_context = match &state.user_context {
        Some(ctx) => format!("\nUser-uploaded context:\n{ctx}\n"),
        None => String::new(),
    };
    format!(
        r#"You are an expert AI fact checker with legal domain expertise. Cross-check every claim in the statement against the provided contexts only; do not use outside knowledge. A claim not directly supported by the context counts as hallucinated.
{system_context}{user_context}
Statement to verify:
{response}

Answer with a JSON object only:
{{"hallucination": true | false, "reason": "one sentence"}}"#
    )
}

pub fn quality_prompt(state: &SessionState) -> String {
    let response = state.response.as_deref().unwrap_or_default();
    format!(
        r#"You are an expert AI legal evaluator grading the quality of an AI-generated legal response. Grade it on three criteria:
- relevance: does it fully address the user's query?
- coherence: is it logically structured and easy to follow?
- completeness: does it provide enough detail to be useful?

User query:
{query}

User intent:
{intent}

Generated response:
{response}

Answer with a JSON object only:
{{"relevance": true | false, "coherence": true | false, "completeness": true | false, "reason": "one sentence"}}"#,
        query = state.original_query,
        intent = state.intent,
    )
}

pub fn compliance_prompt(response: &str, jurisdiction: &str) -> String {
    format!(
        r#"You are an expert AI legal compliance evaluator specializing in {jurisdiction} law. Determine whether the response below is legally valid within {jurisdiction}'s legal framework and free of bias or discriminatory content. Flag misleading, outdated, or jurisdictionally incorrect statements.

AI-generated response:
{response}

Answer with a JSON object only:
{{"compliance": true | false, "reason": "one sentence"}}"#
    )
}
