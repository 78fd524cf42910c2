//! Pipeline nodes. Each node mutates the session state and returns; the
//! orchestrator in `graph` decides which node runs next.

pub mod grader;
pub mod intent;
pub mod respond;
pub mod retrieval;
pub mod scoring;
pub mod summarise;
