//! Pipeline configuration and validation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Hard bound on retrieval rounds per retrieval episode.
    pub max_depth: usize,
    /// Bound on grading-feedback edges (shared across all three graders);
    /// at the cap the current draft is returned best-effort.
    pub max_grading_retries: usize,
    /// Documents kept per retrieval round. The store is asked for
    /// `base_k + |excluded_ids|` candidates to compensate for filtering.
    pub base_k: usize,
    /// Jurisdiction the compliance grader checks responses against.
    pub jurisdiction: String,
    /// Pass retrieval candidates through the configured reranker.
    pub enable_reranking: bool,
    /// Request timeout for oracle round-trips, in seconds.
    pub oracle_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_grading_retries: 3,
            base_k: 3,
            jurisdiction: "Singapore".to_string(),
            enable_reranking: false,
            oracle_timeout_secs: 60,
        }
    }
}

impl PipelineConfig {
    /// Validate config values, returning errors for clearly broken
    /// configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be > 0".into());
        }
        if self.base_k == 0 {
            return Err("base_k must be > 0".into());
        }
        if self.jurisdiction.trim().is_empty() {
            return Err("jurisdiction must not be empty".into());
        }
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert_eq!(PipelineConfig::default().max_depth, 3);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let config = PipelineConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_jurisdiction_rejected() {
        let config = PipelineConfig {
            jurisdiction: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
