//! Uploaded-document extraction seam.
//!
//! Real parsing (PDF, DOCX) lives in the extraction collaborator; the
//! pipeline only needs `raw bytes -> text`. A plain-text implementation is
//! provided for callers that already hold UTF-8 content.

use crate::error::{PipelineError, Result};

pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, raw: &[u8]) -> Result<String>;
}

/// Pass-through extractor for plain-text uploads.
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, raw: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| PipelineError::Extraction(format!("upload is not valid UTF-8: {e}")))?;
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        let text = PlainTextExtractor
            .extract("Clause 4: termination requires 30 days notice.".as_bytes())
            .unwrap();
        assert!(text.contains("30 days"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = PlainTextExtractor.extract(&[0xff, 0xfe, 0x01]).unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));
    }
}
