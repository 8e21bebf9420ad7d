//! Error types for the pdf-questions library.
//!
//! A single fatal error type, [`QuestionsError`], covers every stage of the
//! pipeline. How a caller sees it depends on the stage that failed:
//!
//! * **Download / Extract** failures are returned as `Err(QuestionsError)`
//!   from [`crate::Pipeline::run`]; the run cannot continue without text.
//!
//! * **Synthesize** failures are caught by the runner and folded into the
//!   terminal [`crate::output::PipelineResult`] as `success: false`. The
//!   error's display string is kept in `PipelineResult::error`.
//!
//! Callers therefore check both the `Result` and the `success` flag.

use crate::output::Stage;
use thiserror::Error;

/// All errors produced by the pdf-questions library.
#[derive(Debug, Error)]
pub enum QuestionsError {
    // ── Download errors ───────────────────────────────────────────────────
    /// The PDF source is empty or not an http/https URL.
    #[error("Invalid PDF URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The GET request failed or returned a non-2xx status.
    #[error("Failed to download PDF from '{url}': {reason}")]
    DownloadFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The bytes are not a well-formed PDF document.
    #[error("Invalid PDF input: {reason}")]
    InvalidInput { reason: String },

    /// OCR ran but produced only whitespace.
    #[error("No text could be extracted from the provided PDF")]
    EmptyExtraction,

    /// The OCR collaborator failed on a page.
    #[error("Text extraction failed on page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Synthesis errors ──────────────────────────────────────────────────
    /// The model's response was too short to contain questions.
    #[error("Generated text is too short ({len} chars, need more than {min})")]
    GenerationTooShort { len: usize, min: usize },

    /// The LLM API returned an error, either up front or mid-stream.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── Setup errors ──────────────────────────────────────────────────────
    /// No provider was injected for a stage that needs one.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuestionsError {
    /// The pipeline stage this error belongs to, if any.
    ///
    /// Configuration and internal errors are not tied to a stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            QuestionsError::InvalidUrl { .. } | QuestionsError::DownloadFailed { .. } => {
                Some(Stage::Download)
            }
            QuestionsError::InvalidInput { .. }
            | QuestionsError::EmptyExtraction
            | QuestionsError::OcrFailed { .. }
            | QuestionsError::PdfiumBindingFailed(_) => Some(Stage::Extract),
            QuestionsError::GenerationTooShort { .. } | QuestionsError::LlmApiError { .. } => {
                Some(Stage::Synthesize)
            }
            QuestionsError::ProviderNotConfigured { .. }
            | QuestionsError::InvalidConfig(_)
            | QuestionsError::Internal(_) => None,
        }
    }

    /// HTTP status of a failed download, when the server answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            QuestionsError::DownloadFailed { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_failed_display_carries_reason() {
        let e = QuestionsError::DownloadFailed {
            url: "https://example.com/a.pdf".into(),
            status: Some(404),
            reason: "HTTP 404 Not Found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("404"), "got: {msg}");
        assert!(msg.contains("example.com"), "got: {msg}");
        assert_eq!(e.http_status(), Some(404));
    }

    #[test]
    fn generation_too_short_display() {
        let e = QuestionsError::GenerationTooShort { len: 12, min: 20 };
        assert!(e.to_string().contains("12 chars"));
        assert!(e.to_string().contains("20"));
    }

    #[test]
    fn stages_are_assigned() {
        assert_eq!(QuestionsError::EmptyExtraction.stage(), Some(Stage::Extract));
        assert_eq!(
            QuestionsError::InvalidUrl {
                url: String::new(),
                reason: "empty".into()
            }
            .stage(),
            Some(Stage::Download)
        );
        assert_eq!(
            QuestionsError::LlmApiError {
                message: "boom".into()
            }
            .stage(),
            Some(Stage::Synthesize)
        );
        assert_eq!(QuestionsError::Internal("x".into()).stage(), None);
    }

    #[test]
    fn non_download_errors_have_no_status() {
        assert_eq!(QuestionsError::EmptyExtraction.http_status(), None);
    }
}
