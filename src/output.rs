//! Values that flow between pipeline stages, and the terminal result.
//!
//! ```text
//! &str (URL) ──fetch──▶ PdfBytes ──extract──▶ ExtractedText
//!            ──synthesize──▶ RawGeneration ──parse──▶ PipelineResult
//! ```
//!
//! Each intermediate is moved into the next stage; nothing is shared
//! between runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw PDF bytes as downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfBytes {
    bytes: Vec<u8>,
}

impl PdfBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the buffer starts with the `%PDF` magic.
    pub fn has_pdf_magic(&self) -> bool {
        self.bytes.starts_with(b"%PDF")
    }
}

/// Text produced by the OCR stage.
///
/// `char_count` always equals `text.chars().count()`; the only constructor
/// computes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    text: String,
    page_count: usize,
    char_count: usize,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, page_count: usize) -> Self {
        let text = text.into();
        let char_count = text.chars().count();
        Self {
            text,
            page_count,
            char_count,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Accumulated text of one streamed model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGeneration {
    pub text: String,
    /// Number of stream chunks that made up `text`.
    pub chunks: usize,
}

/// Terminal value of a pipeline run.
///
/// Serialises as `{"questions": [...], "success": bool}`; `error` is only
/// present when synthesis failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub questions: Vec<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResult {
    pub fn succeeded(questions: Vec<String>) -> Self {
        Self {
            questions,
            success: true,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            questions: Vec::new(),
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// One step of the sequential pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Download,
    Extract,
    Synthesize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Download => "download-pdf",
            Stage::Extract => "extract-text",
            Stage::Synthesize => "generate-questions",
        };
        f.write_str(s)
    }
}

/// Run state. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    Downloading,
    Extracting,
    Synthesizing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Legal transitions: forward by one step, or to `Failed` from any
    /// non-terminal state.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Downloading, Extracting)
                | (Extracting, Synthesizing)
                | (Synthesizing, Done)
                | (Downloading, Failed)
                | (Extracting, Failed)
                | (Synthesizing, Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracted_text_counts_chars_not_bytes() {
        let t = ExtractedText::new("héllo wörld", 1);
        assert_eq!(t.char_count(), 11);
        assert!(t.text().len() > 11);
    }

    #[test]
    fn blank_detection() {
        assert!(ExtractedText::new(" \n\t ", 2).is_blank());
        assert!(!ExtractedText::new(" a ", 1).is_blank());
    }

    #[test]
    fn pdf_magic() {
        assert!(PdfBytes::new(b"%PDF-1.7\n...".to_vec()).has_pdf_magic());
        assert!(!PdfBytes::new(b"<html>".to_vec()).has_pdf_magic());
        assert!(!PdfBytes::new(Vec::new()).has_pdf_magic());
    }

    #[test]
    fn result_json_shape() {
        let ok = PipelineResult::succeeded(vec!["What is attention?".into()]);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"questions": ["What is attention?"], "success": true})
        );

        let failed = PipelineResult::failed("LLM API error: boom");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["questions"], serde_json::json!([]));
        assert_eq!(json["error"], "LLM API error: boom");
    }

    #[test]
    fn state_transitions() {
        use PipelineState::*;
        assert!(Downloading.can_transition_to(Extracting));
        assert!(Extracting.can_transition_to(Synthesizing));
        assert!(Synthesizing.can_transition_to(Done));
        for s in [Downloading, Extracting, Synthesizing] {
            assert!(s.can_transition_to(Failed));
        }
        assert!(!Downloading.can_transition_to(Synthesizing));
        assert!(!Done.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Downloading));
        assert!(Done.is_terminal() && Failed.is_terminal());
    }
}
