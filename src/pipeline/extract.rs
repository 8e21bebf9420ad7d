//! Text extraction: validate the bytes, run OCR, reject blank output.

use crate::error::QuestionsError;
use crate::output::{ExtractedText, PdfBytes};
use async_trait::async_trait;
use tracing::{info, warn};

/// What an OCR collaborator hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutput {
    pub text: String,
    pub page_count: usize,
}

/// An opaque document-understanding capability: PDF bytes in, text out.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn read_document(&self, pdf: &PdfBytes) -> Result<OcrOutput, QuestionsError>;
}

/// Extract text from a PDF.
///
/// Fails with [`QuestionsError::InvalidInput`] without calling `engine` if
/// the bytes are empty or lack the `%PDF` magic, and with
/// [`QuestionsError::EmptyExtraction`] if the engine returns only
/// whitespace.
pub async fn extract(
    engine: &dyn OcrEngine,
    pdf: PdfBytes,
) -> Result<ExtractedText, QuestionsError> {
    check_pdf(&pdf)?;

    let output = engine.read_document(&pdf).await?;
    let extracted = ExtractedText::new(output.text, output.page_count);

    if extracted.is_blank() {
        warn!("No text could be extracted from the PDF");
        return Err(QuestionsError::EmptyExtraction);
    }

    info!(
        "Extracted {} characters from {} pages",
        extracted.char_count(),
        extracted.page_count()
    );
    Ok(extracted)
}

fn check_pdf(pdf: &PdfBytes) -> Result<(), QuestionsError> {
    if pdf.is_empty() {
        return Err(QuestionsError::InvalidInput {
            reason: "buffer is empty".into(),
        });
    }
    if !pdf.has_pdf_magic() {
        let head: Vec<u8> = pdf.as_slice().iter().take(4).copied().collect();
        return Err(QuestionsError::InvalidInput {
            reason: format!("missing %PDF header, first bytes: {:?}", head),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedOcr {
        text: &'static str,
        calls: AtomicUsize,
    }

    impl FixedOcr {
        fn new(text: &'static str) -> Self {
            Self {
                text,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl OcrEngine for FixedOcr {
        async fn read_document(&self, _pdf: &PdfBytes) -> Result<OcrOutput, QuestionsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OcrOutput {
                text: self.text.to_string(),
                page_count: 2,
            })
        }
    }

    fn pdf() -> PdfBytes {
        PdfBytes::new(b"%PDF-1.4\n%fake".to_vec())
    }

    #[tokio::test]
    async fn returns_text_with_counts() {
        let ocr = FixedOcr::new("Attention is all you need.");
        let out = extract(&ocr, pdf()).await.unwrap();
        assert_eq!(out.text(), "Attention is all you need.");
        assert_eq!(out.page_count(), 2);
        assert_eq!(out.char_count(), 26);
    }

    #[tokio::test]
    async fn non_pdf_bytes_never_reach_the_engine() {
        let ocr = FixedOcr::new("unused");
        for bytes in [
            Vec::new(),
            b"<!DOCTYPE html><html></html>".to_vec(),
            b"PK\x03\x04zip".to_vec(),
            b"%PD".to_vec(),
        ] {
            let err = extract(&ocr, PdfBytes::new(bytes)).await.unwrap_err();
            assert!(matches!(err, QuestionsError::InvalidInput { .. }), "{err}");
        }
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitespace_only_text_is_an_empty_extraction() {
        let ocr = FixedOcr::new("  \n\n\t  ");
        let err = extract(&ocr, pdf()).await.unwrap_err();
        assert!(matches!(err, QuestionsError::EmptyExtraction));
    }
}
