//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks for the duration of a render. All pdfium work runs on
//! the blocking pool so Tokio workers never stall.

use crate::error::QuestionsError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pages rendered from one document.
pub struct RenderedDocument {
    /// Pages in the document, rendered or not.
    pub total_pages: usize,
    /// `(page_index_0based, image)` in page order.
    pub pages: Vec<(usize, DynamicImage)>,
}

/// Render the leading pages of an in-memory PDF.
///
/// `max_pages` limits how many pages are rendered; `None` renders all.
pub async fn render_pages(
    bytes: Vec<u8>,
    lib_path: Option<PathBuf>,
    max_pixels: u32,
    max_pages: Option<usize>,
) -> Result<RenderedDocument, QuestionsError> {
    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&bytes, lib_path.as_deref(), max_pixels, max_pages)
    })
    .await
    .map_err(|e| QuestionsError::Internal(format!("Render task panicked: {}", e)))?
}

/// Bind pdfium from an explicit path, falling back to the system library.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, QuestionsError> {
    let bindings = match lib_path {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| QuestionsError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

fn render_pages_blocking(
    bytes: &[u8],
    lib_path: Option<&Path>,
    max_pixels: u32,
    max_pages: Option<usize>,
) -> Result<RenderedDocument, QuestionsError> {
    let pdfium = bind_pdfium(lib_path)?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| load_error(format!("{:?}", e)))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let wanted = max_pages.map_or(total_pages, |n| n.min(total_pages));
    info!("PDF loaded: {} pages, rendering {}", total_pages, wanted);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut rendered = Vec::with_capacity(wanted);
    for idx in 0..wanted {
        let page = pages
            .get(idx as u16)
            .map_err(|e| QuestionsError::OcrFailed {
                page: idx + 1,
                detail: format!("could not open page: {:?}", e),
            })?;

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| QuestionsError::OcrFailed {
                page: idx + 1,
                detail: format!("rasterisation failed: {:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        rendered.push((idx, image));
    }

    Ok(RenderedDocument {
        total_pages,
        pages: rendered,
    })
}

/// Map a pdfium load failure to an input error. Encrypted documents get a
/// distinct reason since no password is ever supplied.
fn load_error(detail: String) -> QuestionsError {
    let reason = if detail.to_lowercase().contains("password") {
        "PDF is encrypted and requires a password".to_string()
    } else {
        format!("not a well-formed PDF ({detail})")
    };
    QuestionsError::InvalidInput { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_failures_are_reported_as_encryption() {
        let e = load_error("PdfiumLibraryInternalError(PasswordError)".into());
        assert!(e.to_string().contains("encrypted"), "got: {e}");
    }

    #[test]
    fn other_load_failures_are_invalid_input() {
        let e = load_error("PdfiumLibraryInternalError(FormatError)".into());
        assert!(matches!(e, QuestionsError::InvalidInput { .. }));
        assert!(e.to_string().contains("FormatError"));
    }
}
