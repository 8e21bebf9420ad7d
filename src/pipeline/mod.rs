//! Pipeline stages for PDF-to-questions generation.
//!
//! Each submodule implements exactly one step. Stages that talk to the
//! outside world do so through a trait (`PdfFetcher`, `OcrEngine`,
//! `TextGenerator`) so the runner can be exercised without a network.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ extract ──▶ synthesize ──▶ parse
//! (HTTP)    (pdfium+VLM) (LLM stream)   (pure)
//! ```
//!
//! 1. [`fetch`]      : GET the PDF; non-2xx is fatal
//! 2. [`render`]     : rasterise pages; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`extract`]    : validate bytes and run OCR, rejecting blank output
//! 4. [`llm`]        : `edgequake-llm` adapters for OCR and generation
//! 5. [`synthesize`] : truncate, prompt, and collect the generation stream
//! 6. [`parse`]      : turn raw model text into a bounded question list

pub mod extract;
pub mod fetch;
pub mod llm;
pub mod parse;
pub mod render;
pub mod synthesize;
