//! # pdf-questions
//!
//! Generate study questions from a PDF: download it, read it with a vision
//! LLM, and ask a language model for questions about what it says.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF URL
//!  │
//!  ├─ 1. Download    single HTTP GET; non-2xx is fatal
//!  ├─ 2. Extract     pdfium render → vision LLM transcription per page
//!  ├─ 3. Synthesize  first 4000 chars → streamed question generation
//!  └─ 4. Parse       keep numbered / `?` lines, strip markers, cap at 10
//! ```
//!
//! The result is `{ questions, success }`. Download and extraction errors
//! are returned as `Err`; a failed generation comes back as
//! `success: false` with no questions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_questions::{create_provider, generate_questions, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY once, here.
//!     let provider = create_provider("openai", "gpt-4.1-mini")?;
//!     let config = PipelineConfig::builder().provider(provider).build()?;
//!
//!     let result = generate_questions("https://arxiv.org/pdf/1706.03762.pdf", &config).await?;
//!     for (i, q) in result.questions.iter().enumerate() {
//!         println!("{}. {}", i + 1, q);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2questions` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::QuestionsError;
pub use output::{ExtractedText, PdfBytes, PipelineResult, PipelineState, RawGeneration, Stage};
pub use pipeline::extract::{OcrEngine, OcrOutput};
pub use pipeline::fetch::{HttpFetcher, PdfFetcher};
pub use pipeline::llm::{create_provider, LlmGenerator, VisionOcr};
pub use pipeline::parse::{parse_questions, parse_questions_with};
pub use pipeline::synthesize::{Agent, TextGenerator, TextStream, Tool, Toolset};
pub use progress::{NoopObserver, Observer, PipelineObserver};
pub use run::{generate_questions, generate_questions_sync, Pipeline};
