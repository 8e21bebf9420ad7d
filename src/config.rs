//! Configuration for a PDF-to-questions run.
//!
//! Everything a collaborator needs (providers, limits, prompts) lives in
//! [`PipelineConfig`] and is passed explicitly. Nothing below the binary
//! reads process environment; API keys are consumed once when the provider
//! is built and handed in as an `Arc<dyn LLMProvider>`.

use crate::error::QuestionsError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default number of leading characters of extracted text sent to the
/// question generator.
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// Default cap on parsed questions.
pub const DEFAULT_MAX_QUESTIONS: usize = 10;

/// Cleaned question lines must be longer than this many characters.
pub const DEFAULT_MIN_QUESTION_CHARS: usize = 5;

/// Generated text must be longer than this many characters.
pub const DEFAULT_MIN_GENERATION_CHARS: usize = 20;

/// Configuration for a pipeline run.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_questions::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_questions(5)
///     .max_pages(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_chars, 4000);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Provider used for question generation.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Vision provider used for OCR. Falls back to `provider` when `None`.
    pub ocr_provider: Option<Arc<dyn LLMProvider>>,

    /// Leading characters of extracted text given to the generator. Default: 4000.
    ///
    /// Text past this prefix never reaches the model.
    pub max_chars: usize,

    /// Maximum questions returned. Default: 10.
    pub max_questions: usize,

    /// Minimum cleaned question length (exclusive). Default: 5.
    pub min_question_chars: usize,

    /// Minimum generated text length (exclusive). Default: 20.
    pub min_generation_chars: usize,

    /// Transcribe at most this many leading pages. Default: all.
    pub max_pages: Option<usize>,

    /// Longest rendered edge in pixels. Default: 2000.
    ///
    /// Keeps page images below provider upload limits regardless of the
    /// physical page size.
    pub max_rendered_pixels: u32,

    /// Concurrent OCR page requests. Default: 4.
    ///
    /// Pages are always reassembled in document order.
    pub ocr_concurrency: usize,

    /// Sampling temperature for OCR calls. Default: 0.1.
    pub ocr_temperature: f32,

    /// Sampling temperature for question generation. Default: 0.7.
    pub temperature: f32,

    /// Max tokens per LLM response. Default: 4096.
    pub max_tokens: usize,

    /// Download timeout in seconds. Default: none (client default).
    pub download_timeout_secs: Option<u64>,

    /// Explicit pdfium shared library. Default: system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Custom question-generation template. Must contain `{text}`.
    pub question_prompt: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider: None,
            ocr_provider: None,
            max_chars: DEFAULT_MAX_CHARS,
            max_questions: DEFAULT_MAX_QUESTIONS,
            min_question_chars: DEFAULT_MIN_QUESTION_CHARS,
            min_generation_chars: DEFAULT_MIN_GENERATION_CHARS,
            max_pages: None,
            max_rendered_pixels: 2000,
            ocr_concurrency: 4,
            ocr_temperature: 0.1,
            temperature: 0.7,
            max_tokens: 4096,
            download_timeout_secs: None,
            pdfium_lib_path: None,
            question_prompt: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field(
                "ocr_provider",
                &self.ocr_provider.as_ref().map(|p| p.name().to_string()),
            )
            .field("max_chars", &self.max_chars)
            .field("max_questions", &self.max_questions)
            .field("min_question_chars", &self.min_question_chars)
            .field("min_generation_chars", &self.min_generation_chars)
            .field("max_pages", &self.max_pages)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("ocr_concurrency", &self.ocr_concurrency)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// The provider used for OCR: `ocr_provider`, else `provider`.
    pub fn vision_provider(&self) -> Option<&Arc<dyn LLMProvider>> {
        self.ocr_provider.as_ref().or(self.provider.as_ref())
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl fmt::Debug for PipelineConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl PipelineConfigBuilder {
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn ocr_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.ocr_provider = Some(provider);
        self
    }

    pub fn max_chars(mut self, n: usize) -> Self {
        self.config.max_chars = n;
        self
    }

    pub fn max_questions(mut self, n: usize) -> Self {
        self.config.max_questions = n;
        self
    }

    pub fn min_question_chars(mut self, n: usize) -> Self {
        self.config.min_question_chars = n;
        self
    }

    pub fn min_generation_chars(mut self, n: usize) -> Self {
        self.config.min_generation_chars = n;
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn ocr_concurrency(mut self, n: usize) -> Self {
        self.config.ocr_concurrency = n.max(1);
        self
    }

    pub fn ocr_temperature(mut self, t: f32) -> Self {
        self.config.ocr_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = Some(secs);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn question_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.question_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, QuestionsError> {
        let c = &self.config;
        if c.max_chars == 0 {
            return Err(QuestionsError::InvalidConfig(
                "max_chars must be ≥ 1".into(),
            ));
        }
        if c.max_questions == 0 {
            return Err(QuestionsError::InvalidConfig(
                "max_questions must be ≥ 1".into(),
            ));
        }
        if c.max_pages == Some(0) {
            return Err(QuestionsError::InvalidConfig(
                "max_pages must be ≥ 1 when set".into(),
            ));
        }
        if let Some(ref prompt) = c.question_prompt {
            if !prompt.contains("{text}") {
                return Err(QuestionsError::InvalidConfig(
                    "question_prompt must contain a {text} placeholder".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let c = PipelineConfig::default();
        assert_eq!(c.max_chars, 4000);
        assert_eq!(c.max_questions, 10);
        assert_eq!(c.min_question_chars, 5);
        assert_eq!(c.min_generation_chars, 20);
        assert_eq!(c.download_timeout_secs, None);
        assert!(c.vision_provider().is_none());
    }

    #[test]
    fn builder_clamps() {
        let c = PipelineConfig::builder()
            .ocr_concurrency(0)
            .temperature(9.0)
            .max_rendered_pixels(1)
            .build()
            .unwrap();
        assert_eq!(c.ocr_concurrency, 1);
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn builder_rejects_zero_limits() {
        assert!(PipelineConfig::builder().max_questions(0).build().is_err());
        assert!(PipelineConfig::builder().max_chars(0).build().is_err());
        assert!(PipelineConfig::builder().max_pages(0).build().is_err());
    }

    #[test]
    fn builder_rejects_prompt_without_placeholder() {
        let err = PipelineConfig::builder()
            .question_prompt("Ask me things")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("{text}"));

        assert!(PipelineConfig::builder()
            .question_prompt("Questions about: {text}")
            .build()
            .is_ok());
    }
}
