//! `edgequake-llm` adapters for the OCR and generation stages.
//!
//! [`VisionOcr`] renders pages with pdfium and asks a vision model to
//! transcribe each one. [`LlmGenerator`] streams question text from a chat
//! model. Both make exactly one attempt per call; failures propagate.

use crate::config::PipelineConfig;
use crate::error::QuestionsError;
use crate::output::PdfBytes;
use crate::pipeline::extract::{OcrEngine, OcrOutput};
use crate::pipeline::render;
use crate::pipeline::synthesize::{Agent, TextGenerator, TextStream};
use crate::prompts::OCR_SYSTEM_PROMPT;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::{
    ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory,
    traits::StreamChunk,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use image::DynamicImage;
use std::future::Future;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Instantiate a named provider (`"openai"`, `"anthropic"`, ...) for `model`.
///
/// The factory reads the provider's API key from the environment, so call
/// this once at process start and inject the result into
/// [`PipelineConfig`].
pub fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, QuestionsError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        QuestionsError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn llm_error(e: impl std::fmt::Display) -> QuestionsError {
    QuestionsError::LlmApiError {
        message: e.to_string(),
    }
}

// ── OCR ──────────────────────────────────────────────────────────────────

/// OCR via page rendering plus a vision-language model.
pub struct VisionOcr {
    provider: Arc<dyn LLMProvider>,
    pdfium_lib_path: Option<PathBuf>,
    max_rendered_pixels: u32,
    max_pages: Option<usize>,
    concurrency: usize,
    options: CompletionOptions,
}

impl VisionOcr {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            pdfium_lib_path: config.pdfium_lib_path.clone(),
            max_rendered_pixels: config.max_rendered_pixels,
            max_pages: config.max_pages,
            concurrency: config.ocr_concurrency.max(1),
            options: ocr_options(config),
        }
    }

    /// Build from the config's vision provider.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, QuestionsError> {
        let provider = config
            .vision_provider()
            .ok_or_else(|| QuestionsError::ProviderNotConfigured {
                provider: "ocr".to_string(),
                hint: "Set PipelineConfig::ocr_provider or PipelineConfig::provider.".to_string(),
            })?;
        Ok(Self::new(Arc::clone(provider), config))
    }

    async fn transcribe_page(&self, page_num: usize, image: ImageData) -> Result<String, QuestionsError> {
        let start = Instant::now();
        let messages = vec![
            ChatMessage::system(OCR_SYSTEM_PROMPT),
            ChatMessage::user_with_images("", vec![image]),
        ];

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| QuestionsError::OcrFailed {
                page: page_num,
                detail: e.to_string(),
            })?;

        debug!(
            "Page {}: {} input tokens, {} output tokens, {:?}",
            page_num,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );
        Ok(response.content)
    }
}

#[async_trait]
impl OcrEngine for VisionOcr {
    async fn read_document(&self, pdf: &PdfBytes) -> Result<OcrOutput, QuestionsError> {
        let rendered = render::render_pages(
            pdf.as_slice().to_vec(),
            self.pdfium_lib_path.clone(),
            self.max_rendered_pixels,
            self.max_pages,
        )
        .await?;

        let mut encoded = Vec::with_capacity(rendered.pages.len());
        for (idx, img) in &rendered.pages {
            let data = encode_page(img).map_err(|e| QuestionsError::OcrFailed {
                page: idx + 1,
                detail: format!("image encoding failed: {e}"),
            })?;
            encoded.push((idx + 1, data));
        }
        let page_count = encoded.len();
        info!(
            "Transcribing {} of {} pages with {}",
            page_count,
            rendered.total_pages,
            self.provider.name()
        );

        let pages = transcribe_pages(encoded, self.concurrency, |page_num, data| {
            self.transcribe_page(page_num, data)
        })
        .await?;
        Ok(OcrOutput {
            text: join_pages(&pages),
            page_count,
        })
    }
}

/// Run `transcribe` over `pages` with at most `concurrency` calls in flight.
///
/// Transcripts come back in input order whatever order the calls finish in.
/// The first failure ends the fan-out: in-flight calls are dropped and no
/// further page is started.
pub(crate) async fn transcribe_pages<P, F, Fut>(
    pages: Vec<(usize, P)>,
    concurrency: usize,
    transcribe: F,
) -> Result<Vec<String>, QuestionsError>
where
    F: Fn(usize, P) -> Fut,
    Fut: Future<Output = Result<String, QuestionsError>>,
{
    stream::iter(
        pages
            .into_iter()
            .map(|(page_num, data)| transcribe(page_num, data)),
    )
    .buffered(concurrency.max(1))
    .try_collect()
    .await
}

/// Encode a rendered page as a base64 PNG. PNG keeps glyph edges intact;
/// `detail: "high"` lets the model see small print.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(ImageData::new(STANDARD.encode(&buf), "image/png").with_detail("high"))
}

/// Join page transcripts with blank lines, skipping empty pages.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── Generation ───────────────────────────────────────────────────────────

/// Streams question text from a chat model.
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            options: generation_options(config),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, QuestionsError> {
        let provider = config
            .provider
            .as_ref()
            .ok_or_else(|| QuestionsError::ProviderNotConfigured {
                provider: "generation".to_string(),
                hint: "Set PipelineConfig::provider.".to_string(),
            })?;
        Ok(Self::new(Arc::clone(provider), config))
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, agent: &Agent, prompt: &str) -> Result<TextStream, QuestionsError> {
        let messages = generation_messages(agent, prompt);

        if self.provider.supports_streaming() {
            // No tools are offered, so only content chunks carry text.
            let stream = self
                .provider
                .chat_with_tools_stream(&messages, &[], None, Some(&self.options))
                .await
                .map_err(llm_error)?;
            let text = stream.filter_map(|chunk| async move {
                match chunk {
                    Ok(StreamChunk::Content(text)) => Some(Ok(text)),
                    Ok(_) => None,
                    Err(e) => Some(Err(llm_error(e))),
                }
            });
            return Ok(Box::pin(text));
        }

        debug!(
            "{} does not stream; falling back to a single chat call",
            self.provider.name()
        );
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(llm_error)?;
        Ok(Box::pin(tokio_stream::once(Ok(response.content))))
    }
}

/// Request options for page transcription.
fn ocr_options(config: &PipelineConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.ocr_temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Request options for question generation. Used by both the streaming and
/// the chat path.
fn generation_options(config: &PipelineConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

fn generation_messages(agent: &Agent, prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(agent.instructions.as_str()),
        ChatMessage::user(prompt),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])));
        let data = encode_page(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert!(decoded.starts_with(b"\x89PNG"));
    }

    #[test]
    fn pages_join_in_order_without_blanks() {
        let pages = vec![
            "Page one.\n".to_string(),
            "   ".to_string(),
            "Page three.".to_string(),
        ];
        assert_eq!(join_pages(&pages), "Page one.\n\nPage three.");
    }

    #[tokio::test]
    async fn transcripts_keep_page_order() {
        // Earlier pages finish last.
        let pages: Vec<(usize, u64)> = vec![(1, 60), (2, 30), (3, 0)];
        let texts = transcribe_pages(pages, 3, |page, delay_ms| async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(format!("page {page}"))
        })
        .await
        .unwrap();
        assert_eq!(texts, vec!["page 1", "page 2", "page 3"]);
    }

    #[tokio::test]
    async fn failing_page_fails_the_document() {
        let pages: Vec<(usize, ())> = (1..=4).map(|n| (n, ())).collect();
        let err = transcribe_pages(pages, 2, |page, ()| async move {
            if page == 2 {
                Err(QuestionsError::OcrFailed {
                    page,
                    detail: "429 rate limited".into(),
                })
            } else {
                Ok(format!("page {page}"))
            }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, QuestionsError::OcrFailed { page: 2, .. }));
    }

    #[tokio::test]
    async fn first_failure_stops_further_pages() {
        let started = AtomicUsize::new(0);
        let pages: Vec<(usize, ())> = (1..=5).map(|n| (n, ())).collect();
        let result = transcribe_pages(pages, 1, |page, ()| {
            started.fetch_add(1, Ordering::SeqCst);
            async move {
                Err::<String, _>(QuestionsError::OcrFailed {
                    page,
                    detail: "boom".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn generation_options_follow_config() {
        let config = PipelineConfig::builder()
            .temperature(0.2)
            .max_tokens(512)
            .build()
            .unwrap();
        let opts = generation_options(&config);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(512));

        let ocr = ocr_options(&config);
        assert_eq!(ocr.temperature, Some(config.ocr_temperature));
        assert_eq!(ocr.max_tokens, Some(512));
    }

    #[test]
    fn generation_sends_instructions_then_prompt() {
        let agent = Agent::question_generator();
        let messages = generation_messages(&agent, "Generate questions about X");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, agent.instructions);
        assert_eq!(messages[1].content, "Generate questions about X");
    }

    #[test]
    fn missing_providers_are_reported() {
        let config = PipelineConfig::default();
        assert!(matches!(
            VisionOcr::from_config(&config),
            Err(QuestionsError::ProviderNotConfigured { .. })
        ));
        assert!(matches!(
            LlmGenerator::from_config(&config),
            Err(QuestionsError::ProviderNotConfigured { .. })
        ));
    }
}
