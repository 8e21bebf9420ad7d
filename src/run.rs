//! Pipeline runner: download → extract → synthesize → parse.
//!
//! Stages run strictly in sequence, each consuming the previous stage's
//! typed output. Failure handling differs by stage:
//!
//! | Stage      | On failure                                          |
//! |------------|-----------------------------------------------------|
//! | Download   | `Err` returned to the caller                        |
//! | Extract    | `Err` returned to the caller (incl. blank text)     |
//! | Synthesize | `Ok(PipelineResult { success: false, .. })`         |
//!
//! Parsing cannot fail; a generation with no recognisable questions still
//! yields `success: true` with an empty list.

use crate::config::PipelineConfig;
use crate::error::QuestionsError;
use crate::output::{PipelineResult, PipelineState, Stage};
use crate::pipeline::extract::{self, OcrEngine};
use crate::pipeline::fetch::{HttpFetcher, PdfFetcher};
use crate::pipeline::llm::{LlmGenerator, VisionOcr};
use crate::pipeline::parse;
use crate::pipeline::synthesize::{self, Agent, TextGenerator};
use crate::progress::{NoopObserver, Observer};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A configured pipeline. Cheap to share; holds no per-run state.
pub struct Pipeline {
    fetcher: Arc<dyn PdfFetcher>,
    ocr: Arc<dyn OcrEngine>,
    generator: Arc<dyn TextGenerator>,
    agent: Agent,
    config: PipelineConfig,
    observer: Observer,
}

impl Pipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        fetcher: Arc<dyn PdfFetcher>,
        ocr: Arc<dyn OcrEngine>,
        generator: Arc<dyn TextGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            ocr,
            generator,
            agent: Agent::question_generator(),
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Assemble the default HTTP + vision OCR + LLM pipeline.
    ///
    /// Fails with [`QuestionsError::ProviderNotConfigured`] when the config
    /// carries no provider.
    pub fn from_config(config: PipelineConfig) -> Result<Self, QuestionsError> {
        let fetcher = HttpFetcher::new(config.download_timeout_secs)?;
        let ocr = VisionOcr::from_config(&config)?;
        let generator = LlmGenerator::from_config(&config)?;
        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(ocr),
            Arc::new(generator),
            config,
        ))
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    /// Run the pipeline for one PDF URL.
    ///
    /// # Errors
    /// Download and extraction failures, including
    /// [`QuestionsError::EmptyExtraction`]. Synthesis failures are reported
    /// through `PipelineResult::success` instead.
    pub async fn run(&self, pdf_url: &str) -> Result<PipelineResult, QuestionsError> {
        let started = Instant::now();
        let mut run = RunTracker::new(&self.observer);
        info!("Starting pdf-to-questions run: {}", pdf_url);

        // ── Download ─────────────────────────────────────────────────────
        run.begin(Stage::Download);
        let pdf = self
            .fetcher
            .fetch(pdf_url)
            .await
            .map_err(|e| run.fatal(Stage::Download, e))?;
        run.complete(Stage::Download, &format!("{} bytes", pdf.len()));

        // ── Extract ──────────────────────────────────────────────────────
        run.advance(PipelineState::Extracting);
        run.begin(Stage::Extract);
        let text = extract::extract(self.ocr.as_ref(), pdf)
            .await
            .map_err(|e| run.fatal(Stage::Extract, e))?;
        run.complete(
            Stage::Extract,
            &format!("{} characters", text.char_count()),
        );

        // ── Synthesize ───────────────────────────────────────────────────
        run.advance(PipelineState::Synthesizing);
        run.begin(Stage::Synthesize);
        let raw = match synthesize::synthesize(
            self.generator.as_ref(),
            &self.agent,
            &text,
            &self.config,
        )
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Step {}: Failed - {}", Stage::Synthesize, e);
                run.recoverable(Stage::Synthesize, &e);
                return Ok(PipelineResult::failed(e.to_string()));
            }
        };

        let questions = parse::parse_questions_with(
            &raw.text,
            self.config.max_questions,
            self.config.min_question_chars,
        );
        debug!("Parsed {} questions from {} chunks", questions.len(), raw.chunks);
        run.complete(
            Stage::Synthesize,
            &format!("{} questions", questions.len()),
        );
        run.advance(PipelineState::Done);

        info!(
            "Run complete: {} questions in {}ms",
            questions.len(),
            started.elapsed().as_millis()
        );
        Ok(PipelineResult::succeeded(questions))
    }
}

/// Generate questions for `pdf_url` with the default collaborators.
pub async fn generate_questions(
    pdf_url: impl AsRef<str>,
    config: &PipelineConfig,
) -> Result<PipelineResult, QuestionsError> {
    Pipeline::from_config(config.clone())?
        .run(pdf_url.as_ref())
        .await
}

/// Synchronous wrapper around [`generate_questions`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_questions_sync(
    pdf_url: impl AsRef<str>,
    config: &PipelineConfig,
) -> Result<PipelineResult, QuestionsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| QuestionsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_questions(pdf_url, config))
}

// ── Run state ────────────────────────────────────────────────────────────

/// Tracks one run's state and forwards events to the observer.
struct RunTracker<'a> {
    state: PipelineState,
    observer: &'a Observer,
}

impl<'a> RunTracker<'a> {
    fn new(observer: &'a Observer) -> Self {
        Self {
            state: PipelineState::Downloading,
            observer,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} → {:?}",
            self.state,
            next
        );
        debug!("Pipeline state: {:?} → {:?}", self.state, next);
        self.observer.on_transition(self.state, next);
        self.state = next;
    }

    fn begin(&self, stage: Stage) {
        info!("Executing step: {}", stage);
        self.observer.on_stage_start(stage);
    }

    fn complete(&self, stage: Stage, summary: &str) {
        info!("Step {}: Succeeded - {}", stage, summary);
        self.observer.on_stage_complete(stage, summary);
    }

    /// Record a failure that ends the run with an error.
    fn fatal(&mut self, stage: Stage, e: QuestionsError) -> QuestionsError {
        error!("Step {}: Failed - {}", stage, e);
        self.recoverable(stage, &e);
        e
    }

    /// Record a failure; the caller decides whether it propagates.
    fn recoverable(&mut self, stage: Stage, e: &QuestionsError) {
        self.observer.on_stage_failed(stage, &e.to_string());
        self.advance(PipelineState::Failed);
    }
}
