//! CLI binary for pdf-questions.
//!
//! A thin shim over the library crate: maps flags to `PipelineConfig`,
//! runs one PDF URL, and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_questions::{
    create_provider, Pipeline, PipelineConfig, PipelineObserver, PipelineResult, Stage,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Spinner observer ─────────────────────────────────────────────────────────

/// One spinner line per run; prints a tick line as each stage finishes.
struct CliObserver {
    bar: ProgressBar,
    stage_started: Mutex<Option<Instant>>,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            stage_started: Mutex::new(None),
        })
    }

    fn elapsed(&self) -> String {
        let secs = self
            .stage_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }
}

impl PipelineObserver for CliObserver {
    fn on_stage_start(&self, stage: Stage) {
        if let Ok(mut s) = self.stage_started.lock() {
            *s = Some(Instant::now());
        }
        let msg = match stage {
            Stage::Download => "Downloading PDF…",
            Stage::Extract => "Extracting text with OCR…",
            Stage::Synthesize => "Generating questions…",
        };
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message(msg);
    }

    fn on_stage_complete(&self, stage: Stage, summary: &str) {
        let elapsed = self.elapsed();
        self.bar.println(format!(
            "  {} {:<20} {}  {}",
            green("✓"),
            stage.to_string(),
            dim(summary),
            elapsed
        ));
        if stage == Stage::Synthesize {
            self.bar.finish_and_clear();
        }
    }

    fn on_stage_failed(&self, stage: Stage, error: &str) {
        let elapsed = self.elapsed();
        // Keep the log line to one row.
        let msg: String = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:<20} {}  {}",
            red("✗"),
            stage.to_string(),
            red(&msg),
            elapsed
        ));
        self.bar.finish_and_clear();
    }
}

const DEFAULT_PDF_URL: &str = "https://arxiv.org/pdf/1706.03762.pdf";

const AFTER_HELP: &str = r#"EXAMPLES:
  # Questions for the Transformer paper (default URL)
  pdf2questions

  # Any PDF URL
  pdf2questions https://example.com/lecture-notes.pdf

  # Only OCR the first 3 pages, ask for 5 questions
  pdf2questions --max-pages 3 --max-questions 5 https://example.com/paper.pdf

  # Machine-readable output
  pdf2questions --json https://example.com/paper.pdf > questions.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (required)
  PDFQ_MODEL              Question generation model
  PDFQ_OCR_MODEL          Vision model used for OCR
  PDFIUM_LIB_PATH         Path to libpdfium (default: system library)
  RUST_LOG                Override log filter (e.g. pdf_questions=debug)
"#;

/// Generate study questions from a PDF using OCR and an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2questions",
    version,
    about = "Generate study questions from a PDF URL using OCR and an LLM",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTTP/HTTPS URL of the PDF.
    #[arg(default_value = DEFAULT_PDF_URL)]
    url: String,

    /// Model used to generate questions.
    #[arg(long, env = "PDFQ_MODEL", default_value = "gpt-4.1-mini")]
    model: String,

    /// Vision model used for OCR.
    #[arg(long, env = "PDFQ_OCR_MODEL", default_value = "gpt-4.1-mini")]
    ocr_model: String,

    /// Maximum number of questions to return.
    #[arg(long, env = "PDFQ_MAX_QUESTIONS", default_value_t = 10)]
    max_questions: usize,

    /// Leading characters of extracted text sent to the model.
    #[arg(long, env = "PDFQ_MAX_CHARS", default_value_t = 4000)]
    max_chars: usize,

    /// OCR at most this many leading pages.
    #[arg(long, env = "PDFQ_MAX_PAGES")]
    max_pages: Option<usize>,

    /// Concurrent OCR page requests.
    #[arg(long, env = "PDFQ_OCR_CONCURRENCY", default_value_t = 4)]
    ocr_concurrency: usize,

    /// HTTP download timeout in seconds (default: none).
    #[arg(long, env = "PDFQ_DOWNLOAD_TIMEOUT")]
    download_timeout: Option<u64>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print only the JSON result.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDFQ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── API key gate ─────────────────────────────────────────────────────
    if std::env::var("OPENAI_API_KEY").map_or(true, |k| k.trim().is_empty()) {
        eprintln!("{} Please set the OPENAI_API_KEY environment variable", red("✘"));
        eprintln!("   Example: export OPENAI_API_KEY=\"your-api-key-here\"");
        std::process::exit(1);
    }

    let config = build_config(&cli)?;
    let mut pipeline = Pipeline::from_config(config).context("Failed to set up pipeline")?;

    if show_progress {
        pipeline = pipeline.with_observer(CliObserver::new());
    }
    if !cli.quiet && !cli.json {
        eprintln!("{} {}", bold("PDF → Questions"), dim(&cli.url));
    }

    let result = pipeline.run(&cli.url).await.context("Pipeline failed")?;
    print_result(&cli, &result)
}

/// Map CLI args to `PipelineConfig`, building providers once.
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let provider = create_provider("openai", &cli.model)
        .with_context(|| format!("Failed to create provider for model '{}'", cli.model))?;

    let mut builder = PipelineConfig::builder()
        .provider(Arc::clone(&provider))
        .max_questions(cli.max_questions)
        .max_chars(cli.max_chars)
        .ocr_concurrency(cli.ocr_concurrency);

    builder = if cli.ocr_model == cli.model {
        builder.ocr_provider(provider)
    } else {
        let ocr = create_provider("openai", &cli.ocr_model)
            .with_context(|| format!("Failed to create provider for model '{}'", cli.ocr_model))?;
        builder.ocr_provider(ocr)
    };

    if let Some(n) = cli.max_pages {
        builder = builder.max_pages(n);
    }
    if let Some(secs) = cli.download_timeout {
        builder = builder.download_timeout_secs(secs);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(path.clone());
    }

    builder.build().context("Invalid configuration")
}

fn print_result(cli: &Cli, result: &PipelineResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialise result")?;
    println!("{json}");
    if cli.json {
        return Ok(());
    }

    if result.success && !result.questions.is_empty() {
        println!("\n{} Generated Questions:", green("✔"));
        for (i, q) in result.questions.iter().enumerate() {
            println!("{}. {}", i + 1, q);
        }
    } else if result.success {
        eprintln!("{} The model's answer contained no recognisable questions", red("✘"));
    } else {
        eprintln!(
            "{} Question generation failed: {}",
            red("✘"),
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
