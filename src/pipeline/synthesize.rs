//! Question synthesis: prompt a language model and collect its stream.
//!
//! The "agent" is plain data: a name, instructions, and the explicit set of
//! capabilities it is allowed to describe to the model. Generation is a
//! function of `(agent, prompt)`; there is no registry to look agents up
//! in, so a missing agent is not a reachable state.

use crate::config::PipelineConfig;
use crate::error::QuestionsError;
use crate::output::{ExtractedText, RawGeneration};
use crate::prompts::{self, AGENT_NAME, DEFAULT_QUESTION_PROMPT};
use async_trait::async_trait;
use futures::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{debug, info};

/// A stream of text chunks in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, QuestionsError>> + Send>>;

/// A capability the agent may be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    FetchPdf,
    ExtractText,
    GenerateQuestions,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::FetchPdf => "pdf-fetcher",
            Tool::ExtractText => "text-extractor",
            Tool::GenerateQuestions => "question-generator",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::FetchPdf => "Downloads a PDF from a URL and returns the file bytes",
            Tool::ExtractText => "Extracts text from PDF bytes using OCR",
            Tool::GenerateQuestions => "Generates study questions from extracted text",
        }
    }
}

/// Explicit capability set handed to a generator with each call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolset {
    tools: Vec<Tool>,
}

impl Toolset {
    pub fn new(tools: impl IntoIterator<Item = Tool>) -> Self {
        let mut set = Self::default();
        for tool in tools {
            set.insert(tool);
        }
        set
    }

    /// Add a tool; duplicates are ignored.
    pub fn insert(&mut self, tool: Tool) {
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
    }

    pub fn contains(&self, tool: Tool) -> bool {
        self.tools.contains(&tool)
    }

    pub fn iter(&self) -> impl Iterator<Item = Tool> + '_ {
        self.tools.iter().copied()
    }

    /// One `- name: description` line per tool.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A named persona with instructions and capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub name: String,
    pub instructions: String,
    pub tools: Toolset,
}

impl Agent {
    /// The built-in question generator, equipped with all three tools.
    pub fn question_generator() -> Self {
        let tools = Toolset::new([Tool::FetchPdf, Tool::ExtractText, Tool::GenerateQuestions]);
        Self {
            name: AGENT_NAME.to_string(),
            instructions: prompts::agent_instructions(&tools.describe()),
            tools,
        }
    }
}

/// A streaming generative-language capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Start a generation for `prompt` under `agent`'s instructions.
    async fn generate(&self, agent: &Agent, prompt: &str) -> Result<TextStream, QuestionsError>;
}

/// Generate raw question text from extracted document text.
///
/// Only the first `config.max_chars` characters of the text are sent.
/// Chunks are concatenated in the order received. Output of
/// `config.min_generation_chars` characters or fewer is rejected.
pub async fn synthesize(
    generator: &dyn TextGenerator,
    agent: &Agent,
    text: &ExtractedText,
    config: &PipelineConfig,
) -> Result<RawGeneration, QuestionsError> {
    let excerpt = truncate_chars(text.text(), config.max_chars);
    let template = config
        .question_prompt
        .as_deref()
        .unwrap_or(DEFAULT_QUESTION_PROMPT);
    let prompt = prompts::question_prompt(template, excerpt);

    debug!(
        "Prompting '{}' with {} of {} characters",
        agent.name,
        excerpt.chars().count(),
        text.char_count()
    );

    let stream = generator.generate(agent, &prompt).await?;
    let raw = collect_stream(stream).await?;

    let len = raw.text.chars().count();
    if len <= config.min_generation_chars {
        return Err(QuestionsError::GenerationTooShort {
            len,
            min: config.min_generation_chars,
        });
    }

    info!("Generated {} characters in {} chunks", len, raw.chunks);
    Ok(raw)
}

/// Drain a text stream, failing on the first chunk error.
pub async fn collect_stream(mut stream: TextStream) -> Result<RawGeneration, QuestionsError> {
    let mut raw = RawGeneration::default();
    while let Some(chunk) = stream.next().await {
        raw.text.push_str(&chunk?);
        raw.chunks += 1;
    }
    Ok(raw)
}

/// The first `max_chars` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
