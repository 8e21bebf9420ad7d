//! Prompts for OCR and question generation.
//!
//! All prompt text lives here so tests can inspect it without a provider.
//! The question template can be overridden through
//! [`crate::config::PipelineConfig::question_prompt`].

/// System prompt for transcribing one rendered PDF page to plain text.
pub const OCR_SYSTEM_PROMPT: &str = r#"You are an OCR engine. Transcribe the text on this PDF page image.

Rules:
1. Output ONLY the text that appears on the page, in human reading order.
2. Keep paragraph breaks as blank lines. Join hyphenated line breaks.
3. Render tables as one row per line with cells separated by " | ".
4. Write formulas inline using plain characters or LaTeX.
5. Skip page numbers and running headers/footers.
6. Do NOT add commentary, summaries, or markdown fences.
7. If the page has no readable text, output nothing."#;

/// Persona for the question-generating agent.
pub const AGENT_NAME: &str = "Generate questions from PDF agent";

/// Instructions given to the question-generating agent.
///
/// The placeholder `{tools}` is replaced by the agent's capability list.
pub const AGENT_INSTRUCTIONS: &str = r#"You are a PDF processing agent specialised in generating educational questions from document text.

You can use these capabilities:
{tools}

When generating questions:
- Base every question strictly on the provided text.
- Cover the key concepts, definitions, methods and results.
- Prefer questions that test understanding over trivia.
- Write each question on its own line, numbered "1.", "2.", ...
- End each question with a question mark.
- Output only the questions, with no preamble or closing remarks."#;

/// Default question-generation template. `{text}` is replaced by the
/// (truncated) extracted text.
pub const DEFAULT_QUESTION_PROMPT: &str = r#"Generate comprehensive study questions based on the following content extracted from a PDF.

Focus on the main concepts, key facts and important details. Mix recall questions with questions that require explanation or comparison.

Content:
"""
{text}
"""

Return a numbered list of questions, one per line."#;

/// Fill a question template with document text.
pub fn question_prompt(template: &str, text: &str) -> String {
    template.replace("{text}", text)
}

/// Render the agent instructions with a capability list.
pub fn agent_instructions(tools: &str) -> String {
    AGENT_INSTRUCTIONS.replace("{tools}", tools)
}
