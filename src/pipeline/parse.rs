//! Question parsing: raw model text → bounded, ordered list of questions.
//!
//! Pure and deterministic. Rules, in order:
//!
//! 1. Split on newlines, trim, drop empty lines.
//! 2. Keep a line if it contains `?` **or** starts with an enumeration
//!    (`12.` / `3)`). A bullet alone does not qualify.
//! 3. Strip the enumeration prefix, then a bullet marker (`-`, `*`, `•`,
//!    or the mojibake `â€¢`), then trim again.
//! 4. Drop lines whose cleaned length is at or below the minimum.
//! 5. Keep the first `max` survivors.

use crate::config::{DEFAULT_MAX_QUESTIONS, DEFAULT_MIN_QUESTION_CHARS};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_ENUMERATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+[.)]").unwrap());

static RE_ENUM_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+[.)]\s*").unwrap());

// `â€¢` is U+2022 decoded as Windows-1252.
static RE_BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|â€¢)\s*").unwrap());

/// Parse with the default limits (10 questions, longer than 5 characters).
pub fn parse_questions(raw: &str) -> Vec<String> {
    parse_questions_with(raw, DEFAULT_MAX_QUESTIONS, DEFAULT_MIN_QUESTION_CHARS)
}

/// Parse with explicit limits. Lengths are counted in characters.
pub fn parse_questions_with(raw: &str, max: usize, min_chars: usize) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| is_question_like(line))
        .map(clean_line)
        .filter(|q| q.chars().count() > min_chars)
        .take(max)
        .collect()
}

fn is_question_like(line: &str) -> bool {
    line.contains('?') || RE_ENUMERATED.is_match(line)
}

fn clean_line(line: &str) -> String {
    let s = RE_ENUM_PREFIX.replace(line, "");
    let s = RE_BULLET_PREFIX.replace(&s, "");
    s.trim().to_string()
}
