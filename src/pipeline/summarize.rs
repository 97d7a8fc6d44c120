//! Summarization client: persona-scoped prompt, bounded retry, and score
//! extraction.
//!
//! Failures degrade into the returned `SummaryResult` instead of
//! propagating: the digest reader sees a zero score with explanatory text,
//! the batch keeps going.

use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::config::DigestConfig;
use crate::error::GenerationError;
use crate::llm::GenerationService;

/// Bodies shorter than this are not worth a generation call.
const MIN_TEXT_CHARS: usize = 50;

/// Result content for the short-text short-circuit.
const SHORT_TEXT_NOTICE: &str = "Content too short.";

/// A summary whose score the model failed to label still counts for
/// something, unlike the 0 the short-circuit assigns.
const UNPARSED_SCORE: u8 = 1;

const MAX_SCORE: u8 = 5;

/// Labeled-token pattern: the RVSCORE label, tolerant of surrounding
/// punctuation and whitespace, followed by a single digit.
static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)RVSCORE[:*\s]+(\d)").unwrap());

/// A scored summary. `content` is always a real string, failure or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    /// Relevance in [0,5].
    pub score: u8,
    pub content: String,
}

/// Summarization client over a generation service.
pub struct Summarizer {
    service: Arc<dyn GenerationService>,
    persona: String,
    text_cap: usize,
    temperature: f64,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Summarizer {
    pub fn new(service: Arc<dyn GenerationService>, config: &DigestConfig) -> Self {
        Self {
            service,
            persona: config.persona.clone(),
            text_cap: config.prompt_text_cap,
            temperature: config.temperature,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.call_delay,
        }
    }

    /// Summarize one extracted body, returning a scored result.
    pub async fn summarize(&self, text: &str) -> SummaryResult {
        if text.chars().count() < MIN_TEXT_CHARS {
            return SummaryResult {
                score: 0,
                content: SHORT_TEXT_NOTICE.to_string(),
            };
        }

        let prompt = self.build_prompt(text);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.service.generate(&prompt, self.temperature).await {
                Ok(raw) => {
                    let score = extract_score(&raw).unwrap_or(UNPARSED_SCORE).min(MAX_SCORE);
                    return SummaryResult { score, content: raw };
                }
                Err(GenerationError::Transient(reason)) if attempt < self.max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        %reason,
                        "Generation service unavailable; retrying after delay"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "Summarization failed");
                    return SummaryResult {
                        score: 0,
                        content: format!("Error during processing: {e}"),
                    };
                }
            }
        }
    }

    fn build_prompt(&self, text: &str) -> String {
        let persona = &self.persona;
        format!(
            "Perform a high-density analysis and synthesis of the following newsletter \
             for a {persona}, scoring it for relevance based on the scoring system of 1 \
             being bottom 20% relevancy and 5 being top 20% relevancy.\n\n\
             OUTPUT FORMAT:\n\
             **RVSCORE:** [1-5]\n\
             1. **Core Thesis**: One sentence of maximum intellectual depth.\n\
             2. **Critical Pillars**: 3-4 bullet points analyzing the primary logical \
             moves or data points.\n\
             3. **Relevance**: Highlight the relevance of this piece for {persona}.\n\n\
             TEXT:\n{}",
            truncate_chars(text, self.text_cap)
        )
    }
}

/// Pull the labeled relevance digit out of free-form model output.
fn extract_score(raw: &str) -> Option<u8> {
    SCORE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|digit| digit.as_str().parse().ok())
}

/// Truncate to at most `cap` characters without splitting a code point.
fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
