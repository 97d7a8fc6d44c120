//! Run configuration.
//!
//! One explicit value constructed once in `main` and passed into each
//! component. The knobs live here, not in module-level statics.

use std::time::Duration;

/// Configuration for a digest run.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Generation model identifier.
    pub model: String,
    /// Sender domain the mailbox query filters on.
    pub sender_domain: String,
    /// Reader persona embedded in the summarization prompt.
    pub persona: String,
    /// Trailing time window the mailbox query covers.
    pub lookback: Duration,
    /// Delay between consecutive generation calls (rate-limit courtesy).
    pub call_delay: Duration,
    /// Total generation attempts per message (first try + retries).
    pub max_attempts: u32,
    /// Prompt text cap in characters; longer bodies are truncated.
    pub prompt_text_cap: usize,
    /// Sampling temperature, kept low for scoring consistency.
    pub temperature: f64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            sender_domain: "substack.com".to_string(),
            persona: "doctoral researcher in international relations and \
                      commercially aware management/strategy consultant"
                .to_string(),
            lookback: Duration::from_secs(24 * 60 * 60),
            call_delay: Duration::from_secs(10),
            max_attempts: 3,
            prompt_text_cap: 60_000,
            temperature: 0.1,
        }
    }
}

impl DigestConfig {
    /// Build config from `DIGEST_*` environment variables, falling back to
    /// the compiled defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let lookback_hours: u64 = std::env::var("DIGEST_LOOKBACK_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.lookback.as_secs() / 3600);

        let call_delay_secs: u64 = std::env::var("DIGEST_CALL_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.call_delay.as_secs());

        Self {
            model: std::env::var("DIGEST_MODEL").unwrap_or(defaults.model),
            sender_domain: std::env::var("DIGEST_SENDER_DOMAIN").unwrap_or(defaults.sender_domain),
            persona: std::env::var("DIGEST_PERSONA").unwrap_or(defaults.persona),
            lookback: Duration::from_secs(lookback_hours * 3600),
            call_delay: Duration::from_secs(call_delay_secs),
            max_attempts: std::env::var("DIGEST_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            prompt_text_cap: std::env::var("DIGEST_PROMPT_TEXT_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.prompt_text_cap),
            temperature: defaults.temperature,
        }
    }
}
