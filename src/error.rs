//! Error types for the digest pipeline.

/// Top-level error type for a digest run.
///
/// Only startup (config/auth), enumeration, and delivery failures reach this
/// level. Per-message failures are absorbed into that item's `SummaryResult`
/// and never cross the pipeline boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Credential-handling errors. All of these are startup-fatal.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Credential blob is not valid JSON: {0}")]
    MalformedCredentials(#[from] serde_json::Error),

    #[error("Access token expired and no refresh token is available")]
    Unrefreshable,

    #[error("Token refresh was rejected: {0}")]
    RefreshRejected(String),

    #[error("Token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Mailbox service errors.
///
/// An enumeration failure aborts the run before any processing; a send
/// failure aborts it after; the assembled digest is lost either way.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("Mailbox request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mailbox API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed mailbox response: {0}")]
    Malformed(String),

    #[error("Failed to compose outbound message: {0}")]
    Compose(String),
}

/// Generation service errors, tagged by retry class.
///
/// The retry driver in the summarizer matches on this tag: `Transient` is
/// retried up to the configured bound, `Permanent` is never retried.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation service unavailable: {0}")]
    Transient(String),

    #[error("Generation request failed: {0}")]
    Permanent(String),
}

impl GenerationError {
    /// Whether the retry driver may try again after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Result type alias for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;
