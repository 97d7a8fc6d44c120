use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use substack_digest::auth;
use substack_digest::config::DigestConfig;
use substack_digest::llm::GeminiClient;
use substack_digest::mailbox::GmailClient;
use substack_digest::pipeline::DigestPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Secrets come only from the environment
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: GEMINI_API_KEY not set");
        std::process::exit(1);
    });
    let token_blob = std::env::var("GMAIL_TOKEN_JSON").unwrap_or_else(|_| {
        eprintln!("Error: GMAIL_TOKEN_JSON not set");
        eprintln!("  Provide the authorized-user credential JSON.");
        std::process::exit(1);
    });

    let config = DigestConfig::from_env();

    eprintln!("📰 Substack Digest v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Sender filter: {}", config.sender_domain);
    eprintln!(
        "   Lookback: {}h, delay between calls: {}s\n",
        config.lookback.as_secs() / 3600,
        config.call_delay.as_secs()
    );

    let http = reqwest::Client::new();
    let access_token = auth::obtain_access_token(&http, &token_blob)
        .await
        .context("mailbox authentication failed")?;

    let mailbox = Arc::new(GmailClient::new(access_token));
    let service = Arc::new(GeminiClient::new(
        SecretString::from(api_key),
        config.model.clone(),
    ));

    let pipeline = DigestPipeline::new(mailbox, service, config);
    let count = pipeline.run().await.context("digest run failed")?;

    if count == 0 {
        eprintln!("No newsletters found; nothing sent.");
    } else {
        eprintln!("Digest with {count} newsletters sent.");
    }

    Ok(())
}
