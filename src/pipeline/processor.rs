//! Run driver: strictly sequential enumerate, fetch, extract, summarize,
//! assemble, send.
//!
//! Per-message failures degrade that one item and the batch continues;
//! enumeration, profile lookup, and delivery failures abort the run.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing::{info, warn};

use crate::config::DigestConfig;
use crate::error::Result;
use crate::llm::GenerationService;
use crate::mailbox::{Mailbox, list_messages};
use crate::pipeline::digest::{DigestItem, assemble};
use crate::pipeline::extract::extract_text;
use crate::pipeline::summarize::Summarizer;

/// The digest pipeline, wired once per run.
pub struct DigestPipeline {
    mailbox: Arc<dyn Mailbox>,
    summarizer: Summarizer,
    config: DigestConfig,
}

impl DigestPipeline {
    pub fn new(
        mailbox: Arc<dyn Mailbox>,
        service: Arc<dyn GenerationService>,
        config: DigestConfig,
    ) -> Self {
        let summarizer = Summarizer::new(service, &config);
        Self {
            mailbox,
            summarizer,
            config,
        }
    }

    /// Execute one full run. Returns the number of items in the sent digest,
    /// 0 when the window held no messages (nothing is sent).
    pub async fn run(&self) -> Result<usize> {
        let query = search_query(&self.config, Utc::now());
        info!(%query, "Searching mailbox");

        let refs = list_messages(self.mailbox.as_ref(), &query).await?;
        if refs.is_empty() {
            info!("No newsletters in the lookback window");
            return Ok(0);
        }

        let total = refs.len();
        info!(total, "Processing batch");

        let mut items: Vec<DigestItem> = Vec::with_capacity(total);
        for (index, message_ref) in refs.iter().enumerate() {
            let detail = match self.mailbox.fetch_detail(&message_ref.id).await {
                Ok(detail) => detail,
                Err(e) => {
                    warn!(id = %message_ref.id, error = %e, "Fetch failed; skipping message");
                    continue;
                }
            };

            info!("[{}/{}] {}", index + 1, total, elide(&detail.subject, 60));

            let text = extract_text(&detail.body);
            let summary = self.summarizer.summarize(&text).await;

            items.push(DigestItem {
                subject: detail.subject,
                sender: detail.sender,
                summary,
            });

            // Rate-limit courtesy between generation calls, never after the
            // final item.
            if index + 1 < total {
                tokio::time::sleep(self.config.call_delay).await;
            }
        }

        if items.is_empty() {
            warn!("Every fetch failed; nothing to assemble");
            return Ok(0);
        }

        let count = items.len();
        let document = assemble(items, Local::now().date_naive());

        let address = self.mailbox.profile_address().await?;
        self.mailbox
            .send_html(&address, &document.subject, &document.html)
            .await?;

        info!(count, to = %address, "Digest run complete");
        Ok(count)
    }
}

/// The time-windowed search expression: sender-domain filter plus a
/// lower-bound epoch at now minus the lookback.
fn search_query(config: &DigestConfig, now: DateTime<Utc>) -> String {
    let cutoff = now - config.lookback;
    format!("from:{} after:{}", config.sender_domain, cutoff.timestamp())
}

fn elide(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(cap).collect();
        format!("{prefix}...")
    }
}
