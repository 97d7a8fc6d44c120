//! Mailbox abstraction: message references, the typed content-part tree,
//! and the query-service trait the pipeline runs against.

pub mod gmail;

pub use gmail::GmailClient;

use async_trait::async_trait;

use crate::error::MailboxError;

// ── Data model ──────────────────────────────────────────────────────

/// Opaque reference to one mailbox message. Produced by enumeration,
/// consumed once to fetch the full detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub id: String,
}

/// One page of an enumeration query.
#[derive(Debug, Clone)]
pub struct MessagePage {
    pub refs: Vec<MessageRef>,
    /// Continuation token for the next page; `None` means the last page.
    pub next_page_token: Option<String>,
}

/// Full message detail: headers plus the typed content-part tree.
#[derive(Debug, Clone)]
pub struct MessageDetail {
    pub subject: String,
    pub sender: String,
    pub body: ContentPart,
}

/// A node in the content-part tree.
///
/// The declared content type is resolved into this closed set exactly once,
/// when the wire payload is parsed; leaves of any other type are dropped
/// there and never reach the extractor. `data` carries the wire-form
/// base64url text; decoding happens in the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Plain { data: String },
    Html { data: String },
    Container { children: Vec<ContentPart> },
}

impl ContentPart {
    /// An empty container, for messages with no textual parts at all.
    pub fn empty() -> Self {
        Self::Container { children: Vec::new() }
    }
}

// ── Query-service trait ─────────────────────────────────────────────

/// Mailbox query service. Pure I/O, no pipeline logic.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Fetch one page of message references matching `query`.
    async fn list_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<MessagePage, MailboxError>;

    /// Fetch the full detail for one message reference.
    async fn fetch_detail(&self, id: &str) -> Result<MessageDetail, MailboxError>;

    /// The account's primary address.
    async fn profile_address(&self) -> Result<String, MailboxError>;

    /// Send an HTML message.
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailboxError>;
}

// ── Enumeration ─────────────────────────────────────────────────────

/// List every message matching `query`, following continuation tokens until
/// a page returns none.
///
/// A query can legitimately exceed one page; stopping early would silently
/// drop newsletters. No retry here: a list failure is fatal to the run.
pub async fn list_messages(
    mailbox: &dyn Mailbox,
    query: &str,
) -> Result<Vec<MessageRef>, MailboxError> {
    let mut refs = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = mailbox.list_page(query, page_token.as_deref()).await?;
        refs.extend(page.refs);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(refs)
}
