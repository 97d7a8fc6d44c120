//! Gmail REST implementation of the `Mailbox` trait.
//!
//! List/get/profile/send against `gmail/v1/users/me`, Bearer-authenticated.
//! The wire payload's part tree is resolved into the typed `ContentPart`
//! model here; non-text leaves never leave this module.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::MailboxError;
use crate::mailbox::{ContentPart, Mailbox, MessageDetail, MessagePage, MessageRef};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Page size for the list call. Queries beyond this spill into continuation
/// tokens, which the enumeration driver follows.
const LIST_PAGE_SIZE: u32 = 500;

/// Gmail mailbox client.
pub struct GmailClient {
    http: reqwest::Client,
    access_token: SecretString,
}

impl GmailClient {
    pub fn new(access_token: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{GMAIL_API_BASE}/{path}")
    }

    /// Reject non-2xx responses, surfacing status and body.
    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, MailboxError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(MailboxError::Api { status, body })
    }
}

#[async_trait]
impl Mailbox for GmailClient {
    async fn list_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<MessagePage, MailboxError> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("maxResults", LIST_PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response = self
            .http
            .get(self.api_url("messages"))
            .bearer_auth(self.access_token.expose_secret())
            .query(&params)
            .send()
            .await?;

        let listing: ListResponse = Self::checked(response).await?.json().await?;

        Ok(MessagePage {
            refs: listing
                .messages
                .into_iter()
                .map(|m| MessageRef { id: m.id })
                .collect(),
            next_page_token: listing.next_page_token,
        })
    }

    async fn fetch_detail(&self, id: &str) -> Result<MessageDetail, MailboxError> {
        let response = self
            .http
            .get(self.api_url(&format!("messages/{id}")))
            .bearer_auth(self.access_token.expose_secret())
            .query(&[("format", "full")])
            .send()
            .await?;

        let message: WireMessage = Self::checked(response).await?.json().await?;
        Ok(detail_from_wire(message))
    }

    async fn profile_address(&self) -> Result<String, MailboxError> {
        let response = self
            .http
            .get(self.api_url("profile"))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;

        let profile: ProfileResponse = Self::checked(response).await?.json().await?;
        if profile.email_address.is_empty() {
            return Err(MailboxError::Malformed("profile has no email address".into()));
        }
        Ok(profile.email_address)
    }

    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailboxError> {
        let raw = encode_raw_message(to, subject, html)?;

        let response = self
            .http
            .post(self.api_url("messages/send"))
            .bearer_auth(self.access_token.expose_secret())
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await?;

        Self::checked(response).await?;
        tracing::info!(to, "Digest sent");
        Ok(())
    }
}

// ── Outbound composition ────────────────────────────────────────────

/// Build the RFC 2822 document and base64url-encode it for the `raw` send
/// contract. The digest is self-addressed, so sender and recipient match.
fn encode_raw_message(to: &str, subject: &str, html: &str) -> Result<String, MailboxError> {
    let address: lettre::message::Mailbox = to
        .parse()
        .map_err(|e| MailboxError::Compose(format!("invalid address {to:?}: {e}")))?;

    let message = lettre::Message::builder()
        .from(address.clone())
        .to(address)
        .subject(subject)
        .header(lettre::message::header::ContentType::TEXT_HTML)
        .body(html.to_string())
        .map_err(|e| MailboxError::Compose(e.to_string()))?;

    Ok(URL_SAFE.encode(message.formatted()))
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    messages: Vec<WireRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    #[serde(default)]
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    payload: WirePart,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<WireHeader>,
    body: Option<WireBody>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WireHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct WireBody {
    data: Option<String>,
}

/// Resolve a wire message into headers plus the typed part tree.
fn detail_from_wire(message: WireMessage) -> MessageDetail {
    let subject = header_value(&message.payload.headers, "Subject")
        .unwrap_or("No Subject")
        .to_string();
    let sender = header_value(&message.payload.headers, "From")
        .unwrap_or("Unknown")
        .to_string();
    let body = part_tree(&message.payload).unwrap_or_else(ContentPart::empty);

    MessageDetail { subject, sender, body }
}

fn header_value<'a>(headers: &'a [WireHeader], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Resolve one wire part.
///
/// Parts-bearing nodes become containers; a single-part message becomes one
/// leaf of its own declared type. Leaves of any other type, and text leaves
/// without data, resolve to `None` and contribute nothing downstream.
fn part_tree(part: &WirePart) -> Option<ContentPart> {
    if !part.parts.is_empty() {
        let children = part.parts.iter().filter_map(part_tree).collect();
        return Some(ContentPart::Container { children });
    }

    let data = part.body.as_ref()?.data.clone()?;
    match part.mime_type.as_str() {
        "text/plain" => Some(ContentPart::Plain { data }),
        "text/html" => Some(ContentPart::Html { data }),
        _ => None,
    }
}
