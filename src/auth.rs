//! Headless credential handling.
//!
//! The mailbox credential arrives as an authorized-user JSON blob in an
//! environment variable (no browser flow, no callback server). The stored
//! access token is used while its expiry is comfortably in the future;
//! otherwise it is refreshed against the OAuth2 token endpoint. Every
//! failure here is startup-fatal: the run produces nothing.

use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::AuthError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Slack subtracted from the stored expiry so a token about to lapse
/// mid-run is refreshed up front.
const EXPIRY_SLACK_SECS: i64 = 60;

/// The authorized-user credential shape.
#[derive(Debug, Deserialize)]
pub struct StoredCredentials {
    token: Option<String>,
    refresh_token: Option<String>,
    token_uri: Option<String>,
    client_id: String,
    client_secret: String,
    expiry: Option<String>,
}

impl StoredCredentials {
    pub fn parse(blob: &str) -> Result<Self, AuthError> {
        Ok(serde_json::from_str(blob)?)
    }

    /// The stored access token, if it is still usable at `now`.
    ///
    /// A credential without a recorded expiry is treated as expired; the
    /// refresh path is the safe default.
    fn usable_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref()?;
        let expiry = parse_expiry(self.expiry.as_deref()?)?;
        if expiry - chrono::Duration::seconds(EXPIRY_SLACK_SECS) > now {
            Some(token)
        } else {
            None
        }
    }
}

/// Expiry timestamps appear both as RFC 3339 and as a naive UTC timestamp,
/// depending on which tool wrote the blob.
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Produce a valid access token from the credential blob, refreshing it if
/// the stored one has expired.
pub async fn obtain_access_token(
    http: &reqwest::Client,
    blob: &str,
) -> Result<SecretString, AuthError> {
    let credentials = StoredCredentials::parse(blob)?;

    if let Some(token) = credentials.usable_token(Utc::now()) {
        tracing::debug!("Stored access token still valid");
        return Ok(SecretString::from(token.to_string()));
    }

    let Some(refresh_token) = credentials.refresh_token.as_deref() else {
        return Err(AuthError::Unrefreshable);
    };

    tracing::info!("Access token expired; refreshing");

    let token_uri = credentials.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
    let params = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let response = http.post(token_uri).form(&params).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::RefreshRejected(format!("{status}: {body}")));
    }

    let refreshed: RefreshResponse = response.json().await?;
    Ok(SecretString::from(refreshed.access_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(token: Option<&str>, refresh: Option<&str>, expiry: Option<&str>) -> String {
        serde_json::json!({
            "token": token,
            "refresh_token": refresh,
            "token_uri": DEFAULT_TOKEN_URI,
            "client_id": "client-id",
            "client_secret": "client-secret",
            "expiry": expiry,
        })
        .to_string()
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            StoredCredentials::parse("{not json"),
            Err(AuthError::MalformedCredentials(_))
        ));
    }

    #[test]
    fn fresh_token_is_used_directly() {
        let blob = credentials(Some("tok"), Some("ref"), Some("2099-01-01T00:00:00Z"));
        let creds = StoredCredentials::parse(&blob).unwrap();
        assert_eq!(creds.usable_token(Utc::now()), Some("tok"));
    }

    #[test]
    fn expired_token_is_not_used() {
        let blob = credentials(Some("tok"), Some("ref"), Some("2020-01-01T00:00:00Z"));
        let creds = StoredCredentials::parse(&blob).unwrap();
        assert_eq!(creds.usable_token(Utc::now()), None);
    }

    #[test]
    fn token_without_expiry_forces_refresh() {
        let blob = credentials(Some("tok"), Some("ref"), None);
        let creds = StoredCredentials::parse(&blob).unwrap();
        assert_eq!(creds.usable_token(Utc::now()), None);
    }

    #[test]
    fn naive_expiry_format_is_accepted() {
        let creds = StoredCredentials::parse(&credentials(
            Some("tok"),
            Some("ref"),
            Some("2099-06-01T12:30:45.123456"),
        ))
        .unwrap();
        assert_eq!(creds.usable_token(Utc::now()), Some("tok"));
    }

    #[test]
    fn expiry_inside_slack_window_counts_as_expired() {
        let blob = credentials(Some("tok"), Some("ref"), Some("2099-01-01T00:00:00Z"));
        let creds = StoredCredentials::parse(&blob).unwrap();
        let just_before_expiry =
            DateTime::parse_from_rfc3339("2098-12-31T23:59:30Z").unwrap().to_utc();
        assert_eq!(creds.usable_token(just_before_expiry), None);
    }
}
