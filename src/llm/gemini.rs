//! Gemini `generateContent` REST client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::GenerationError;
use crate::llm::GenerationService;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini generation client for a fixed model.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, GenerationError> {
        let url = format!("{GEMINI_API_BASE}/models/{}:generateContent", self.model);

        let payload = serde_json::json!({
            "contents": [ { "parts": [ { "text": prompt } ] } ],
            "generationConfig": { "temperature": temperature },
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError::Permanent(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Overload is the one retryable class. Anything else (bad
            // request, quota, auth) fails the attempt for good.
            return if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                Err(GenerationError::Transient(format!("{status}: {body}")))
            } else {
                Err(GenerationError::Permanent(format!("{status}: {body}")))
            };
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Permanent(format!("unreadable response: {e}")))?;

        extract_text(parsed)
    }
}

/// Concatenate the first candidate's text parts.
fn extract_text(response: GenerateResponse) -> Result<String, GenerationError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GenerationError::Permanent("response carried no text".into()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "**RVSCORE:** 4\n" }, { "text": "Thesis." } ] } },
                { "content": { "parts": [ { "text": "second candidate ignored" } ] } },
            ]
        }))
        .unwrap();

        assert_eq!(extract_text(response).unwrap(), "**RVSCORE:** 4\nThesis.");
    }

    #[test]
    fn empty_candidates_are_a_permanent_failure() {
        let response: GenerateResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::Permanent(_))
        ));
    }

    #[test]
    fn candidate_without_text_parts_is_a_permanent_failure() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [ { "content": { "parts": [] } } ]
        }))
        .unwrap();
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::Permanent(_))
        ));
    }
}
