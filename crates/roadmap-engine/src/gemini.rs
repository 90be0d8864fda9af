//! Generator backed by the Gemini `generateContent` REST endpoint.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, warn};

use roadmap_core::config::GenerationSettings;
use roadmap_core::traits::Generator;

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    /// Builds a client from settings. A missing key is not an error here; every
    /// call fails instead, so callers with a fallback keep working.
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()));
        if api_key.is_none() {
            warn!("{API_KEY_ENV} not set, generation calls will fail");
        }
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

pub fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({ "contents": [{ "parts": [{ "text": prompt }] }] })
}

/// Concatenated text parts of the first candidate.
pub fn parse_response(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| anyhow!("failed to parse response: {e}"))?;
    let candidate = response.candidates.into_iter().next().ok_or_else(|| anyhow!("response has no candidates"))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(anyhow!("first candidate has no text"));
    }
    Ok(text)
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| anyhow!("{API_KEY_ENV} is not configured"))?;
        debug!(model = %self.model, prompt_len = prompt.len(), "calling generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "request failed");
                anyhow!("request failed: {e}")
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| anyhow!("failed to read response body: {e}"))?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
            error!(model = %self.model, %status, "API error");
            return Err(anyhow!("API returned {status}: {detail}"));
        }
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wraps_prompt_in_single_part() {
        let body = request_body("hello");
        assert_eq!(body, serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]}));
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello, "},{"text":"world"}]}},
                       {"content":{"parts":[{"text":"ignored"}]}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Hello, world");
    }

    #[test]
    fn empty_candidates_are_an_error() {
        assert!(parse_response(r#"{"candidates":[]}"#).is_err());
        assert!(parse_response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).is_err());
    }

    #[tokio::test]
    async fn missing_key_fails_every_call() {
        let settings = GenerationSettings { api_key: Some(" ".into()), ..GenerationSettings::default() };
        let mut generator = GeminiGenerator::from_settings(&settings);
        generator.api_key = None;
        let err = generator.generate("hi").await.unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
        assert!(generator.endpoint().ends_with("/v1beta/models/gemini-2.0-flash:generateContent"));
    }
}
