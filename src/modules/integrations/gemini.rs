//! Google Gemini `generateContent` REST integration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::IntegrationError;
use crate::infrastructure::config::GeminiConfig;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<SecretString>,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Result<Self, IntegrationError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Single-turn completion; the text of all parts of the first candidate
    pub async fn generate(&self, prompt: &str) -> Result<String, IntegrationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(IntegrationError::NotConfigured("Gemini"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret().as_str())
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::Upstream {
                service: "Gemini",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = resp.json().await?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(IntegrationError::InvalidResponse(
                "Gemini returned no text candidates".to_string(),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_url: server.uri(),
            api_key: key.map(|k| SecretString::new(k.to_string())),
            model: "gemini-1.5-flash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "A lively " }, { "text": "evening." }] }
                }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server, Some("test-key")), Duration::from_secs(5)).unwrap();
        let reply = client.generate("Summarize").await.unwrap();
        assert_eq!(reply, "A lively evening.");
    }

    #[tokio::test]
    async fn test_generate_without_key_is_not_configured() {
        let server = MockServer::start().await;
        let client = GeminiClient::new(&config(&server, None), Duration::from_secs(5)).unwrap();
        let err = client.generate("Summarize").await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured("Gemini")));
    }

    #[tokio::test]
    async fn test_generate_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server, Some("k")), Duration::from_secs(5)).unwrap();
        let err = client.generate("Summarize").await.unwrap_err();
        assert!(matches!(err, IntegrationError::Upstream { status: 429, .. }));
    }
}
