//! HTTP client for the assistant's own backend routes.
//!
//! One client serves the three gateways the intent router needs:
//! `GET /events`, `POST /generate` and `POST /checkout`. Event lookups and
//! completions never fail from the caller's point of view; checkout failures
//! are returned so the conversation can report them.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::IntegrationError;
use crate::domain::{CheckoutGateway, CheckoutOrder, ContentGenerator, Event, EventQuery};

/// Reply used whenever the generation route cannot be reached or answers badly
pub const GENERATION_FALLBACK: &str = "Sorry, I couldn't process that request due to an error.";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    reply: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    url: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IntegrationError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_events(&self, query: &str, page: u32, limit: u32) -> Result<Vec<Event>, String> {
        let url = format!(
            "{}/events?query={}&page={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            page,
            limit
        );

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("Events API returned status: {}", resp.status()));
        }

        resp.json::<Vec<Event>>()
            .await
            .map_err(|e| format!("Failed to parse events: {}", e))
    }

    async fn generate(&self, prompt: &str) -> Result<String, String> {
        let resp = self
            .http
            .post(format!("{}/generate", self.base_url))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("Generate API returned status: {}", resp.status()));
        }

        resp.json::<GenerateResponse>()
            .await
            .map(|r| r.reply)
            .map_err(|e| format!("Failed to parse reply: {}", e))
    }
}

#[async_trait]
impl EventQuery for BackendClient {
    async fn list_events(&self, query: &str, page: u32, limit: u32) -> Vec<Event> {
        match self.fetch_events(query, page, limit).await {
            Ok(events) => {
                tracing::debug!("Catalog returned {} events for '{}'", events.len(), query);
                events
            }
            Err(e) => {
                tracing::warn!("Event lookup for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ContentGenerator for BackendClient {
    async fn complete(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Content generation failed: {}", e);
                GENERATION_FALLBACK.to_string()
            }
        }
    }
}

#[async_trait]
impl CheckoutGateway for BackendClient {
    async fn create_session(&self, order: &CheckoutOrder) -> Result<String, String> {
        tracing::info!(
            "Requesting checkout for event {} (free: {})",
            order.event_id,
            order.is_free
        );

        let resp = self
            .http
            .post(format!("{}/checkout", self.base_url))
            .json(order)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        let status = resp.status();
        let body: CheckoutResponse = resp
            .json()
            .await
            .map_err(|e| format!("Failed to parse checkout response: {}", e))?;

        match (status.is_success(), body.url) {
            (true, Some(url)) => Ok(url),
            _ => Err(body
                .error
                .unwrap_or_else(|| format!("Checkout API returned status: {}", status))),
        }
    }
}
