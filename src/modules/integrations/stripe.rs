//! Stripe integration: hosted Checkout Sessions and signed webhooks.
//!
//! Only the two REST calls the event assistant needs are implemented, against
//! the form-encoded Stripe API directly.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use super::IntegrationError;
use crate::domain::CheckoutOrder;
use crate::infrastructure::config::StripeConfig;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Amount in cents for an order, `None` when the price is not a usable number
pub fn unit_amount(order: &CheckoutOrder) -> Option<i64> {
    if order.is_free {
        return Some(0);
    }
    let price: f64 = order.price.trim().parse().ok()?;
    if !price.is_finite() || price < 0.0 {
        return None;
    }
    Some((price * 100.0).round() as i64)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

pub struct StripeClient {
    http: reqwest::Client,
    api_url: String,
    secret_key: Option<SecretString>,
    public_server_url: String,
}

impl StripeClient {
    pub fn new(
        config: &StripeConfig,
        public_server_url: &str,
        timeout: Duration,
    ) -> Result<Self, IntegrationError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            public_server_url: public_server_url.to_string(),
        })
    }

    /// Create a one-item payment session for `order`, priced at `amount` cents
    pub async fn create_checkout_session(
        &self,
        order: &CheckoutOrder,
        amount: i64,
    ) -> Result<CheckoutSession, IntegrationError> {
        let secret_key = self
            .secret_key
            .as_ref()
            .ok_or(IntegrationError::NotConfigured("Stripe"))?;

        let form: Vec<(&str, String)> = vec![
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][unit_amount]", amount.to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                order.event_title.clone(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("metadata[eventId]", order.event_id.clone()),
            ("metadata[buyerId]", order.buyer_id.clone()),
            ("mode", "payment".to_string()),
            (
                "success_url",
                format!("{}/profile", self.public_server_url),
            ),
            ("cancel_url", format!("{}/", self.public_server_url)),
        ];

        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_url))
            .bearer_auth(secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::Upstream {
                service: "Stripe",
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await?)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("webhook secret is not configured")]
    NotConfigured,
    #[error("missing Stripe-Signature header")]
    MissingHeader,
    #[error("malformed signature header")]
    MalformedHeader,
    #[error("timestamp outside the tolerance zone")]
    TimestampOutsideTolerance,
    #[error("no signatures found matching the expected signature for payload")]
    NoMatchingSignature,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Envelope of every webhook delivery
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

/// `data.object` of a `checkout.session.completed` event
#[derive(Debug, Deserialize)]
pub struct CompletedSession {
    pub id: String,
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

pub struct WebhookVerifier {
    secret: Option<SecretString>,
    tolerance: Duration,
}

impl WebhookVerifier {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            secret: config.webhook_secret.clone(),
            tolerance: config.webhook_tolerance,
        }
    }

    /// Verify `header` against the raw `payload`, then parse the event.
    ///
    /// Nothing in the payload is trusted before the signature checks out.
    pub fn construct_event(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<WebhookEvent, SignatureError> {
        let secret = self.secret.as_ref().ok_or(SignatureError::NotConfigured)?;
        let header = header.ok_or(SignatureError::MissingHeader)?;

        verify_signature(
            secret.expose_secret().as_bytes(),
            payload,
            header,
            now,
            self.tolerance,
        )?;

        serde_json::from_slice(payload).map_err(|e| SignatureError::InvalidPayload(e.to_string()))
    }
}

fn verify_signature(
    secret: &[u8],
    payload: &[u8],
    header: &str,
    now: i64,
    tolerance: Duration,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates = Vec::new();

    for pair in header.split(',') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if candidates.is_empty() {
        return Err(SignatureError::NoMatchingSignature);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::NotConfigured)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = candidates.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if !matched {
        return Err(SignatureError::NoMatchingSignature);
    }

    if (now - timestamp).unsigned_abs() > tolerance.as_secs() {
        return Err(SignatureError::TimestampOutsideTolerance);
    }

    Ok(())
}

/// Build a `Stripe-Signature` header value for `payload`
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> Result<String, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::NotConfigured)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}
