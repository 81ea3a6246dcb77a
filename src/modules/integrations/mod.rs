//! Outbound HTTP integrations
//!
//! - `backend`: the assistant's client for its own events/generate/checkout routes
//! - `gemini`: generative text API behind `POST /generate`
//! - `stripe`: hosted checkout behind `POST /checkout`, plus webhook signatures

pub mod backend;
mod error;
pub mod gemini;
pub mod stripe;

pub use backend::BackendClient;
pub use error::IntegrationError;
pub use gemini::GeminiClient;
pub use stripe::{StripeClient, WebhookVerifier};
