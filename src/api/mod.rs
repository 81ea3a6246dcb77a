pub mod chat;
pub mod checkout;
pub mod events;
pub mod generate;
pub mod health;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::AppState;

pub fn api_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog
        .route("/events", get(events::list_events))
        // Content generation
        .route("/generate", post(generate::generate))
        // Payments
        .route("/checkout", post(checkout::create_checkout))
        .route("/webhooks/payment", post(webhooks::payment_webhook))
        // Chat widget
        .route("/chat/sessions", post(chat::open_session))
        .route(
            "/chat/sessions/:id",
            get(chat::get_session).delete(chat::close_session),
        )
        .route("/chat/sessions/:id/activity", get(chat::get_activity))
        .route("/chat/sessions/:id/messages", post(chat::send_message))
        .route("/chat/sessions/:id/checkout", post(chat::checkout))
        .route("/chat/sessions/:id/reset", post(chat::reset_session))
        .with_state(state)
}
