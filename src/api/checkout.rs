use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::domain::CheckoutOrder;
use crate::infrastructure::AppState;
use crate::modules::integrations::stripe;

fn failed() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to initiate checkout" })),
    )
        .into_response()
}

/// POST /api/checkout - Create a hosted payment page for one ticket
#[utoipa::path(
    post,
    path = "/api/checkout",
    responses(
        (status = 200, description = "Payment page as {url}"),
        (status = 400, description = "Price is not a valid amount"),
        (status = 500, description = "Payment provider failure")
    )
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(order): Json<CheckoutOrder>,
) -> impl IntoResponse {
    let Some(amount) = stripe::unit_amount(&order) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Invalid price '{}'", order.price) })),
        )
            .into_response();
    };

    tracing::info!(
        "Creating checkout session for event {} ({} cents)",
        order.event_id,
        amount
    );

    match state.stripe.create_checkout_session(&order, amount).await {
        Ok(session) => match session.url {
            Some(url) => Json(json!({ "url": url })).into_response(),
            None => {
                tracing::error!("Checkout session {} has no payment URL", session.id);
                failed()
            }
        },
        Err(e) => {
            tracing::error!("Checkout for event {} failed: {}", order.event_id, e);
            failed()
        }
    }
}
