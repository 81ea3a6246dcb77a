use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::NewOrder;
use crate::infrastructure::AppState;
use crate::modules::integrations::stripe::{
    CHECKOUT_COMPLETED, CompletedSession, SIGNATURE_HEADER,
};

fn webhook_error(error: impl std::fmt::Display) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Webhook error", "error": error.to_string() })),
    )
        .into_response()
}

/// Amount in major units, rendered the way the payment page showed it
fn total_amount(amount_total: Option<i64>) -> String {
    match amount_total {
        Some(cents) if cents != 0 => (cents as f64 / 100.0).to_string(),
        _ => "0".to_string(),
    }
}

/// POST /api/webhooks/payment - Signed payment notifications
#[utoipa::path(
    post,
    path = "/api/webhooks/payment",
    responses(
        (status = 200, description = "Delivery accepted"),
        (status = 400, description = "Signature or payload rejected"),
        (status = 404, description = "Buyer unknown")
    )
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = match state
        .webhooks
        .construct_event(&body, signature, chrono::Utc::now().timestamp())
    {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Rejected payment webhook: {}", e);
            return webhook_error(e);
        }
    };

    if event.event_type != CHECKOUT_COMPLETED {
        tracing::debug!("Ignoring webhook event {} ({})", event.id, event.event_type);
        return StatusCode::OK.into_response();
    }

    let session: CompletedSession = match serde_json::from_value(event.data.object) {
        Ok(session) => session,
        Err(e) => return webhook_error(e),
    };

    let Some(event_id) = session.metadata.get("eventId").cloned() else {
        return webhook_error("missing eventId metadata");
    };
    let buyer_external_id = session
        .metadata
        .get("buyerId")
        .map(String::as_str)
        .unwrap_or_default();

    let buyer = match state.user_repo.find_by_external_id(buyer_external_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(
                "Checkout session {} references unknown buyer '{}'",
                session.id,
                buyer_external_id
            );
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "User not found" })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Buyer lookup failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal error" })),
            )
                .into_response();
        }
    };

    let new_order = NewOrder {
        external_session_id: session.id,
        event_id,
        buyer_id: buyer.id,
        total_amount: total_amount(session.amount_total),
    };

    match state.order_repo.create(new_order).await {
        Ok(order) => {
            tracing::info!(
                "Recorded order {} for event {} by user {}",
                order.id,
                order.event_id,
                buyer.id
            );
            (
                StatusCode::OK,
                Json(json!({ "message": "OK", "order": order })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to persist order: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal error" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_amount_in_major_units() {
        assert_eq!(total_amount(Some(2000)), "20");
        assert_eq!(total_amount(Some(1999)), "19.99");
        assert_eq!(total_amount(Some(0)), "0");
        assert_eq!(total_amount(None), "0");
    }
}
