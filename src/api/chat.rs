//! Chat widget sessions.
//!
//! Each session owns one conversation. Suggestion chips are plain utterances:
//! the widget posts a chip's payload to `/messages` like typed text.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::assistant::{ConversationState, Message};
use crate::auth::OptionalClaims;
use crate::infrastructure::AppState;
use crate::infrastructure::sessions::SessionHandle;

#[derive(Debug, Serialize)]
pub struct SessionOpened {
    pub session_id: Uuid,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub event_id: String,
}

/// Messages produced by one request, plus the resulting state
#[derive(Debug, Serialize)]
pub struct TurnResponse<'a> {
    pub messages: &'a [Message],
    pub state: &'a ConversationState,
}

fn session_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Session not found" })),
    )
        .into_response()
}

fn session(state: &AppState, id: &Uuid) -> Result<SessionHandle, Response> {
    state.sessions.get(id).ok_or_else(session_not_found)
}

/// POST /api/chat/sessions - Open the widget; signed-in visitors can buy tickets
#[utoipa::path(
    post,
    path = "/api/chat/sessions",
    responses(
        (status = 201, description = "Session opened with the greeting"),
        (status = 401, description = "Invalid bearer token")
    )
)]
pub async fn open_session(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
) -> impl IntoResponse {
    let mut conversation = ConversationState::new(claims.map(|c| c.sub));
    state.assistant.open(&mut conversation);
    let messages = conversation.messages().to_vec();

    let (session_id, _) = state.sessions.create(conversation);

    (
        StatusCode::CREATED,
        Json(SessionOpened {
            session_id,
            messages,
        }),
    )
}

/// GET /api/chat/sessions/:id - Full conversation snapshot
#[utoipa::path(
    get,
    path = "/api/chat/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Conversation state"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let handle = match session(&state, &id) {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let conversation = handle.lock().await;
    Json(&*conversation).into_response()
}

/// GET /api/chat/sessions/:id/activity - Typing and generating indicators
///
/// Answers while an utterance is still being handled.
#[utoipa::path(
    get,
    path = "/api/chat/sessions/{id}/activity",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Current indicators"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_activity(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.sessions.activity(&id) {
        Some(activity) => Json(activity).into_response(),
        None => session_not_found(),
    }
}

/// POST /api/chat/sessions/:id/messages - Submit one utterance
#[utoipa::path(
    post,
    path = "/api/chat/sessions/{id}/messages",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "New messages and resulting state"),
        (status = 400, description = "Empty utterance"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> Response {
    if payload.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message text is required" })),
        )
            .into_response();
    }

    let handle = match session(&state, &id) {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let mut conversation = handle.lock().await;
    let before = conversation.messages().len();
    state.assistant.submit(&payload.text, &mut conversation).await;

    Json(TurnResponse {
        messages: conversation.messages_since(before),
        state: &*conversation,
    })
    .into_response()
}

/// POST /api/chat/sessions/:id/checkout - Buy a ticket from a displayed event card
#[utoipa::path(
    post,
    path = "/api/chat/sessions/{id}/checkout",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Redirect or explanation messages"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckoutRequest>,
) -> Response {
    let handle = match session(&state, &id) {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let mut conversation = handle.lock().await;
    let before = conversation.messages().len();
    state
        .assistant
        .checkout(&payload.event_id, &mut conversation)
        .await;

    Json(TurnResponse {
        messages: conversation.messages_since(before),
        state: &*conversation,
    })
    .into_response()
}

/// POST /api/chat/sessions/:id/reset - Start the dialogue over
#[utoipa::path(
    post,
    path = "/api/chat/sessions/{id}/reset",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Fresh conversation state"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn reset_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let handle = match session(&state, &id) {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let mut conversation = handle.lock().await;
    conversation.reset();
    state.assistant.open(&mut conversation);

    Json(&*conversation).into_response()
}

/// DELETE /api/chat/sessions/:id - Widget closed
#[utoipa::path(
    delete,
    path = "/api/chat/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn close_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    if state.sessions.remove(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found()
    }
}
