use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::infrastructure::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(alias = "message")]
    pub prompt: String,
}

/// POST /api/generate - Single-turn text completion
#[utoipa::path(
    post,
    path = "/api/generate",
    responses(
        (status = 200, description = "Generated reply as {reply}"),
        (status = 400, description = "Empty prompt"),
        (status = 500, description = "Generation failed")
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> impl IntoResponse {
    if payload.prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Prompt is required" })),
        )
            .into_response();
    }

    match state.gemini.generate(&payload.prompt).await {
        Ok(reply) => Json(json!({ "reply": reply })).into_response(),
        Err(e) => {
            tracing::error!("Content generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process request" })),
            )
                .into_response()
        }
    }
}
