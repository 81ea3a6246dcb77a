use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::{EventFilter, MAX_EVENT_PAGE_SIZE};
use crate::infrastructure::AppState;

/// Query parameters for listing events
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEventsQuery {
    /// Case-insensitive title substring
    pub query: Option<String>,
    /// 1-based, defaults to 1
    pub page: Option<u64>,
    /// Defaults to 100, capped at 100
    pub limit: Option<u64>,
}

impl From<ListEventsQuery> for EventFilter {
    fn from(params: ListEventsQuery) -> Self {
        let defaults = EventFilter::default();
        Self {
            query: params.query.unwrap_or_default().trim().to_string(),
            page: params.page.filter(|p| *p > 0).unwrap_or(defaults.page),
            limit: params
                .limit
                .filter(|l| *l > 0)
                .map_or(defaults.limit, |l| l.min(MAX_EVENT_PAGE_SIZE)),
        }
    }
}

/// GET /api/events - Catalog search, newest first
#[utoipa::path(
    get,
    path = "/api/events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "Matching events"),
        (status = 500, description = "Catalog unavailable")
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListEventsQuery>,
) -> impl IntoResponse {
    let filter = EventFilter::from(params);

    match state.event_repo.find_all(filter).await {
        Ok(events) => (StatusCode::OK, Json(json!(events))).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch events: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch events" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_and_zero_values() {
        let filter = EventFilter::from(ListEventsQuery {
            query: Some("  jazz ".to_string()),
            page: Some(0),
            limit: None,
        });
        assert_eq!(filter.query, "jazz");
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 100);
    }

    #[test]
    fn test_filter_caps_limit_and_keeps_huge_page() {
        let filter = EventFilter::from(ListEventsQuery {
            query: None,
            page: Some(u64::MAX),
            limit: Some(5_000),
        });
        assert_eq!(filter.limit, MAX_EVENT_PAGE_SIZE);
        assert_eq!(filter.page, u64::MAX);
    }
}
