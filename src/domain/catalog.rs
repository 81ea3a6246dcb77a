//! Event catalog types and the gateways the assistant talks through.
//!
//! The assistant never owns events or orders: it reads events from a catalog
//! and hands orders to a checkout service. Both sit behind the traits below so
//! the intent router can run against HTTP clients in production and fakes in
//! tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event category as exposed by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCategory {
    pub name: String,
}

/// Event organizer as exposed by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOrganizer {
    pub first_name: String,
    pub last_name: String,
}

/// One catalog event, in the catalog's JSON shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub organizer: Option<EventOrganizer>,
}

impl Event {
    /// Price as shown to users: "Free", the catalog price, or a placeholder
    pub fn display_price(&self) -> String {
        if self.is_free {
            return "Free".to_string();
        }
        match self.price.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => "Not specified".to_string(),
        }
    }

    pub fn display_description(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "No description available",
        }
    }

    pub fn display_location(&self) -> &str {
        match self.location.as_deref() {
            Some(l) if !l.is_empty() => l,
            _ => "Not specified",
        }
    }

    /// "start - end" in the same locale style the cards use
    pub fn display_dates(&self) -> String {
        format!(
            "{} - {}",
            format_event_time(&self.start_date_time),
            format_event_time(&self.end_date_time)
        )
    }
}

/// en-US style timestamp, e.g. `3/14/2025, 6:30:00 PM`
pub fn format_event_time(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Order descriptor submitted to the checkout service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub event_title: String,
    pub event_id: String,
    pub price: String,
    pub is_free: bool,
    pub buyer_id: String,
}

impl CheckoutOrder {
    /// Build the order for `event`; free events always carry a zero price
    pub fn for_event(event: &Event, buyer_id: &str) -> Self {
        let price = if event.is_free {
            "0".to_string()
        } else {
            event.price.clone().unwrap_or_else(|| "0".to_string())
        };

        Self {
            event_title: event.title.clone(),
            event_id: event.id.clone(),
            price,
            is_free: event.is_free,
            buyer_id: buyer_id.to_string(),
        }
    }
}

/// Read access to the event catalog.
///
/// Failures are swallowed by implementations: an unreachable catalog looks
/// exactly like an empty one.
#[async_trait]
pub trait EventQuery: Send + Sync {
    async fn list_events(&self, query: &str, page: u32, limit: u32) -> Vec<Event>;

    /// First catalog match for `name`; matching is whatever the catalog search does
    async fn get_by_name(&self, name: &str) -> Option<Event> {
        self.list_events(name, 1, 1).await.into_iter().next()
    }
}

/// Free-text completion service. Never fails; errors become an apology string.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> String;
}

/// Hosted payment page creation
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Returns the URL the buyer should be redirected to
    async fn create_session(&self, order: &CheckoutOrder) -> Result<String, String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        Event {
            id: "42".to_string(),
            title: "Rust Meetup".to_string(),
            description: None,
            start_date_time: Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap(),
            end_date_time: Utc.with_ymd_and_hms(2025, 3, 14, 21, 0, 0).unwrap(),
            location: Some(String::new()),
            price: Some("25".to_string()),
            is_free: false,
            image_url: None,
            url: None,
            category: None,
            organizer: Some(EventOrganizer {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            }),
        }
    }

    #[test]
    fn test_display_helpers_fall_back_to_placeholders() {
        let event = sample_event();
        assert_eq!(event.display_price(), "25");
        assert_eq!(event.display_description(), "No description available");
        assert_eq!(event.display_location(), "Not specified");
        assert_eq!(
            event.display_dates(),
            "3/14/2025, 6:30:00 PM - 3/14/2025, 9:00:00 PM"
        );
    }

    #[test]
    fn test_free_event_order_has_zero_price() {
        let mut event = sample_event();
        event.is_free = true;

        let order = CheckoutOrder::for_event(&event, "user_1");
        assert_eq!(order.price, "0");
        assert!(order.is_free);
        assert_eq!(order.event_id, "42");
    }

    #[test]
    fn test_event_accepts_mongo_style_id() {
        let json = serde_json::json!({
            "_id": "abc123",
            "title": "Test",
            "startDateTime": "2025-01-01T10:00:00Z",
            "endDateTime": "2025-01-01T12:00:00Z",
            "isFree": true,
            "category": { "name": "Tech" }
        });

        let event: Event = serde_json::from_value(json).unwrap();
        assert_eq!(event.id, "abc123");
        assert!(event.is_free);
        assert_eq!(event.category.unwrap().name, "Tech");
    }
}
