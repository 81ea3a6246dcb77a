//! Prompts sent to the content generation service

use serde_json::{Value, json};

use crate::domain::{Event, format_event_time};

pub fn summary(event: &Event) -> String {
    format!(
        "Provide a concise summary of the following event: Title: {}, Description: {}, Date: {}",
        event.title,
        event.description.as_deref().unwrap_or_default(),
        event.display_dates()
    )
}

pub fn sentiment(event: &Event) -> String {
    format!(
        "Perform a sentiment analysis on the following event description: \"{}\"",
        event.description.as_deref().unwrap_or_default()
    )
}

pub fn poster(event: &Event) -> String {
    format!(
        "Generate a concise, creative poster description for an event titled \"{}\" with the description \"{}\" occurring on {}. Include a compelling tagline and essential details in a single paragraph, formatted for display.",
        event.title,
        event.description.as_deref().unwrap_or_default(),
        format_event_time(&event.start_date_time)
    )
}

/// Free-form question answered over a compact projection of the catalog
pub fn custom_query(events: &[Event], query: &str) -> String {
    let projection: Vec<Value> = events
        .iter()
        .map(|e| {
            json!({
                "title": e.title,
                "price": e.display_price(),
                "description": e.display_description(),
                "date": e.display_dates(),
            })
        })
        .collect();

    format!(
        "Here is a list of events: {}. Based on this data, answer the following query: \"{}\"",
        Value::Array(projection),
        query
    )
}
