use serde::{Deserialize, Serialize};

use crate::domain::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// A suggestion chip. Clicking it resubmits `payload` as if the user typed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub label: String,   // e.g., "Display all events"
    pub payload: String, // e.g., "display all events"
}

impl SuggestedAction {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Plain {
        text: String,
    },
    Actions {
        actions: Vec<SuggestedAction>,
    },
    /// Detail card for one event; `checkout_label` names the buy button
    EventCard {
        event: Event,
        checkout_label: String,
    },
    Poster {
        title: String,
        copy: String,
    },
    /// Hosted payment page the presentation layer should navigate to
    Redirect {
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
    pub is_rich: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Plain { text: text.into() },
            is_rich: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: MessageContent::Plain { text: text.into() },
            is_rich: false,
        }
    }

    pub fn rich(content: MessageContent) -> Self {
        let is_rich = !matches!(content, MessageContent::Plain { .. });
        Self {
            role: Role::Bot,
            content,
            is_rich,
        }
    }

    pub fn event_card(event: Event) -> Self {
        let checkout_label = if event.is_free { "Get Ticket" } else { "Buy Ticket" };
        Self::rich(MessageContent::EventCard {
            event,
            checkout_label: checkout_label.to_string(),
        })
    }

    /// Plain text body, if this is a plain message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Plain { text } => Some(text),
            _ => None,
        }
    }
}
