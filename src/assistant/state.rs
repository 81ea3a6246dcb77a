//! Per-session conversation state.
//!
//! Created when the widget opens, mutated only by the intent router, and
//! thrown away on reset or when the session is closed. Nothing here is
//! persisted.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::models::{Message, MessageContent, SuggestedAction};
use crate::domain::Event;

/// Typing and generating indicators.
///
/// Shared between the conversation and its session entry so the widget can
/// poll them while an utterance still holds the conversation.
#[derive(Debug, Clone, Default)]
pub struct Activity(Arc<ActivityFlags>);

#[derive(Debug, Default)]
struct ActivityFlags {
    typing: AtomicBool,
    generating: AtomicBool,
}

impl Activity {
    pub fn is_typing(&self) -> bool {
        self.0.typing.load(Ordering::Acquire)
    }

    pub fn is_generating(&self) -> bool {
        self.0.generating.load(Ordering::Acquire)
    }

    fn set_typing(&self, typing: bool) {
        self.0.typing.store(typing, Ordering::Release);
    }

    fn set_generating(&self, generating: bool) {
        self.0.generating.store(generating, Ordering::Release);
    }

    fn clear(&self) {
        self.set_typing(false);
        self.set_generating(false);
    }
}

impl Serialize for Activity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Activity", 2)?;
        s.serialize_field("is_typing", &self.is_typing())?;
        s.serialize_field("is_generating", &self.is_generating())?;
        s.end()
    }
}

#[derive(Debug, Default, serde::Serialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    selected_event: Option<String>,
    awaiting_event_name: bool,
    #[serde(flatten)]
    activity: Activity,
    buyer_id: Option<String>,
}

impl ConversationState {
    pub fn new(buyer_id: Option<String>) -> Self {
        Self {
            buyer_id,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages appended after the first `len` ones
    pub fn messages_since(&self, len: usize) -> &[Message] {
        self.messages.get(len..).unwrap_or(&[])
    }

    pub fn selected_event(&self) -> Option<&str> {
        self.selected_event.as_deref()
    }

    pub fn awaiting_event_name(&self) -> bool {
        self.awaiting_event_name
    }

    pub fn is_typing(&self) -> bool {
        self.activity.is_typing()
    }

    pub fn is_generating(&self) -> bool {
        self.activity.is_generating()
    }

    /// Handle on the indicators that stays readable while the conversation is locked
    pub fn activity(&self) -> Activity {
        self.activity.clone()
    }

    pub fn buyer_id(&self) -> Option<&str> {
        self.buyer_id.as_deref()
    }

    /// Restart the dialogue. The buyer stays: it belongs to the widget owner.
    /// Outstanding [`Activity`] handles keep tracking this conversation.
    pub fn reset(&mut self) {
        let activity = std::mem::take(&mut self.activity);
        activity.clear();
        *self = Self {
            activity,
            ..Self::new(self.buyer_id.take())
        };
    }

    pub(super) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(super) fn say(&mut self, text: impl Into<String>) {
        self.push(Message::bot(text));
    }

    pub(super) fn offer(&mut self, actions: Vec<SuggestedAction>) {
        self.push(Message::rich(MessageContent::Actions { actions }));
    }

    pub(super) fn select_event(&mut self, title: String) {
        self.selected_event = Some(title);
    }

    pub(super) fn set_awaiting_event_name(&mut self, awaiting: bool) {
        self.awaiting_event_name = awaiting;
    }

    pub(super) fn set_typing(&mut self, typing: bool) {
        self.activity.set_typing(typing);
    }

    pub(super) fn set_generating(&mut self, generating: bool) {
        self.activity.set_generating(generating);
    }

    /// Most recent detail card shown for `event_id`
    pub fn find_event_card(&self, event_id: &str) -> Option<&Event> {
        self.messages.iter().rev().find_map(|m| match &m.content {
            MessageContent::EventCard { event, .. } if event.id == event_id => Some(event),
            _ => None,
        })
    }
}
