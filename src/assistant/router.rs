//! Rule-based intent router.
//!
//! Rules are tried in a fixed order and the first one that matches owns the
//! utterance. Every reply is appended to the [`ConversationState`]; nothing is
//! returned to the caller and no client failure escapes as an error.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::knowledge::{self, CONTINUE_WITH_EVENT};
use super::models::{Message, MessageContent};
use super::prompts;
use super::state::ConversationState;
use crate::domain::{CheckoutGateway, CheckoutOrder, ContentGenerator, Event, EventQuery};

static ALL_EVENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(display|show|list) all events\b").unwrap());

static AFTER_FOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfor\b(.*)$").unwrap());

static AFTER_FOR_OR_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:for|of)\b(.*)$").unwrap());

static AFTER_SUMMARIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsummarize\b(.*)$").unwrap());

static FIELD_QUESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:what(?:'s| is) the\s+)?(price|location|description|dates?)\s+(?:of|for)\s+(.+?)\s*\??$",
    )
    .unwrap()
});

static BARE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z\s]+$").unwrap());

static GREETING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(hello|hi|hey)\b").unwrap());

/// Catalog size requested when the whole list is needed
const CATALOG_LIMIT: u32 = 100;

/// Event attribute a field question asks about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventField {
    Price,
    Location,
    Description,
    Dates,
}

impl EventField {
    fn parse(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "price" => Some(Self::Price),
            "location" => Some(Self::Location),
            "description" => Some(Self::Description),
            "date" | "dates" => Some(Self::Dates),
            _ => None,
        }
    }

    fn answer(self, event: &Event) -> String {
        match self {
            Self::Price if event.is_free => format!("\"{}\" is free to attend.", event.title),
            Self::Price => format!("The price of \"{}\" is {}.", event.title, event.display_price()),
            Self::Location => format!("\"{}\" takes place at: {}.", event.title, event.display_location()),
            Self::Description => {
                format!("Description of \"{}\": {}", event.title, event.display_description())
            }
            Self::Dates => format!("\"{}\" runs {}.", event.title, event.display_dates()),
        }
    }
}

/// Text following the first whole-word match of `pattern`, trimmed; `None` when empty
fn text_after(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

pub struct IntentRouter {
    events: Arc<dyn EventQuery>,
    generator: Arc<dyn ContentGenerator>,
    checkout: Arc<dyn CheckoutGateway>,
}

impl IntentRouter {
    pub fn new(
        events: Arc<dyn EventQuery>,
        generator: Arc<dyn ContentGenerator>,
        checkout: Arc<dyn CheckoutGateway>,
    ) -> Self {
        Self {
            events,
            generator,
            checkout,
        }
    }

    /// Greet a freshly opened (or reset) conversation
    pub fn open(&self, state: &mut ConversationState) {
        if state.messages().is_empty() {
            state.say(knowledge::GREETING);
            state.offer(knowledge::initial_suggestions());
        }
    }

    /// Record a user utterance and answer it
    pub async fn submit(&self, text: &str, state: &mut ConversationState) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        state.push(Message::user(text));
        state.set_typing(true);
        self.handle(text, state).await;
        state.set_typing(false);
    }

    /// Classify one utterance and run the matching flow
    pub async fn handle(&self, utterance: &str, state: &mut ConversationState) {
        let original = utterance.trim();
        let normalized = original.to_lowercase();

        if state.awaiting_event_name() {
            tracing::debug!("Treating '{}' as the awaited event name", original);
            self.show_event_highlights(original, state).await;
            return;
        }

        if ALL_EVENTS.is_match(&normalized) {
            self.show_all_events(state).await;
            return;
        }

        if normalized.contains(CONTINUE_WITH_EVENT) {
            state.say(knowledge::CONTINUE_PROMPT);
            return;
        }

        if normalized == "summarize an event" {
            state.say(knowledge::SUMMARIZE_PROMPT);
            return;
        }

        if normalized.contains("provide event highlights") {
            match text_after(&AFTER_FOR, original) {
                Some(name) => {
                    let name = canonical_name(name, state);
                    self.show_event_highlights(&name, state).await;
                }
                None => {
                    state.set_awaiting_event_name(true);
                    state.say(knowledge::HIGHLIGHTS_PROMPT);
                }
            }
            return;
        }

        if normalized.contains("summarize")
            && let Some(name) = text_after(&AFTER_SUMMARIZE, original)
        {
            let name = canonical_name(name, state);
            self.summarize_event(&name, state).await;
            return;
        }

        if normalized.contains("sentiment")
            && let Some(name) = text_after(&AFTER_FOR_OR_OF, original)
            && in_scope(&name, state)
        {
            let name = canonical_name(name, state);
            self.analyze_sentiment(&name, state).await;
            return;
        }

        if normalized.contains("poster")
            && let Some(name) = text_after(&AFTER_FOR_OR_OF, original)
            && in_scope(&name, state)
        {
            let name = canonical_name(name, state);
            self.generate_poster(&name, state).await;
            return;
        }

        if let Some(caps) = FIELD_QUESTION.captures(original)
            && let Some(field) = EventField::parse(&caps[1])
            && in_scope(caps[2].trim(), state)
        {
            let name = canonical_name(caps[2].trim().to_string(), state);
            self.answer_field(field, &name, state).await;
            return;
        }

        if let Some(selected) = state.selected_event().map(str::to_string) {
            self.handle_scoped(&normalized, &selected, state).await;
            return;
        }

        if (normalized == "test" || BARE_NAME.is_match(&normalized))
            && self.select_event(original, state).await
        {
            return;
        }

        if let Some(reply) = knowledge::canned_reply(&normalized) {
            state.say(reply);
            return;
        }

        if normalized.contains("event") {
            self.answer_custom_query(original, state).await;
            return;
        }

        if GREETING.is_match(&normalized) {
            state.say(knowledge::GREETING);
        } else {
            state.say(knowledge::UNKNOWN);
        }
        state.offer(knowledge::initial_suggestions());
    }

    /// Only the selected event's commands are accepted; everything else re-prompts
    async fn handle_scoped(&self, normalized: &str, selected: &str, state: &mut ConversationState) {
        let event = selected.to_lowercase();

        if normalized == format!("summarize {}", event) {
            self.summarize_event(selected, state).await;
        } else if normalized == format!("provide event highlights for {}", event) {
            self.show_event_highlights(selected, state).await;
        } else if normalized == format!("sentiment analysis for {}", event) {
            self.analyze_sentiment(selected, state).await;
        } else if normalized == format!("generate poster for {}", event) {
            self.generate_poster(selected, state).await;
        } else {
            state.say(format!(
                "I'm currently focused on \"{}\". Please use one of these options:",
                selected
            ));
            state.offer(knowledge::scoped_suggestions(selected));
        }
    }

    async fn show_all_events(&self, state: &mut ConversationState) {
        state.say(knowledge::ALL_EVENTS_PENDING);

        state.set_typing(true);
        let events = self.events.list_events("", 1, CATALOG_LIMIT).await;
        state.set_typing(false);

        if events.is_empty() {
            state.say(knowledge::NO_EVENTS);
            state.offer(knowledge::initial_suggestions());
            return;
        }

        tracing::debug!("Displaying {} events", events.len());
        for event in events {
            state.push(Message::event_card(event));
        }
        state.offer(knowledge::continue_suggestions());
    }

    async fn show_event_highlights(&self, name: &str, state: &mut ConversationState) {
        state.say(format!("Retrieving details for \"{}\"... Please wait.", name));

        state.set_typing(true);
        let event = self.events.get_by_name(name).await;
        state.set_typing(false);

        match event {
            Some(event) => state.push(Message::event_card(event)),
            None => state.say(not_found(name)),
        }
        state.set_awaiting_event_name(false);
    }

    /// Pin the event named by `name` if the catalog knows it
    async fn select_event(&self, name: &str, state: &mut ConversationState) -> bool {
        let Some(event) = self.events.get_by_name(name).await else {
            return false;
        };

        tracing::info!("Conversation narrowed to event '{}'", event.title);
        state.say(format!(
            "You have selected \"{}\". Now I will assist you with this event only.",
            event.title
        ));
        state.offer(knowledge::scoped_suggestions(&event.title));
        state.select_event(event.title);
        true
    }

    async fn summarize_event(&self, name: &str, state: &mut ConversationState) {
        state.set_generating(true);
        let reply = match self.events.get_by_name(name).await {
            Some(event) => {
                let summary = self.generator.complete(&prompts::summary(&event)).await;
                format!("Summary of \"{}\": {}", name, summary)
            }
            None => format!(
                "The event \"{}\" could not be located for summarization. Please check the event name or use 'Display all events'.",
                name
            ),
        };
        state.set_generating(false);
        state.say(reply);
    }

    async fn analyze_sentiment(&self, name: &str, state: &mut ConversationState) {
        state.set_generating(true);
        let reply = match self.events.get_by_name(name).await {
            Some(event) => {
                let sentiment = self.generator.complete(&prompts::sentiment(&event)).await;
                format!("Sentiment analysis for \"{}\": {}", name, sentiment)
            }
            None => format!(
                "The event \"{}\" could not be found for sentiment analysis. Please verify the event name or try 'Display all events' to view available events.",
                name
            ),
        };
        state.set_generating(false);
        state.say(reply);
    }

    async fn generate_poster(&self, name: &str, state: &mut ConversationState) {
        state.set_generating(true);
        match self.events.get_by_name(name).await {
            Some(event) => {
                let copy = self.generator.complete(&prompts::poster(&event)).await;
                state.set_generating(false);
                state.push(Message::rich(MessageContent::Poster {
                    title: event.title,
                    copy,
                }));
            }
            None => {
                state.set_generating(false);
                state.say(format!(
                    "The event \"{}\" could not be found to generate a poster description. Please check the event name or use 'Display all events'.",
                    name
                ));
            }
        }
    }

    async fn answer_field(&self, field: EventField, name: &str, state: &mut ConversationState) {
        state.set_typing(true);
        let event = self.events.get_by_name(name).await;
        state.set_typing(false);

        match event {
            Some(event) => state.say(field.answer(&event)),
            None => state.say(not_found(name)),
        }
    }

    async fn answer_custom_query(&self, query: &str, state: &mut ConversationState) {
        state.set_generating(true);
        let events = self.events.list_events("", 1, CATALOG_LIMIT).await;
        if events.is_empty() {
            state.set_generating(false);
            state.say(knowledge::NO_EVENTS_FOR_QUERY);
            return;
        }

        let reply = self
            .generator
            .complete(&prompts::custom_query(&events, query))
            .await;
        state.set_generating(false);
        state.say(reply);
    }

    /// Buy (or claim) a ticket for an event whose detail card is in the transcript
    pub async fn checkout(&self, event_id: &str, state: &mut ConversationState) {
        let Some(event) = state.find_event_card(event_id).cloned() else {
            state.say(knowledge::CHECKOUT_EVENT_MISSING);
            return;
        };

        let Some(buyer_id) = state.buyer_id().map(str::to_string) else {
            state.say(knowledge::SIGN_IN_REQUIRED);
            return;
        };

        let order = CheckoutOrder::for_event(&event, &buyer_id);

        state.set_typing(true);
        let result = self.checkout.create_session(&order).await;
        state.set_typing(false);

        match result {
            Ok(url) => {
                state.say(format!("Redirecting you to checkout for \"{}\"...", event.title));
                state.push(Message::rich(MessageContent::Redirect { url }));
            }
            Err(e) => {
                tracing::warn!("Checkout for event {} failed: {}", event.id, e);
                state.say(knowledge::CHECKOUT_FAILED);
            }
        }
    }
}

fn not_found(name: &str) -> String {
    format!(
        "The event \"{}\" could not be found. Please verify the event name or try 'Display all events' to see available options.",
        name
    )
}

/// Sentiment, poster and field questions only target the selected event while one is pinned
fn in_scope(name: &str, state: &ConversationState) -> bool {
    state
        .selected_event()
        .is_none_or(|selected| selected.eq_ignore_ascii_case(name))
}

/// Refer to the selected event by its catalog title when the user names it
fn canonical_name(name: String, state: &ConversationState) -> String {
    match state.selected_event() {
        Some(selected) if selected.eq_ignore_ascii_case(&name) => selected.to_string(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::models::{Role, SuggestedAction};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    struct FakeCatalog {
        events: Vec<Event>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeCatalog {
        fn new(events: Vec<Event>) -> Arc<Self> {
            Arc::new(Self {
                events,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl EventQuery for FakeCatalog {
        async fn list_events(&self, query: &str, _page: u32, limit: u32) -> Vec<Event> {
            self.queries.lock().unwrap().push(query.to_string());
            let needle = query.to_lowercase();
            self.events
                .iter()
                .filter(|e| e.title.to_lowercase().contains(&needle))
                .take(limit as usize)
                .cloned()
                .collect()
        }
    }

    struct FakeGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ContentGenerator for FakeGenerator {
        async fn complete(&self, prompt: &str) -> String {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    struct FakeCheckout {
        result: Result<String, String>,
        orders: Mutex<Vec<CheckoutOrder>>,
    }

    impl FakeCheckout {
        fn new(result: Result<String, String>) -> Arc<Self> {
            Arc::new(Self {
                result,
                orders: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CheckoutGateway for FakeCheckout {
        async fn create_session(&self, order: &CheckoutOrder) -> Result<String, String> {
            self.orders.lock().unwrap().push(order.clone());
            self.result.clone()
        }
    }

    fn event(id: &str, title: &str, is_free: bool) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            description: Some(format!("All about {}", title)),
            start_date_time: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            end_date_time: Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap(),
            location: Some("Main Hall".to_string()),
            price: if is_free { None } else { Some("25".to_string()) },
            is_free,
            image_url: None,
            url: None,
            category: None,
            organizer: None,
        }
    }

    struct Harness {
        router: IntentRouter,
        catalog: Arc<FakeCatalog>,
        generator: Arc<FakeGenerator>,
        checkout: Arc<FakeCheckout>,
    }

    fn harness(events: Vec<Event>) -> Harness {
        let catalog = FakeCatalog::new(events);
        let generator = FakeGenerator::new("<completion>");
        let checkout = FakeCheckout::new(Ok("https://pay.example/session".to_string()));
        Harness {
            router: IntentRouter::new(catalog.clone(), generator.clone(), checkout.clone()),
            catalog,
            generator,
            checkout,
        }
    }

    fn texts(messages: &[Message]) -> Vec<String> {
        messages.iter().filter_map(|m| m.text().map(str::to_string)).collect()
    }

    fn cards(messages: &[Message]) -> Vec<&Event> {
        messages
            .iter()
            .filter_map(|m| match &m.content {
                MessageContent::EventCard { event, .. } => Some(event),
                _ => None,
            })
            .collect()
    }

    fn action_sets(messages: &[Message]) -> Vec<&Vec<SuggestedAction>> {
        messages
            .iter()
            .filter_map(|m| match &m.content {
                MessageContent::Actions { actions } => Some(actions),
                _ => None,
            })
            .collect()
    }

    async fn selected(h: &Harness, name: &str) -> ConversationState {
        let mut state = ConversationState::new(Some("user_1".to_string()));
        h.router.handle(name, &mut state).await;
        assert!(state.selected_event().is_some(), "selection of '{}' failed", name);
        state
    }

    #[tokio::test]
    async fn test_display_all_events_renders_cards_then_continue_chip() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = ConversationState::default();

        h.router.handle("display all events", &mut state).await;

        let messages = state.messages();
        assert_eq!(texts(messages), vec![knowledge::ALL_EVENTS_PENDING.to_string()]);
        let shown = cards(messages);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Test");

        let chips = action_sets(messages);
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0], &knowledge::continue_suggestions());
        assert!(matches!(
            messages.last().map(|m| &m.content),
            Some(MessageContent::Actions { .. })
        ));
    }

    #[tokio::test]
    async fn test_display_all_events_twice_is_structurally_identical() {
        let h = harness(vec![event("1", "Test", true), event("2", "Jazz Night", false)]);
        let mut state = ConversationState::default();

        h.router.handle("show all events", &mut state).await;
        let first: Vec<Message> = state.messages().to_vec();
        h.router.handle("list all events", &mut state).await;
        let second = state.messages_since(first.len());

        assert_eq!(first.as_slice(), second);
        assert_eq!(action_sets(second).len(), 1);
    }

    #[tokio::test]
    async fn test_display_all_events_with_empty_catalog() {
        let h = harness(vec![]);
        let mut state = ConversationState::default();

        h.router.handle("Display all events", &mut state).await;

        assert!(cards(state.messages()).is_empty());
        assert!(texts(state.messages()).contains(&knowledge::NO_EVENTS.to_string()));
        assert_eq!(action_sets(state.messages())[0], &knowledge::initial_suggestions());
    }

    #[tokio::test]
    async fn test_highlights_without_name_awaits_next_utterance() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = ConversationState::default();

        h.router.handle("provide event highlights", &mut state).await;
        assert!(state.awaiting_event_name());
        assert_eq!(texts(state.messages()), vec![knowledge::HIGHLIGHTS_PROMPT.to_string()]);

        h.router.handle("Test", &mut state).await;
        assert!(!state.awaiting_event_name());
        assert_eq!(cards(state.messages()).len(), 1);
        // Resolved by the awaiting rule, not by selection
        assert_eq!(state.selected_event(), None);
    }

    #[tokio::test]
    async fn test_highlights_with_name_after_for() {
        let h = harness(vec![event("1", "Jazz Night", false)]);
        let mut state = ConversationState::default();

        h.router
            .handle("Provide event highlights for Jazz Night", &mut state)
            .await;

        assert_eq!(*h.catalog.queries.lock().unwrap(), vec!["Jazz Night".to_string()]);
        assert_eq!(cards(state.messages())[0].id, "1");
    }

    #[tokio::test]
    async fn test_highlights_for_unknown_event() {
        let h = harness(vec![]);
        let mut state = ConversationState::default();
        state.set_awaiting_event_name(true);

        h.router.handle("Nope", &mut state).await;

        assert!(!state.awaiting_event_name());
        assert!(texts(state.messages()).contains(&not_found("Nope")));
    }

    #[tokio::test]
    async fn test_summarize_selected_event_uses_catalog_title() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = selected(&h, "test").await;
        assert_eq!(state.selected_event(), Some("Test"));

        h.router.handle("summarize test", &mut state).await;

        let last = state.messages().last().and_then(|m| m.text()).unwrap();
        assert_eq!(last, "Summary of \"Test\": <completion>");
        let prompts = h.generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Title: Test"));
        assert!(!state.is_generating());
    }

    #[tokio::test]
    async fn test_summarize_an_event_asks_for_name() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = ConversationState::default();

        h.router.handle("Summarize an event", &mut state).await;

        assert_eq!(texts(state.messages()), vec![knowledge::SUMMARIZE_PROMPT.to_string()]);
        assert!(h.generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_missing_event() {
        let h = harness(vec![]);
        let mut state = ConversationState::default();

        h.router.handle("summarize Ghost Fest", &mut state).await;

        let last = state.messages().last().and_then(|m| m.text()).unwrap();
        assert!(last.starts_with("The event \"Ghost Fest\" could not be located for summarization"));
        assert!(h.generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selected_event_blocks_global_rules() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = selected(&h, "Test").await;
        let before = state.messages().len();

        // Would hit the canned metrics reply without a selection
        h.router.handle("event metrics", &mut state).await;

        let new = state.messages_since(before);
        assert_eq!(
            texts(new),
            vec!["I'm currently focused on \"Test\". Please use one of these options:".to_string()]
        );
        assert_eq!(action_sets(new)[0], &knowledge::scoped_suggestions("Test"));
        assert!(h.generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selected_event_blocks_flows_for_other_events() {
        let h = harness(vec![event("1", "Test", true), event("2", "Jazz Night", false)]);
        let mut state = selected(&h, "Test").await;
        let queries_before = h.catalog.queries.lock().unwrap().len();

        for utterance in [
            "what is the price of Jazz Night",
            "sentiment analysis for Jazz Night",
            "generate poster for Jazz Night",
        ] {
            let before = state.messages().len();
            h.router.handle(utterance, &mut state).await;

            let new = state.messages_since(before);
            assert_eq!(
                texts(new),
                vec!["I'm currently focused on \"Test\". Please use one of these options:".to_string()],
                "'{}' escaped the selected event",
                utterance
            );
            assert_eq!(action_sets(new)[0], &knowledge::scoped_suggestions("Test"));
        }

        assert_eq!(h.catalog.queries.lock().unwrap().len(), queries_before);
        assert!(h.generator.prompts.lock().unwrap().is_empty());
        assert_eq!(state.selected_event(), Some("Test"));
    }

    #[tokio::test]
    async fn test_field_question_about_selected_event_is_answered() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = selected(&h, "Test").await;

        h.router.handle("price of test", &mut state).await;

        assert_eq!(
            state.messages().last().and_then(|m| m.text()),
            Some("\"Test\" is free to attend.")
        );
    }

    #[tokio::test]
    async fn test_scoped_commands_run_event_flows() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = selected(&h, "test").await;

        h.router.handle("sentiment analysis for test", &mut state).await;
        assert_eq!(
            state.messages().last().and_then(|m| m.text()),
            Some("Sentiment analysis for \"Test\": <completion>")
        );

        h.router.handle("generate poster for test", &mut state).await;
        assert_eq!(
            state.messages().last().map(|m| &m.content),
            Some(&MessageContent::Poster {
                title: "Test".to_string(),
                copy: "<completion>".to_string()
            })
        );

        h.router.handle("provide event highlights for test", &mut state).await;
        assert_eq!(cards(state.messages()).last().map(|e| e.title.as_str()), Some("Test"));

        // Every lookup made while scoped targeted the selected event
        assert!(
            h.catalog
                .queries
                .lock()
                .unwrap()
                .iter()
                .all(|q| q.eq_ignore_ascii_case("test"))
        );
        assert_eq!(state.selected_event(), Some("Test"));
    }

    #[tokio::test]
    async fn test_bare_name_that_is_not_an_event_falls_through() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = ConversationState::default();

        h.router.handle("hello", &mut state).await;

        assert_eq!(state.selected_event(), None);
        assert_eq!(texts(state.messages()), vec![knowledge::GREETING.to_string()]);
        assert_eq!(action_sets(state.messages())[0], &knowledge::initial_suggestions());
    }

    #[tokio::test]
    async fn test_canned_reply_for_metrics() {
        let h = harness(vec![]);
        let mut state = ConversationState::default();

        h.router.handle("What are good event metrics?", &mut state).await;

        assert_eq!(texts(state.messages()), vec![knowledge::METRICS_ADVICE.to_string()]);
    }

    #[tokio::test]
    async fn test_custom_query_sends_catalog_projection() {
        let h = harness(vec![event("1", "Test", true), event("2", "Jazz Night", false)]);
        let mut state = ConversationState::default();

        h.router
            .handle("Which event is cheapest in June?", &mut state)
            .await;

        assert_eq!(texts(state.messages()), vec!["<completion>".to_string()]);
        let prompts = h.generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("\"title\":\"Jazz Night\""));
        assert!(prompts[0].ends_with("\"Which event is cheapest in June?\""));
    }

    #[tokio::test]
    async fn test_custom_query_with_empty_catalog() {
        let h = harness(vec![]);
        let mut state = ConversationState::default();

        h.router.handle("any events near me?", &mut state).await;

        assert_eq!(texts(state.messages()), vec![knowledge::NO_EVENTS_FOR_QUERY.to_string()]);
        assert!(h.generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_request() {
        let h = harness(vec![]);
        let mut state = ConversationState::default();

        h.router.handle("42?", &mut state).await;

        assert_eq!(texts(state.messages()), vec![knowledge::UNKNOWN.to_string()]);
        assert_eq!(action_sets(state.messages()).len(), 1);
    }

    #[tokio::test]
    async fn test_field_questions_answer_directly() {
        let h = harness(vec![event("1", "Test", true), event("2", "Jazz Night", false)]);
        let mut state = ConversationState::default();

        h.router.handle("What is the price of Jazz Night?", &mut state).await;
        h.router.handle("price of test", &mut state).await;
        h.router.handle("location of Jazz Night", &mut state).await;

        assert_eq!(
            texts(state.messages()),
            vec![
                "The price of \"Jazz Night\" is 25.".to_string(),
                "\"Test\" is free to attend.".to_string(),
                "\"Jazz Night\" takes place at: Main Hall.".to_string(),
            ]
        );
        assert!(h.generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_records_user_message() {
        let h = harness(vec![]);
        let mut state = ConversationState::default();

        h.router.submit("  hey  ", &mut state).await;
        h.router.submit("   ", &mut state).await;

        let messages = state.messages();
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text(), Some("hey"));
        assert_eq!(messages[1].role, Role::Bot);
        assert_eq!(messages.len(), 3);
        assert!(!state.is_typing());
    }

    #[tokio::test]
    async fn test_open_greets_once() {
        let h = harness(vec![]);
        let mut state = ConversationState::default();

        h.router.open(&mut state);
        h.router.open(&mut state);

        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[0].text(), Some(knowledge::GREETING));
    }

    #[tokio::test]
    async fn test_checkout_free_event_submits_zero_price() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = ConversationState::new(Some("user_1".to_string()));
        h.router.handle("display all events", &mut state).await;

        h.router.checkout("1", &mut state).await;

        let orders = h.checkout.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].price, "0");
        assert!(orders[0].is_free);
        assert_eq!(orders[0].buyer_id, "user_1");
        assert_eq!(
            state.messages().last().map(|m| &m.content),
            Some(&MessageContent::Redirect {
                url: "https://pay.example/session".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_checkout_requires_buyer_and_card() {
        let h = harness(vec![event("1", "Test", true)]);
        let mut state = ConversationState::default();

        h.router.checkout("1", &mut state).await;
        assert_eq!(
            state.messages().last().and_then(|m| m.text()),
            Some(knowledge::CHECKOUT_EVENT_MISSING)
        );

        h.router.handle("display all events", &mut state).await;
        h.router.checkout("1", &mut state).await;
        assert_eq!(
            state.messages().last().and_then(|m| m.text()),
            Some(knowledge::SIGN_IN_REQUIRED)
        );
        assert!(h.checkout.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_failure_becomes_chat_message() {
        let catalog = FakeCatalog::new(vec![event("1", "Jazz Night", false)]);
        let checkout = FakeCheckout::new(Err("Failed to initiate checkout".to_string()));
        let router = IntentRouter::new(catalog, FakeGenerator::new("x"), checkout.clone());
        let mut state = ConversationState::new(Some("user_1".to_string()));

        router.handle("display all events", &mut state).await;
        router.checkout("1", &mut state).await;

        assert_eq!(checkout.orders.lock().unwrap()[0].price, "25");
        assert_eq!(
            state.messages().last().and_then(|m| m.text()),
            Some(knowledge::CHECKOUT_FAILED)
        );
    }
}
