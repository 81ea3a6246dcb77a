//! Fixed replies and suggestion sets.

use super::models::SuggestedAction;

pub const GREETING: &str = "I am your Event Analytics Assistant, powered by Gemini AI. I can provide event summaries, perform sentiment analysis, generate posters, or answer custom queries like 'description of an event'. Try requesting 'Display all events' or 'What is the price of test'.";

pub const UNKNOWN: &str = "I do not have sufficient information on that request. Please try 'Display all events' to view available events or ask something like 'description of test'.";

pub const HIGHLIGHTS_PROMPT: &str = "Please provide the name of the event for which you would like detailed highlights, or request 'Display all events' to view a complete list.";

pub const ALL_EVENTS_PENDING: &str = "Retrieving the full list of events... Please wait.";

pub const METRICS_ADVICE: &str = "Key event metrics to track include: attendance rate, participant engagement, session popularity, feedback sentiment, social media mentions, networking effectiveness, and ROI.";

pub const NO_EVENTS: &str = "No events were found. Please check if events are available in the database or try again later.";

pub const NO_EVENTS_FOR_QUERY: &str = "No events were found to process your query. Please try 'Display all events' to check available events.";

pub const CONTINUE_PROMPT: &str = "Please type the name of the event you want to continue with (e.g., 'test').";

pub const SUMMARIZE_PROMPT: &str = "Please provide the name of the event you want to summarize (e.g., 'Summarize test').";

pub const SIGN_IN_REQUIRED: &str = "Please sign in to buy a ticket.";

pub const CHECKOUT_FAILED: &str = "Sorry, we couldn't start the checkout. Please try again later.";

pub const CHECKOUT_EVENT_MISSING: &str = "That event could not be found for checkout. Please display it again and retry.";

/// Trigger phrase → reply; scanned in order, first containment match wins
const CANNED_REPLIES: &[(&str, &str)] = &[
    ("event metrics", METRICS_ADVICE),
    ("event highlights", HIGHLIGHTS_PROMPT),
    ("all events", ALL_EVENTS_PENDING),
];

pub fn canned_reply(normalized: &str) -> Option<&'static str> {
    CANNED_REPLIES
        .iter()
        .find(|(trigger, _)| normalized.contains(trigger))
        .map(|(_, reply)| *reply)
}

pub const DISPLAY_ALL_EVENTS: &str = "display all events";
pub const CONTINUE_WITH_EVENT: &str = "which event do you want to continue with";

pub fn initial_suggestions() -> Vec<SuggestedAction> {
    vec![
        SuggestedAction::new("Provide event highlights", "provide event highlights"),
        SuggestedAction::new("Display all events", DISPLAY_ALL_EVENTS),
        SuggestedAction::new("Summarize an event", "summarize an event"),
    ]
}

/// Offered after the catalog was listed: "display all" swapped for "continue with"
pub fn continue_suggestions() -> Vec<SuggestedAction> {
    let mut actions: Vec<SuggestedAction> = initial_suggestions()
        .into_iter()
        .filter(|a| a.payload != DISPLAY_ALL_EVENTS)
        .collect();
    actions.push(SuggestedAction::new(
        "Which event do you want to continue with?",
        format!("{}?", CONTINUE_WITH_EVENT),
    ));
    actions
}

/// Commands accepted while `event` is selected, as (label, normalized payload)
pub fn scoped_suggestions(event: &str) -> Vec<SuggestedAction> {
    let lower = event.to_lowercase();
    vec![
        SuggestedAction::new(format!("Summarize {}", event), format!("summarize {}", lower)),
        SuggestedAction::new(
            format!("Provide event highlights for {}", event),
            format!("provide event highlights for {}", lower),
        ),
        SuggestedAction::new(
            format!("Sentiment analysis for {}", event),
            format!("sentiment analysis for {}", lower),
        ),
        SuggestedAction::new(
            format!("Generate poster for {}", event),
            format!("generate poster for {}", lower),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_reply_first_match_wins() {
        assert_eq!(canned_reply("show me event metrics"), Some(METRICS_ADVICE));
        assert_eq!(canned_reply("event highlights please"), Some(HIGHLIGHTS_PROMPT));
        assert_eq!(canned_reply("give me all events"), Some(ALL_EVENTS_PENDING));
        assert_eq!(canned_reply("default"), None);
    }

    #[test]
    fn test_continue_suggestions_replace_display_all() {
        let actions = continue_suggestions();
        assert_eq!(actions.len(), 3);
        assert!(actions.iter().all(|a| a.payload != DISPLAY_ALL_EVENTS));
        assert_eq!(
            actions.last().map(|a| a.payload.as_str()),
            Some("which event do you want to continue with?")
        );
    }

    #[test]
    fn test_scoped_payloads_are_lowercase() {
        let actions = scoped_suggestions("Jazz Night");
        assert_eq!(actions[0].label, "Summarize Jazz Night");
        assert_eq!(actions[0].payload, "summarize jazz night");
        assert_eq!(actions[1].payload, "provide event highlights for jazz night");
    }
}
