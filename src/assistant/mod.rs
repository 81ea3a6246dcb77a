pub mod knowledge;
pub mod models;
pub mod prompts;
pub mod router;
pub mod state;

pub use models::{Message, MessageContent, Role, SuggestedAction};
pub use router::IntentRouter;
pub use state::{Activity, ConversationState};
