//! Application state containing repositories, clients and chat sessions

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::assistant::IntentRouter;
use crate::domain::{EventRepository, OrderRepository, UserRepository};
use crate::infrastructure::config::Config;
use crate::infrastructure::sessions::SessionStore;
use crate::infrastructure::{SeaOrmEventRepository, SeaOrmOrderRepository, SeaOrmUserRepository};
use crate::modules::integrations::{
    BackendClient, GeminiClient, IntegrationError, StripeClient, WebhookVerifier,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub event_repo: Arc<dyn EventRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub order_repo: Arc<dyn OrderRepository>,
    /// Open chat widgets
    pub sessions: SessionStore,
    pub assistant: Arc<IntentRouter>,
    pub gemini: Arc<GeminiClient>,
    pub stripe: Arc<StripeClient>,
    pub webhooks: Arc<WebhookVerifier>,
}

impl AppState {
    /// Wire repositories and outbound clients from `config`.
    ///
    /// The assistant reaches the catalog, generation and checkout through
    /// `config.assistant_api_url`, normally this same server.
    pub fn new(db: DatabaseConnection, config: &Config) -> Result<Self, IntegrationError> {
        let backend = Arc::new(BackendClient::new(
            &config.assistant_api_url,
            config.http_timeout,
        )?);
        let assistant = IntentRouter::new(backend.clone(), backend.clone(), backend);

        Ok(Self {
            event_repo: Arc::new(SeaOrmEventRepository::new(db.clone())),
            user_repo: Arc::new(SeaOrmUserRepository::new(db.clone())),
            order_repo: Arc::new(SeaOrmOrderRepository::new(db.clone())),
            db,
            sessions: SessionStore::new(),
            assistant: Arc::new(assistant),
            gemini: Arc::new(GeminiClient::new(&config.gemini, config.http_timeout)?),
            stripe: Arc::new(StripeClient::new(
                &config.stripe,
                &config.public_server_url,
                config.http_timeout,
            )?),
            webhooks: Arc::new(WebhookVerifier::new(&config.stripe)),
        })
    }
}

impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
