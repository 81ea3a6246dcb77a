use secrecy::SecretString;
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Public base URL of the web application (payment success/cancel pages)
    pub public_server_url: String,
    /// Base URL the assistant's clients call for events, generation and checkout
    pub assistant_api_url: String,
    pub gemini: GeminiConfig,
    pub stripe: StripeConfig,
    pub http_timeout: Duration,
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
}

#[derive(Clone)]
pub struct StripeConfig {
    pub api_url: String,
    pub secret_key: Option<SecretString>,
    pub webhook_secret: Option<SecretString>,
    /// Maximum age of a signed webhook timestamp
    pub webhook_tolerance: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let public_server_url = env::var("PUBLIC_SERVER_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let assistant_api_url = env::var("ASSISTANT_API_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{}/api", port));

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://event_assistant.db?mode=rwc".to_string()),
            port,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            public_server_url: public_server_url.trim_end_matches('/').to_string(),
            assistant_api_url: assistant_api_url.trim_end_matches('/').to_string(),
            gemini: GeminiConfig {
                api_url: env::var("GEMINI_API_URL")
                    .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
                api_key: secret_var("GEMINI_API_KEY"),
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            },
            stripe: StripeConfig {
                api_url: env::var("STRIPE_API_URL")
                    .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
                secret_key: secret_var("STRIPE_SECRET_KEY"),
                webhook_secret: secret_var("STRIPE_WEBHOOK_SECRET"),
                webhook_tolerance: Duration::from_secs(
                    env::var("STRIPE_WEBHOOK_TOLERANCE_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(300),
                ),
            },
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

fn secret_var(name: &str) -> Option<SecretString> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::new)
}
