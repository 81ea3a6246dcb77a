use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_assistant::infrastructure::AppState;
use event_assistant::{config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_assistant=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    // Check for seed flag
    if std::env::var("SEED_DEMO").is_ok() {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    if config.gemini.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; /api/generate will fail");
    }
    if config.stripe.secret_key.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY not set; /api/checkout will fail");
    }
    if config.stripe.webhook_secret.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set; payment webhooks will be rejected");
    }

    let state = AppState::new(db, &config).expect("Failed to build HTTP clients");
    let app = server::build_router(state, &config);

    if let Err(e) = server::serve(app, config.port).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
