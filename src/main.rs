// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use homely::config::Config;
use homely::db;
use homely::mail::SmtpMailer;
use homely::routes;
use homely::state::AppState;
use homely::storage::S3Store;
use mongodb::bson::doc;
use mongodb::{Client, IndexModel, options::IndexOptions};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Connection with Retry
    let mut retry_count = 0;
    let database = loop {
        match connect(&config).await {
            Ok(database) => break database,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to MongoDB after 5 retries: {}", e);
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Ensure the email uniqueness invariant is backed by an index.
    if let Err(e) = ensure_indexes(&database).await {
        tracing::error!("Failed to create indexes: {:?}", e);
    }

    // Object store and mail transport
    let store = S3Store::connect(&config).await;
    let mailer = SmtpMailer::new(&config).expect("Failed to build SMTP transport");

    // Create AppState
    let state = AppState {
        db: database,
        store: Arc::new(store),
        mailer: Arc::new(mailer),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server. Connect info feeds the per-IP rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

async fn connect(config: &Config) -> Result<mongodb::Database, mongodb::error::Error> {
    let client = Client::with_uri_str(&config.mongodb_url).await?;
    let database = client.database(&config.mongodb_db);

    // A ping proves the server is actually reachable, not just parsed.
    database.run_command(doc! { "ping": 1 }).await?;

    Ok(database)
}

async fn ensure_indexes(database: &mongodb::Database) -> Result<(), mongodb::error::Error> {
    let email_index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    database
        .collection::<mongodb::bson::Document>(db::USERS)
        .create_index(email_index)
        .await?;

    Ok(())
}
