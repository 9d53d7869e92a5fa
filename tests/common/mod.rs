// tests/common/mod.rs

// Each test binary compiles this module separately and uses a subset of it.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use homely::config::Config;
use homely::error::AppError;
use homely::mail::Mailer;
use homely::routes;
use homely::state::AppState;
use homely::storage::ObjectStore;

/// In-memory object store recording every call, so tests can assert on the
/// exact puts/deletes/presigns an operation performed.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub deletes: Mutex<Vec<String>>,
    pub presigns: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.deletes.lock().unwrap().push(key.to_string());
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl_secs: u64) -> Result<String, AppError> {
        self.presigns.lock().unwrap().push(key.to_string());
        Ok(format!("https://signed.example.com/{}?expires={}", key, ttl_secs))
    }
}

/// Mail sink that records instead of sending.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        mongodb_url: "mongodb://127.0.0.1:27017".to_string(),
        mongodb_db: "homely_test".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        access_token_ttl_secs: 600,
        verify_token_ttl_secs: 600,
        reset_token_ttl_secs: 600,
        s3_bucket: "homely-test".to_string(),
        s3_region: "eu-north-1".to_string(),
        smtp_host: "localhost".to_string(),
        smtp_port: 587,
        smtp_username: "user".to_string(),
        smtp_password: "pass".to_string(),
        mail_from: "Homely <noreply@homely.com.ng>".to_string(),
        frontend_url: "http://localhost:5173/".to_string(),
        rust_log: "error".to_string(),
    }
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// The MongoDB client connects lazily, so routes that never reach the
/// database (validation, token and catalog paths) are exercised without a
/// running server.
pub async fn spawn_app() -> String {
    let config = test_config();

    // 1. A lazy database handle; no I/O happens until a query runs.
    let client = mongodb::Client::with_uri_str(&config.mongodb_url)
        .await
        .expect("Failed to parse MongoDB URL");
    let db = client.database(&config.mongodb_db);

    // 2. Collaborator doubles behind the trait seams.
    let state = AppState {
        db,
        store: Arc::new(MemoryStore::default()),
        mailer: Arc::new(RecordingMailer::default()),
        config,
    };

    // 3. Create the router with the app state
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background. Connect info feeds the
    //    per-IP rate limiter, as in main.
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .unwrap();
    });

    address
}
