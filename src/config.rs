// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Seconds in 8 days, the default lifetime for access and verification tokens.
const EIGHT_DAYS_SECS: i64 = 60 * 60 * 24 * 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_url: String,
    pub mongodb_db: String,

    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub verify_token_ttl_secs: i64,
    pub reset_token_ttl_secs: i64,

    pub s3_bucket: String,
    pub s3_region: String,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub mail_from: String,

    /// Base URL the verification / reset links point at.
    pub frontend_url: String,

    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let mongodb_url = env::var("MONGODB_URL")
            .expect("MONGODB_URL must be set");

        let mongodb_db = env::var("MONGODB_DB")
            .unwrap_or_else(|_| "homely".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let access_token_ttl_secs = env_i64("ACCESS_TOKEN_TTL_SECS", EIGHT_DAYS_SECS);
        let verify_token_ttl_secs = env_i64("VERIFY_TOKEN_TTL_SECS", EIGHT_DAYS_SECS);
        // Reset links are short-lived: 10 minutes unless overridden.
        let reset_token_ttl_secs = env_i64("RESET_TOKEN_TTL_SECS", 600);

        let s3_bucket = env::var("S3_BUCKET")
            .expect("S3_BUCKET must be set");

        let s3_region = env::var("S3_REGION")
            .unwrap_or_else(|_| "eu-north-1".to_string());

        let smtp_host = env::var("SMTP_HOST")
            .expect("SMTP_HOST must be set");

        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(587);

        let smtp_username = env::var("SMTP_USERNAME")
            .expect("SMTP_USERNAME must be set");

        let smtp_password = env::var("SMTP_PASSWORD")
            .expect("SMTP_PASSWORD must be set");

        let mail_from = env::var("MAIL_FROM")
            .unwrap_or_else(|_| "Homely <noreply@homely.com.ng>".to_string());

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173/".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            mongodb_url,
            mongodb_db,
            jwt_secret,
            access_token_ttl_secs,
            verify_token_ttl_secs,
            reset_token_ttl_secs,
            s3_bucket,
            s3_region,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            mail_from,
            frontend_url,
            rust_log,
        }
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
