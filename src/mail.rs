// src/mail.rs

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use url::Url;

use crate::config::Config;
use crate::error::AppError;

/// Outbound mail sink. The application never waits on delivery; see
/// [`send_detached`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}

/// SMTP implementation (STARTTLS) used in production.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.mail_from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|_| AppError::InternalServerError("bad MAIL_FROM address".to_string()))?,
            )
            .to(to
                .parse()
                .map_err(|_| AppError::BadRequest("bad recipient address".to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(())
    }
}

/// Dispatches a mail on a detached task. The request path never blocks on
/// the mail server; delivery failures are logged and dropped.
pub fn send_detached(mailer: Arc<dyn Mailer>, to: String, subject: String, html_body: String) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, &subject, &html_body).await {
            tracing::warn!("failed to send '{}' to {}: {}", subject, to, e);
        }
    });
}

pub struct EmailContent {
    pub subject: String,
    pub html_body: String,
}

/// Email asking a freshly registered user to activate their account.
pub fn verification_email(config: &Config, name: &str, token: &str) -> EmailContent {
    let link = frontend_link(config, "verify-email", token);

    EmailContent {
        subject: "Homely - Verify your email".to_string(),
        html_body: format!(
            "<p>Hi {},</p>\
             <p>Welcome to Homely. Click the link below to activate your account:</p>\
             <p><a href=\"{}\">Verify email</a></p>\
             <p>If you did not create an account, you can ignore this email.</p>",
            name, link
        ),
    }
}

/// Email carrying a short-lived password-reset link.
pub fn reset_password_email(config: &Config, name: &str, token: &str) -> EmailContent {
    let link = frontend_link(config, "reset-password", token);
    let valid_minutes = config.reset_token_ttl_secs / 60;

    EmailContent {
        subject: "Homely - Password reset instructions".to_string(),
        html_body: format!(
            "<p>Hi {},</p>\
             <p>We received a request to reset your password. The link below is \
             valid for {} minutes:</p>\
             <p><a href=\"{}\">Reset password</a></p>\
             <p>If you did not request this, you can ignore this email.</p>",
            name, valid_minutes, link
        ),
    }
}

fn frontend_link(config: &Config, path: &str, token: &str) -> String {
    match Url::parse(&config.frontend_url).and_then(|base| base.join(path)) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("token", token);
            url.to_string()
        }
        // A malformed FRONTEND_URL should not make registration fail; fall
        // back to naive concatenation.
        Err(_) => format!("{}{}?token={}", config.frontend_url, path, token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            mongodb_url: "mongodb://localhost:27017".to_string(),
            mongodb_db: "homely_test".to_string(),
            jwt_secret: "secret".to_string(),
            access_token_ttl_secs: 600,
            verify_token_ttl_secs: 600,
            reset_token_ttl_secs: 600,
            s3_bucket: "bucket".to_string(),
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

    #[test]
    fn verification_email_carries_the_token_link() {
        let email = verification_email(&test_config(), "Ada", "tok123");

        assert!(email.subject.contains("Verify"));
        assert!(
            email
                .html_body
                .contains("http://localhost:5173/verify-email?token=tok123")
        );
    }

    #[test]
    fn reset_email_names_the_validity_window() {
        let email = reset_password_email(&test_config(), "Ada", "tok456");

        assert!(email.html_body.contains("10 minutes"));
        assert!(
            email
                .html_body
                .contains("http://localhost:5173/reset-password?token=tok456")
        );
    }
}
