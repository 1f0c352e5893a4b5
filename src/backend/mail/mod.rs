//! Outbound Email
//!
//! The password reset flow talks to a `Mailer` trait object. Two
//! implementations exist:
//!
//! - **`SmtpMailer`** - delivers through an SMTP relay with `lettre`
//! - **`LogMailer`** - writes the message to the log (development only)

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::backend::server::config::SmtpConfig;

/// Email delivery failure
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Sends plain-text email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// SMTP mailer
///
/// Port 465 uses implicit TLS, any other port upgrades with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let mut builder = builder.port(config.port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(format!("{}: {}", config.from, e)))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(format!("{}: {}", to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!("Sent email '{}' to {}", subject, to);
        Ok(())
    }
}

/// Mailer that only logs; used when no SMTP host is configured
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::warn!("SMTP not configured; email to {} not delivered", to);
        tracing::debug!(subject, body, "Undelivered email");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_accepts() {
        assert!(LogMailer.send("ana@x.com", "Hi", "Body").await.is_ok());
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_bad_sender() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: None,
            password: None,
            from: "not an address".to_string(),
        };
        assert!(matches!(SmtpMailer::new(&config), Err(MailError::Address(_))));
    }
}
