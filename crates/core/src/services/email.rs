//! Email delivery service.
//!
//! Thin wrapper over lettre's async SMTP transport. With no SMTP host
//! configured the service runs in disabled mode: sends succeed and are
//! logged, which keeps development setups and tests free of a mail server.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::Mailbox,
    transport::smtp::authentication::Credentials,
};
use versus_common::{AppError, AppResult, config::EmailConfig};

/// Email service.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl EmailService {
    /// Build from configuration. An empty host disables delivery.
    pub fn from_config(config: &EmailConfig) -> AppResult<Self> {
        if config.host.is_empty() {
            return Ok(Self {
                transport: None,
                from_address: config.from_address.clone(),
            });
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Email(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: Some(builder.build()),
            from_address: config.from_address.clone(),
        })
    }

    /// A disabled service that drops all mail (test helper).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            transport: None,
            from_address: "noreply@localhost".to_string(),
        }
    }

    /// Whether a transport is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send a plain-text email.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let Some(ref transport) = self.transport else {
            tracing::debug!(to, subject, "Email delivery disabled, dropping message");
            return Ok(());
        };

        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid from address: {e}")))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| AppError::Email(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_host_disables_delivery() {
        let service = EmailService::from_config(&EmailConfig::default()).unwrap();
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_send_succeeds() {
        let service = EmailService::disabled();
        let result = service.send("user@example.com", "Hello", "Body").await;
        assert!(result.is_ok());
    }
}
