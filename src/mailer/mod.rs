use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailConfig;
use crate::error::{ AppError, Result };
use crate::providers::{ EmailMessage, Notifier };

/// Delivers through an HTTP mail relay (`POST {from, to, subject, html}`).
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(config: MailConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build mail client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let body = RelayRequest {
            from: &self.config.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let mut request = self.client.post(&self.config.api_url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send().await
            .map_err(|e| AppError::External(format!("Mail relay error: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!("Mail relay returned status: {}", response.status())));
        }

        Ok(())
    }
}

/// Used when no relay is configured.
pub struct LogMailer;

#[async_trait]
impl Notifier for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(to = %message.to, subject = %message.subject, "mail relay not configured, logging notification");
        Ok(())
    }
}
