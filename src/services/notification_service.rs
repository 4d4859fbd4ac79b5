use std::sync::Arc;
use std::time::Duration;

use crate::providers::{ EmailMessage, Notifier };
use crate::services::evaluator::PricePair;
use crate::utils::with_timeout;

pub const PRICE_EMAIL_SUBJECT: &str = "Notify price";

/// Counts for one batch of sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchOutcome {
    pub fn merge(&mut self, other: DispatchOutcome) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

/// Renders price emails and hands them to the configured `Notifier`.
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    send_timeout: Duration,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, send_timeout: Duration) -> Self {
        Self {
            notifier,
            send_timeout,
        }
    }

    pub fn render_price_email(recipient: &str, pair: PricePair, link: &str) -> EmailMessage {
        let html = format!(
            "<!DOCTYPE html>\n\
            <html>\n\
            <head>\n\
            \t<title>{title}</title>\n\
            </head>\n\
            <body>\n\
            \t<p>Hi {email},</p>\n\
            \t<p>Price of product you are tracking has changed from {previous} to {latest}.</p>\n\
            \t<p>Click <a href=\"{link}\">here</a> to view product.</p>\n\
            \t<p>Thanks,</p>\n\
            </body>\n\
            </html>\n",
            title = PRICE_EMAIL_SUBJECT,
            email = escape_html(recipient),
            previous = pair.previous,
            latest = pair.latest,
            link = escape_html(link)
        );

        EmailMessage {
            to: recipient.to_string(),
            subject: PRICE_EMAIL_SUBJECT.to_string(),
            html,
        }
    }

    /// Send each message in turn. Failures are logged and counted, never retried.
    pub async fn dispatch(&self, messages: Vec<EmailMessage>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        for message in messages {
            let sent = with_timeout(
                self.send_timeout,
                "send notification",
                self.notifier.send(&message)
            ).await;

            match sent {
                Ok(()) => {
                    tracing::debug!(to = %message.to, "notification sent");
                    outcome.sent += 1;
                }
                Err(e) => {
                    tracing::warn!(to = %message.to, error = %e, "notification failed");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
