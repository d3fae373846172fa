//! [`NotificationSink`] over SMTP.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use duskhub_app::ports::NotificationSink;
use duskhub_domain::alarm::Notification;

use crate::config::MailConfig;
use crate::error::MailError;

/// Sends each notification as one plain-text message.
pub struct SmtpNotifier {
    config: MailConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpNotifier {
    /// Prepare the relay. No connection is made until the first send.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InvalidServer`] when `smtp_server` is malformed.
    pub fn new(config: MailConfig) -> Result<Self, MailError> {
        let transport = if config.is_configured() {
            let (host, port) = config.relay()?;
            Some(
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                    .port(port)
                    .build(),
            )
        } else {
            None
        };
        Ok(Self { config, transport })
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, MailError> {
        let to: Mailbox = self.config.recipient.parse()?;
        let from: Mailbox = if self.config.sender.trim().is_empty() {
            to.clone()
        } else {
            self.config.sender.parse()?
        };
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())?;
        Ok(message)
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), MailError> {
        let Some(transport) = &self.transport else {
            tracing::debug!("recipient address or SMTP server not set, no mail sent");
            return Ok(());
        };
        let message = self.build_message(notification)?;
        transport.send(message).await?;
        tracing::info!(recipient = %self.config.recipient, subject = %notification.subject, "mail sent");
        Ok(())
    }
}

impl NotificationSink for SmtpNotifier {
    async fn send(&self, notification: Notification) {
        if let Err(err) = self.deliver(&notification).await {
            tracing::error!(subject = %notification.subject, error = %err, "failed to send mail");
        }
    }
}
