use crate::config::RunConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

/// Delivery of the "apartment is free" notification
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self) -> Result<()>;
}

/// Sends the configured message over implicit-TLS SMTP
pub struct SmtpNotifier {
    host: String,
    port: u16,
    user: String,
    pass: String,
    sender: String,
    recipients: Vec<String>,
    subject: String,
    content: String,
    subtype: String,
}

impl SmtpNotifier {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            user: config.smtp_user.clone(),
            pass: config.smtp_pass.clone(),
            sender: config.sender.clone(),
            recipients: config.recipients.clone(),
            subject: config.subject.clone(),
            content: config.content.clone(),
            subtype: config.subtype.clone(),
        }
    }

    /// Single `text/<subtype>` part addressed to every recipient
    pub fn build_message(&self) -> Result<Message> {
        if self.recipients.is_empty() {
            anyhow::bail!("No recipients configured");
        }

        let from: Mailbox = self
            .sender
            .parse()
            .with_context(|| format!("Invalid sender address {:?}", self.sender))?;
        let content_type = ContentType::parse(&format!("text/{}; charset=utf-8", self.subtype))
            .with_context(|| format!("Invalid text subtype {:?}", self.subtype))?;

        let mut builder = Message::builder().from(from).subject(&self.subject);
        for recipient in &self.recipients {
            let to: Mailbox = recipient
                .parse()
                .with_context(|| format!("Invalid recipient address {:?}", recipient))?;
            builder = builder.to(to);
        }

        builder
            .header(content_type)
            .body(self.content.clone())
            .context("Failed to build email")
    }

    /// Implicit-TLS transport for the configured relay
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .with_context(|| format!("Invalid SMTP host {:?}", self.host))?
            .port(self.port)
            .credentials(Credentials::new(self.user.clone(), self.pass.clone()))
            .build())
    }

    /// Send one message. The transport is built without a connection pool,
    /// so the session is closed with QUIT before this returns.
    async fn deliver(&self, transport: &AsyncSmtpTransport<Tokio1Executor>) -> Result<()> {
        let message = self.build_message()?;

        transport
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery via {}:{} failed", self.host, self.port))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self) -> Result<()> {
        info!("Attempting to send notification email...");

        let sent = match self.transport() {
            Ok(transport) => self.deliver(&transport).await,
            Err(e) => Err(e),
        };

        match sent {
            Ok(()) => {
                info!("Email sent successfully to {:?}", self.recipients);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send email: {:#}", e);
                Err(e)
            }
        }
    }
}
