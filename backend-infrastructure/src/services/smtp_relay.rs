use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use backend_domain::{DeliveryError, MailConfig, MailRelay};

const SEND_TIMEOUT: Duration = Duration::from_secs(20);

/// Relays uploaded files as mail attachments over SMTPS.
pub struct SmtpMailRelay {
    config: MailConfig,
}

impl SmtpMailRelay {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.smtp_host.is_some()
            && self.config.sender.is_some()
            && self.config.recipient.is_some()
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let host = required(&self.config.smtp_host, "smtp host")?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|err| DeliveryError(err.to_string()))?
            .port(self.config.smtp_port)
            .timeout(Some(SEND_TIMEOUT));
        if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(builder.build())
    }
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str, DeliveryError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DeliveryError(format!("{} is not configured", what)))
}

fn mailbox(value: &Option<String>, what: &str) -> Result<Mailbox, DeliveryError> {
    required(value, what)?
        .parse::<Mailbox>()
        .map_err(|err| DeliveryError(format!("invalid {}: {}", what, err)))
}

pub fn build_message(
    config: &MailConfig,
    filename: &str,
    content: Vec<u8>,
) -> Result<Message, DeliveryError> {
    let content_type =
        ContentType::parse("text/csv").map_err(|err| DeliveryError(err.to_string()))?;
    let attachment = Attachment::new(filename.to_string()).body(content, content_type);

    Message::builder()
        .from(mailbox(&config.sender, "sender")?)
        .to(mailbox(&config.recipient, "recipient")?)
        .subject(format!("Uploaded file: {}", filename))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(format!(
                    "The attached file '{}' was uploaded to the registration desk.",
                    filename
                )))
                .singlepart(attachment),
        )
        .map_err(|err| DeliveryError(err.to_string()))
}

#[async_trait]
impl MailRelay for SmtpMailRelay {
    async fn relay_upload(&self, filename: &str, content: Vec<u8>) -> Result<(), DeliveryError> {
        let size = content.len();
        let message = build_message(&self.config, filename, content)?;
        let transport = self.transport()?;
        match transport.send(message).await {
            Ok(_) => {
                info!("upload relayed: filename={} bytes={}", filename, size);
                Ok(())
            }
            Err(err) => {
                warn!("upload relay failed: filename={} err={}", filename, err);
                Err(DeliveryError(err.to_string()))
            }
        }
    }
}
