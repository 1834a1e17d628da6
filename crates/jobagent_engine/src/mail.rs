//! Digest delivery over SMTP.

use std::time::Duration;

use agent_logging::agent_info;
use jobagent_core::Digest;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Default Gmail SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default Gmail SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

const TEST_SUBJECT: &str = "AI Job Agent - Test Email";

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("email credentials not configured (set GMAIL_USER and GMAIL_PASSWORD)")]
    NotConfigured,
    #[error("invalid email address {0:?}")]
    InvalidAddress(String),
    #[error("failed to build email: {0}")]
    Build(String),
    #[error("smtp transport error: {0}")]
    Transport(String),
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_digest(&self, recipient: &str, digest: &Digest) -> Result<(), DeliveryError>;

    async fn send_test(&self, recipient: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl SmtpCredentials {
    /// Both parts must be non-empty to count as configured.
    pub fn new(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Self { username, password })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout: Duration,
    pub credentials: Option<SmtpCredentials>,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            timeout: Duration::from_secs(30),
            credentials: None,
        }
    }
}

pub struct SmtpMailer {
    settings: MailSettings,
}

impl SmtpMailer {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.credentials.is_some()
    }

    fn credentials(&self) -> Result<&SmtpCredentials, DeliveryError> {
        self.settings
            .credentials
            .as_ref()
            .ok_or(DeliveryError::NotConfigured)
    }

    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: String,
        text_body: String,
    ) -> Result<(), DeliveryError> {
        let creds = self.credentials()?;

        let from: Mailbox = creds
            .username
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(creds.username.clone()))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(recipient.to_string()))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|err| DeliveryError::Build(err.to_string()))?;

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.smtp_host)
                .map_err(|err| DeliveryError::Transport(err.to_string()))?
                .port(self.settings.smtp_port)
                .timeout(Some(self.settings.timeout))
                .credentials(Credentials::new(
                    creds.username.clone(),
                    creds.password.clone(),
                ))
                .build();

        mailer
            .send(email)
            .await
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        agent_info!("Email {:?} sent to {}", subject, recipient);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send_digest(&self, recipient: &str, digest: &Digest) -> Result<(), DeliveryError> {
        self.send(
            recipient,
            &digest.subject(),
            digest.render_html(),
            digest.render_text(),
        )
        .await
    }

    async fn send_test(&self, recipient: &str) -> Result<(), DeliveryError> {
        let html_body = r#"<!DOCTYPE html>
<html>
<body>
    <h2>Test Email from AI Job Agent</h2>
    <p>This is a test email to verify that your email configuration is working correctly.</p>
    <p>If you received this email, your AI Job Agent is ready to send you job updates!</p>
    <br>
    <p>Sent by your AI Job Agent</p>
</body>
</html>
"#;
        let text_body = "Test Email from AI Job Agent\n\n\
This is a test email to verify that your email configuration is working correctly.\n\
If you received this email, your AI Job Agent is ready to send you job updates!\n\n\
Sent by your AI Job Agent\n";

        self.send(
            recipient,
            TEST_SUBJECT,
            html_body.to_string(),
            text_body.to_string(),
        )
        .await
    }
}
