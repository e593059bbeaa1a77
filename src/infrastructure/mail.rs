//! SMTP delivery for booking confirmations.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use tracing::debug;

use crate::application::ports::{MailTransport, OutgoingMail};
use crate::domain::{BookingError, BookingResult};

fn mail_error(context: &str, e: impl std::fmt::Display) -> BookingError {
    BookingError::Notification(format!("{}: {}", context, e))
}

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Implicit TLS, usually port 465
    Tls,
    /// Plain connect upgraded with STARTTLS, usually port 587
    StartTls,
    /// No encryption; local relays and test sinks only
    Plain,
}

impl SmtpSecurity {
    pub fn parse(value: &str) -> BookingResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "tls" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "none" | "plain" => Ok(Self::Plain),
            other => Err(BookingError::Validation(format!(
                "unknown smtp security '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub security: SmtpSecurity,
    /// Empty disables SMTP authentication
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: Option<String>,
}

pub struct SmtpMailer {
    config: MailConfig,
    from: Mailbox,
    reply_to: Option<Mailbox>,
}

impl SmtpMailer {
    /// Fails on unparseable sender or reply-to addresses.
    pub fn new(config: MailConfig) -> BookingResult<Self> {
        let from_address: Address = config
            .from_email
            .parse()
            .map_err(|e| mail_error("invalid from address", e))?;
        let from = Mailbox::new(Some(config.from_name.clone()), from_address);
        let reply_to = match config.reply_to.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => Some(Mailbox::new(
                None,
                addr.parse()
                    .map_err(|e| mail_error("invalid reply-to address", e))?,
            )),
            _ => None,
        };
        Ok(Self {
            config,
            from,
            reply_to,
        })
    }

    pub fn build_message(&self, mail: &OutgoingMail) -> BookingResult<Message> {
        let to: Address = mail
            .to
            .parse()
            .map_err(|e| mail_error("invalid recipient", e))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, to))
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }
        builder
            .body(mail.html_body.clone())
            .map_err(|e| mail_error("cannot build message", e))
    }

    /// A fresh transport per message; confirmations are rare.
    fn transport(&self) -> BookingResult<SmtpTransport> {
        let host = self.config.smtp_host.as_str();
        let builder = match self.config.security {
            SmtpSecurity::Tls => {
                SmtpTransport::relay(host).map_err(|e| mail_error("smtp relay", e))?
            }
            SmtpSecurity::StartTls => {
                SmtpTransport::starttls_relay(host).map_err(|e| mail_error("smtp relay", e))?
            }
            SmtpSecurity::Plain => SmtpTransport::builder_dangerous(host),
        };
        let builder = builder.port(self.config.smtp_port);
        let builder = if self.config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
        };
        Ok(builder.build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> BookingResult<()> {
        let message = self.build_message(&mail)?;
        let transport = self.transport()?;

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| mail_error("mail task failed", e))?
            .map_err(|e| mail_error("smtp send", e))?;

        debug!(to = %mail.to, host = %self.config.smtp_host, "Mail handed to relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            security: SmtpSecurity::Plain,
            username: String::new(),
            password: String::new(),
            from_email: "reservations@justdreams.test".to_string(),
            from_name: "JustDreams".to_string(),
            reply_to: Some("support@justdreams.test".to_string()),
        }
    }

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            subject: "Your booking is confirmed".to_string(),
            html_body: "<p>See you soon</p>".to_string(),
        }
    }

    #[test]
    fn message_is_addressed_to_the_guest() {
        let mailer = SmtpMailer::new(config()).unwrap();
        let message = mailer.build_message(&mail("alice@example.test")).unwrap();

        let envelope = message.envelope();
        assert_eq!(envelope.to().len(), 1);
        assert_eq!(envelope.to()[0].to_string(), "alice@example.test");
        assert_eq!(
            envelope.from().map(|a| a.to_string()).as_deref(),
            Some("reservations@justdreams.test")
        );

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Your booking is confirmed"));
        assert!(raw.contains("Reply-To: support@justdreams.test"));
    }

    #[test]
    fn bad_addresses_are_notification_errors() {
        let mailer = SmtpMailer::new(config()).unwrap();
        assert!(matches!(
            mailer.build_message(&mail("not an address")),
            Err(BookingError::Notification(_))
        ));

        let mut bad_sender = config();
        bad_sender.from_email = "nobody".to_string();
        assert!(matches!(
            SmtpMailer::new(bad_sender),
            Err(BookingError::Notification(_))
        ));
    }

    #[test]
    fn security_modes_parse() {
        assert_eq!(SmtpSecurity::parse("STARTTLS").unwrap(), SmtpSecurity::StartTls);
        assert_eq!(SmtpSecurity::parse("tls").unwrap(), SmtpSecurity::Tls);
        assert_eq!(SmtpSecurity::parse("none").unwrap(), SmtpSecurity::Plain);
        assert!(SmtpSecurity::parse("ssl3").is_err());
    }
}
