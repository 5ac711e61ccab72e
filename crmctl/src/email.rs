//! Email delivery over SMTP, or to `.eml` files for development.

use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::path::Path;

use crate::{
    config::{Config, EmailTransportConfig},
    errors::Error,
};

pub struct EmailService {
    transport: EmailTransport,
    from_name: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let transport = match &config.email.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            EmailTransportConfig::File { path } => {
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_name: config.email.from_name.clone(),
        })
    }

    /// Send one plain-text message to every recipient
    pub async fn send(&self, from_email: &str, recipients: &[String], subject: &str, body: &str) -> Result<(), Error> {
        let from = format!("{} <{}>", self.from_name, from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::Internal {
                operation: format!("parse from email: {e}"),
            })?;

        let mut builder = Message::builder().from(from).subject(subject).header(ContentType::TEXT_PLAIN);
        for recipient in recipients {
            let to = recipient.parse::<Mailbox>().map_err(|e| Error::Internal {
                operation: format!("parse recipient email {recipient}: {e}"),
            })?;
            builder = builder.to(to);
        }

        let message = builder.body(body.to_string()).map_err(|e| Error::Internal {
            operation: format!("build email message: {e}"),
        })?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.email.transport = EmailTransportConfig::File {
            path: dir.to_string_lossy().into_owned(),
        };
        config
    }

    #[tokio::test]
    async fn test_file_transport_writes_message() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path())).unwrap();

        service
            .send(
                "admin@test.com",
                &["new.agent@example.com".to_string()],
                "You are invited to be an agent",
                "Please come login to start working.",
            )
            .await
            .unwrap();

        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
        let contents = std::fs::read_to_string(written[0].as_ref().unwrap().path()).unwrap();
        assert!(contents.contains("Subject: You are invited to be an agent"));
        assert!(contents.contains("new.agent@example.com"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path())).unwrap();

        let result = service.send("admin@test.com", &["not an address".to_string()], "s", "b").await;
        assert!(matches!(result, Err(Error::Internal { .. })));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("outbox");
        assert!(EmailService::new(&file_config(&nested)).is_ok());
        assert!(nested.exists());
    }
}
