use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp relay rejected: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Clone)]
pub struct Mailer {
    config: SmtpConfig,
}

impl Mailer {
    pub fn new(config: SmtpConfig) -> Self {
        Mailer { config }
    }

    /// Blocking SMTP send; callers go through [`send_welcome_in_background`].
    pub fn send_welcome(&self, name: &str, to: &str) -> Result<(), EmailError> {
        let body = format!(
            "Dear {name},\n\nYou have successfully registered at Teachables.\n\
             You can now sign in with your email address: {to}\n\nThank you for joining!"
        );

        let email = Message::builder()
            .from(self.config.from.parse()?)
            .to(to.parse()?)
            .subject("Welcome to Teachables")
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        let mailer = if self.config.username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.host)
                .port(self.config.port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            );
            SmtpTransport::relay(&self.config.host)?
                .port(self.config.port)
                .credentials(creds)
                .build()
        };

        mailer.send(&email)?;
        Ok(())
    }
}

/// Welcome mail is strictly best-effort: the registration response never
/// waits on it and never fails because of it. Failures land in the log.
pub fn send_welcome_in_background(mailer: Mailer, name: String, to: String) {
    actix_web::rt::spawn(async move {
        let recipient = to.clone();
        let sent =
            actix_web::rt::task::spawn_blocking(move || mailer.send_welcome(&name, &to)).await;

        match sent {
            Ok(Ok(())) => tracing::debug!(to = %recipient, "welcome email sent"),
            Ok(Err(e)) => tracing::warn!(to = %recipient, error = %e, "welcome email not sent"),
            Err(e) => tracing::warn!(to = %recipient, error = %e, "welcome email task failed"),
        }
    });
}
