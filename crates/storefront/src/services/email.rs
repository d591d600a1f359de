//! Email service for sending verification codes.
//!
//! Uses SMTP via lettre for delivery with Askama templates. Delivery is
//! fire-and-forget: registration spawns [`EmailService::dispatch_verification_code`]
//! and never waits on it.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use mercado_core::{Email, VerificationCode};

use crate::config::EmailConfig;

const VERIFICATION_SUBJECT: &str = "Código de Verificação";

/// HTML template for verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.html")]
struct VerificationCodeEmailHtml<'a> {
    code: &'a str,
}

/// Plain text template for verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.txt")]
struct VerificationCodeEmailText<'a> {
    code: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a verification code email.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_verification_code(
        &self,
        to: &Email,
        code: &VerificationCode,
    ) -> Result<(), EmailError> {
        let (text, html) = render_verification_code(code)?;

        self.send_multipart_email(to.as_str(), VERIFICATION_SUBJECT, &text, &html)
            .await
    }

    /// Send a verification code on a background task. Failures are logged
    /// and never reach the caller.
    pub fn dispatch_verification_code(&self, to: Email, code: VerificationCode) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send_verification_code(&to, &code).await {
                tracing::warn!(to = %to, error = %e, "Failed to send verification email");
            }
        });
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Render the plain text and HTML bodies of a verification email.
fn render_verification_code(code: &VerificationCode) -> Result<(String, String), EmailError> {
    let code = code.as_str();
    let text = VerificationCodeEmailText { code }.render()?;
    let html = VerificationCodeEmailHtml { code }.render()?;
    Ok((text, html))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_bodies_contain_code() {
        let code = VerificationCode::from_stored("482913".to_owned());
        let (text, html) = render_verification_code(&code).unwrap();

        assert!(text.contains("Seu código de verificação é: 482913"));
        assert!(html.contains("482913"));
    }
}
