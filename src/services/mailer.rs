// src/services/mailer.rs
//! SMTP delivery for account verification email

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::common::config::{AppConfig, RunMode};
use crate::common::safe_email_log;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP not configured")]
    NotConfigured,

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Verification-email sender.
///
/// Without an SMTP host configured, development mode logs the
/// verification link instead of sending; production mode treats the
/// missing transport as an error.
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    run_mode: RunMode,
}

impl Mailer {
    pub fn from_config(config: &AppConfig) -> Self {
        let transport = config.smtp_host.as_deref().and_then(|host| {
            let builder =
                match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                    Ok(b) => b.port(config.smtp_port),
                    Err(e) => {
                        warn!(error = %e, host = %host, "Failed to build SMTP transport");
                        return None;
                    }
                };

            let builder = match (&config.smtp_username, &config.smtp_password) {
                (Some(user), Some(pass)) => {
                    builder.credentials(Credentials::new(user.clone(), pass.clone()))
                }
                _ => builder,
            };

            Some(builder.build())
        });

        if transport.is_none() {
            warn!("SMTP host not configured; verification emails will not be delivered");
        }

        Self {
            transport,
            from: config.smtp_from.clone(),
            run_mode: config.run_mode,
        }
    }

    /// Send the signup verification email containing `verify_url`
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        to_name: &str,
        verify_url: &str,
    ) -> Result<(), MailError> {
        let Some(transport) = &self.transport else {
            if self.run_mode.is_development() {
                info!(
                    email = %safe_email_log(to_email),
                    verify_url = %verify_url,
                    "DEV MODE: SMTP unconfigured, logging verification link instead of sending"
                );
                return Ok(());
            }
            return Err(MailError::NotConfigured);
        };

        let body = verification_email_body(to_name, verify_url);

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| MailError::InvalidMessage(format!("from address: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| MailError::InvalidMessage(format!("to address: {}", e)))?)
            .subject("Verify your email address")
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| MailError::InvalidMessage(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::SendFailed(e.to_string()))?;

        info!(email = %safe_email_log(to_email), "Verification email sent");
        Ok(())
    }
}

fn verification_email_body(name: &str, verify_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #4F46E5; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #4F46E5; color: white; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Confirm your email</h1>
        </div>
        <div class="content">
            <p>Hi {},</p>

            <p>Thanks for signing up. Click the button below to verify your email address. The link expires in 24 hours.</p>

            <p><a class="button" href="{}">Verify email</a></p>

            <p>If the button doesn't work, copy this link into your browser:<br>{}</p>
        </div>
        <div class="footer">
            <p>If you didn't create an account, you can ignore this message.</p>
        </div>
    </div>
</body>
</html>"#,
        crate::common::escape_html(name),
        verify_url,
        verify_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_body_contains_link_and_name() {
        let body = verification_email_body("Ada", "http://localhost:8080/verify?token=abc");
        assert!(body.contains("Hi Ada,"));
        assert!(body.contains("http://localhost:8080/verify?token=abc"));
    }

    #[test]
    fn test_verification_body_escapes_name() {
        let body = verification_email_body("<script>", "http://x/verify");
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }
}
