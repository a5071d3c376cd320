//! Email service for sending invitation notifications via SMTP.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use orgkit_core::Config;
use std::sync::Arc;

/// Email service for invitation notifications.
/// No-op if email is disabled or SMTP is not configured.
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    frontend_url: Option<String>,
}

impl EmailService {
    /// Create email service from config. Returns `None` if disabled or SMTP not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.email_enabled {
            tracing::debug!("Email disabled (EMAIL_ENABLED=false)");
            return None;
        }
        let host = config.smtp_host.as_deref()?;
        let from = config.smtp_from.clone()?;
        let port = config.smtp_port.unwrap_or(587);

        let credentials = match (&config.smtp_user, &config.smtp_password) {
            (Some(user), Some(password)) => {
                Some(Credentials::new(user.clone(), password.clone()))
            }
            _ => None,
        };

        let mailer = if config.smtp_tls {
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).ok()?.port(port);
            if let Some(creds) = credentials {
                builder = builder.credentials(creds);
            }
            tracing::info!(host = %host, port = port, "Email service initialized (SMTP with STARTTLS)");
            builder.build()
        } else {
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            if let Some(creds) = credentials {
                builder = builder.credentials(creds);
            }
            tracing::info!(host = %host, port = port, "Email service initialized (SMTP)");
            builder.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
            frontend_url: config.frontend_url.clone(),
        })
    }

    /// Send an invitation email with the acceptance link. Delivery failure is
    /// the caller's problem to log; the invitation itself is already stored.
    pub async fn send_invitation(
        &self,
        to: &str,
        organization_name: &str,
        token: &str,
    ) -> Result<(), String> {
        let to_addr: Mailbox = to
            .parse()
            .map_err(|e| format!("Invalid recipient address: {}", e))?;
        let from_addr: Mailbox = self
            .from
            .parse()
            .map_err(|e| format!("Invalid SMTP_FROM: {}", e))?;

        let link = match &self.frontend_url {
            Some(base) => format!("{}/invitations/{}", base.trim_end_matches('/'), token),
            None => format!("/organizations/invitations/{}", token),
        };

        let body = format!(
            "You have been invited to join {} .\n\n\
             Open the link below to accept the invitation:\n{}\n\n\
             If you were not expecting this invitation you can ignore this email.",
            organization_name, link
        );

        let email = Message::builder()
            .from(from_addr)
            .to(to_addr)
            .subject(format!("Invitation to join {}", organization_name))
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| e.to_string())?;

        self.mailer.send(email).await.map_err(|e| e.to_string())?;
        tracing::info!(organization = %organization_name, "Invitation email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 3000,
            cors_origins: vec!["*".to_string()],
            database_url: "postgresql://localhost/orgkit".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 30,
            jwt_secret: "test-secret-key-min-32-characters-long".to_string(),
            jwt_expiry_hours: 24,
            environment: "development".to_string(),
            email_enabled: false,
            smtp_host: None,
            smtp_port: None,
            smtp_user: None,
            smtp_password: None,
            smtp_from: None,
            smtp_tls: true,
            frontend_url: None,
        }
    }

    #[test]
    fn from_config_returns_none_when_email_disabled() {
        let config = base_config();
        assert!(
            EmailService::from_config(&config).is_none(),
            "When email_enabled is false, from_config should return None"
        );
    }

    #[test]
    fn from_config_requires_host_and_sender() {
        let mut config = base_config();
        config.email_enabled = true;
        config.smtp_host = Some("smtp.example.com".to_string());
        // Still no SMTP_FROM, so the service cannot be built.
        assert!(EmailService::from_config(&config).is_none());

        config.smtp_from = Some("noreply@example.com".to_string());
        assert!(EmailService::from_config(&config).is_some());
    }
}
