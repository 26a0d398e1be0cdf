use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::domain::SubmissionRecord;
use crate::config::NotificationConfig;

/// Upper bound on one SMTP exchange. The dispatcher is awaited inside the
/// intake request, so a hung server must not hold the submitter longer than
/// the webhook export's own transport timeout.
const SMTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to send notification: {0}")]
    SendFailed(String),
    #[error("invalid notification configuration: {0}")]
    InvalidConfig(String),
}

/// Outbound hook telling the administrator about a stored submission.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), NotifyError>;
}

#[async_trait]
impl NotificationDispatcher for Box<dyn NotificationDispatcher> {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), NotifyError> {
        (**self).notify(record).await
    }
}

/// Build the dispatcher matching the deployment configuration: SMTP when
/// configured, otherwise log-only.
pub fn create_dispatcher(
    config: Option<&NotificationConfig>,
) -> Result<Box<dyn NotificationDispatcher>, NotifyError> {
    match config {
        Some(config) => Ok(Box::new(SmtpNotifier::from_config(config)?)),
        None => Ok(Box::new(LogNotifier)),
    }
}

/// Plain-text message body covering every field, with "Not provided"
/// substituted for empty optionals.
pub fn render_notification(record: &SubmissionRecord) -> String {
    let form = &record.form;
    let mut body = String::new();

    line(&mut body, "Name", &form.full_name());
    line(&mut body, "Gender", &form.gender);
    line(&mut body, "Date of Birth", &form.date_of_birth);
    line(&mut body, "Email", &form.email);
    line(&mut body, "Phone Number", &form.phone_number);
    line(&mut body, "State of Origin", &form.state_of_origin);
    line(&mut body, "Local Government", &form.local_government);
    line(
        &mut body,
        "Residential Address",
        provided(&form.residential_address),
    );
    line(&mut body, "Employment Status", &form.employment_status);
    line(&mut body, "Relationship Status", &form.relationship_status);
    line(
        &mut body,
        "Academic Qualifications",
        provided(&form.academic_qualifications),
    );
    line(
        &mut body,
        "Professional Qualifications",
        provided(&form.professional_qualifications),
    );
    line(&mut body, "Skills", provided(&form.skills_set));
    line(&mut body, "Primary School", provided(&form.primary_school));
    line(
        &mut body,
        "Secondary School",
        provided(&form.secondary_school),
    );
    line(&mut body, "College/University", provided(&form.college));
    line(
        &mut body,
        "Social Group Membership",
        provided(&form.social_group_membership),
    );
    line(
        &mut body,
        "Social Media Pages",
        provided(&form.social_media_pages),
    );
    line(&mut body, "Submission ID", &record.id.0);
    line(
        &mut body,
        "Submitted At",
        &record.submitted_at.to_rfc3339(),
    );

    body
}

fn line(body: &mut String, label: &str, value: &str) {
    writeln!(body, "{label}: {value}").expect("write notification line");
}

fn provided(value: &Option<String>) -> &str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("Not provided")
}

/// SMTP-backed dispatcher sending to the fixed administrative recipient.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipient: Mailbox,
}

impl SmtpNotifier {
    pub fn from_config(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let mut builder = if config.use_tls {
            let tls_params = TlsParameters::new(config.smtp_host.clone())
                .map_err(|err| NotifyError::InvalidConfig(format!("TLS setup failed: {err}")))?;

            // Port 465 speaks implicit TLS (SMTPS); other ports use STARTTLS.
            if config.smtp_port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                    .map_err(|err| NotifyError::InvalidConfig(format!("SMTP relay: {err}")))?
                    .port(config.smtp_port)
                    .tls(Tls::Wrapper(tls_params))
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(|err| NotifyError::InvalidConfig(format!("SMTP relay: {err}")))?
                    .port(config.smtp_port)
                    .tls(Tls::Required(tls_params))
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
        };

        builder = builder.timeout(Some(SMTP_TIMEOUT));

        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|err| NotifyError::InvalidConfig(format!("invalid from address: {err}")))?;
        let recipient = config
            .admin_address
            .parse::<Mailbox>()
            .map_err(|err| NotifyError::InvalidConfig(format!("invalid admin address: {err}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
            recipient,
        })
    }
}

#[async_trait]
impl NotificationDispatcher for SmtpNotifier {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.recipient.clone())
            .subject("New Form Submission Received")
            .header(ContentType::TEXT_PLAIN)
            .body(render_notification(record))
            .map_err(|err| NotifyError::SendFailed(format!("failed to build message: {err}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| NotifyError::SendFailed(err.to_string()))?;

        Ok(())
    }
}

/// Fallback dispatcher used when SMTP is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl NotificationDispatcher for LogNotifier {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), NotifyError> {
        info!(
            submission_id = %record.id,
            "SMTP not configured; admin notification logged only"
        );
        Ok(())
    }
}
