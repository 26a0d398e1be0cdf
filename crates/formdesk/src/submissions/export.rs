use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::SubmissionRecord;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Spreadsheet export error.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export target not configured")]
    NotConfigured,
    #[error("export request failed: {0}")]
    Transport(String),
}

/// Result of a single-record export attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Delivered,
    /// No target configured; nothing was sent and that is not an error.
    Skipped,
}

/// Outbound bridge forwarding submissions to a spreadsheet webhook.
#[async_trait]
pub trait ExportBridge: Send + Sync {
    /// Forward one freshly stored record to the configured target. Reports
    /// `Skipped` without any outbound call when no target is configured.
    async fn export_record(&self, record: &SubmissionRecord) -> Result<ExportOutcome, ExportError>;

    /// Forward the full record list to `override_url` if supplied, else the
    /// configured target. With neither, fails with `NotConfigured` so the
    /// foreground admin action can surface a warning. Returns the number of
    /// records sent.
    async fn export_batch(
        &self,
        records: &[SubmissionRecord],
        override_url: Option<&str>,
    ) -> Result<usize, ExportError>;
}

/// Stable external schema expected by the spreadsheet endpoint. Optional
/// fields flatten to empty strings rather than nulls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub id: String,
    pub first_name: String,
    pub middle_name: String,
    pub surname: String,
    pub gender: String,
    pub date_of_birth: String,
    pub email: String,
    pub phone_number: String,
    pub employment_status: String,
    pub state_of_origin: String,
    pub academic_qualifications: String,
    pub professional_qualifications: String,
    pub skills_set: String,
    pub primary_school: String,
    pub secondary_school: String,
    pub college: String,
    pub social_group_membership: String,
    pub relationship_status: String,
    pub local_government: String,
    pub residential_address: String,
    pub social_media_pages: String,
    pub submitted_at: DateTime<Utc>,
}

impl SheetRow {
    pub fn from_record(record: &SubmissionRecord) -> Self {
        let form = &record.form;
        Self {
            id: record.id.0.clone(),
            first_name: form.first_name.clone(),
            middle_name: form.middle_name.clone().unwrap_or_default(),
            surname: form.surname.clone(),
            gender: form.gender.clone(),
            date_of_birth: form.date_of_birth.clone(),
            email: form.email.clone(),
            phone_number: form.phone_number.clone(),
            employment_status: form.employment_status.clone(),
            state_of_origin: form.state_of_origin.clone(),
            academic_qualifications: form.academic_qualifications.clone().unwrap_or_default(),
            professional_qualifications: form
                .professional_qualifications
                .clone()
                .unwrap_or_default(),
            skills_set: form.skills_set.clone().unwrap_or_default(),
            primary_school: form.primary_school.clone().unwrap_or_default(),
            secondary_school: form.secondary_school.clone().unwrap_or_default(),
            college: form.college.clone().unwrap_or_default(),
            social_group_membership: form.social_group_membership.clone().unwrap_or_default(),
            relationship_status: form.relationship_status.clone(),
            local_government: form.local_government.clone(),
            residential_address: form.residential_address.clone().unwrap_or_default(),
            social_media_pages: form.social_media_pages.clone().unwrap_or_default(),
            submitted_at: record.submitted_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct SingleRecordBody {
    submission: SheetRow,
}

#[derive(Debug, Serialize)]
struct BatchBody {
    submissions: Vec<SheetRow>,
}

/// HTTP POST exporter for a Google-Sheets-style Apps Script webhook.
pub struct WebhookExporter {
    client: reqwest::Client,
    target: Option<String>,
}

impl WebhookExporter {
    /// `target` is the deployment-configured webhook URL; `None` disables the
    /// implicit per-intake export.
    pub fn new(target: Option<String>) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(EXPORT_TIMEOUT)
            .build()
            .map_err(|err| ExportError::Transport(err.to_string()))?;

        Ok(Self { client, target })
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(), ExportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| ExportError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ExportError::Transport(format!(
                "webhook responded with status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ExportBridge for WebhookExporter {
    async fn export_record(&self, record: &SubmissionRecord) -> Result<ExportOutcome, ExportError> {
        let Some(url) = self.target.as_deref() else {
            return Ok(ExportOutcome::Skipped);
        };

        let body = SingleRecordBody {
            submission: SheetRow::from_record(record),
        };
        self.post(url, &body).await?;
        Ok(ExportOutcome::Delivered)
    }

    async fn export_batch(
        &self,
        records: &[SubmissionRecord],
        override_url: Option<&str>,
    ) -> Result<usize, ExportError> {
        let url = override_url
            .or(self.target.as_deref())
            .ok_or(ExportError::NotConfigured)?;

        let body = BatchBody {
            submissions: records.iter().map(SheetRow::from_record).collect(),
        };
        self.post(url, &body).await?;
        Ok(records.len())
    }
}
