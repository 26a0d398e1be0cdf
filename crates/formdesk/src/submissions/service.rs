use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{SubmissionForm, SubmissionId, SubmissionRecord};
use super::export::{ExportBridge, ExportError, ExportOutcome};
use super::notify::NotificationDispatcher;
use super::repository::{RepositoryError, SubmissionRepository};
use super::validate::{validate, FieldErrors};

/// Caller-visible result of a successful intake: the generated identifier
/// only. Whether the best-effort side effects succeeded is not reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeReceipt {
    pub submission_id: SubmissionId,
}

/// Error raised by the intake workflow. Side-effect failures never appear
/// here; they are logged and swallowed once the record is durable.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("submission failed validation")]
    Validation(FieldErrors),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Error raised by the foreground admin batch export.
#[derive(Debug, thiserror::Error)]
pub enum AdminExportError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Service composing the validator, submission store, notification
/// dispatcher, and spreadsheet export bridge.
pub struct SubmissionIntakeService<R, N, E> {
    repository: Arc<R>,
    notifier: Arc<N>,
    exporter: Arc<E>,
}

impl<R, N, E> SubmissionIntakeService<R, N, E>
where
    R: SubmissionRepository + 'static,
    N: NotificationDispatcher + 'static,
    E: ExportBridge + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, exporter: Arc<E>) -> Self {
        Self {
            repository,
            notifier,
            exporter,
        }
    }

    /// Accept one form submission: validate, persist, then run the two
    /// best-effort side effects concurrently. Only validation and persistence
    /// failures reach the caller; the record is durable before either side
    /// effect starts.
    pub async fn intake(&self, form: SubmissionForm) -> Result<IntakeReceipt, IntakeError> {
        let errors = validate(&form);
        if !errors.is_empty() {
            return Err(IntakeError::Validation(errors));
        }

        let record = self.repository.insert(form)?;
        info!(submission_id = %record.id, "submission stored");

        let (notified, exported) = tokio::join!(
            self.notifier.notify(&record),
            self.exporter.export_record(&record),
        );

        if let Err(err) = notified {
            warn!(submission_id = %record.id, error = %err, "admin notification failed");
        }
        match exported {
            Ok(ExportOutcome::Delivered) => {
                debug!(submission_id = %record.id, "submission forwarded to spreadsheet webhook");
            }
            Ok(ExportOutcome::Skipped) => {
                debug!(submission_id = %record.id, "no export target configured; skipping sync");
            }
            Err(err) => {
                warn!(submission_id = %record.id, error = %err, "spreadsheet sync failed");
            }
        }

        Ok(IntakeReceipt {
            submission_id: record.id,
        })
    }

    /// Full submission set for the admin view, newest first.
    pub fn listing(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        self.repository.list_recent_first()
    }

    /// Foreground batch export of every visible submission. Unlike the intake
    /// path, failures here propagate so the admin sees them.
    pub async fn export_all(&self, override_url: Option<&str>) -> Result<usize, AdminExportError> {
        let records = self.repository.list_recent_first()?;
        let exported = self.exporter.export_batch(&records, override_url).await?;
        info!(count = exported, "batch export delivered");
        Ok(exported)
    }
}
