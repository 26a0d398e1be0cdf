//! Personal-information form intake, admin authorization, and export.

pub mod admin;
pub mod csv;
pub mod domain;
pub mod export;
pub mod notify;
pub mod repository;
pub mod router;
pub mod service;
pub mod validate;

#[cfg(test)]
mod tests;

pub use admin::{AdminDirectory, AdminGate, DirectoryError, StaticAdminDirectory};
pub use csv::{render_csv, CsvError};
pub use domain::{SubmissionForm, SubmissionId, SubmissionRecord};
pub use export::{ExportBridge, ExportError, ExportOutcome, SheetRow, WebhookExporter};
pub use notify::{
    create_dispatcher, render_notification, LogNotifier, NotificationDispatcher, NotifyError,
    SmtpNotifier,
};
pub use repository::{RepositoryError, SubmissionRepository};
pub use router::{submission_router, SubmissionApi, ADMIN_EMAIL_HEADER};
pub use service::{AdminExportError, IntakeError, IntakeReceipt, SubmissionIntakeService};
pub use validate::{validate, FieldErrors};
