use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::submissions::admin::{AdminGate, StaticAdminDirectory};
use crate::submissions::domain::{SubmissionForm, SubmissionId, SubmissionRecord};
use crate::submissions::export::{ExportBridge, ExportError, ExportOutcome};
use crate::submissions::notify::{NotificationDispatcher, NotifyError};
use crate::submissions::repository::{RepositoryError, SubmissionRepository};
use crate::submissions::router::{submission_router, SubmissionApi};
use crate::submissions::service::SubmissionIntakeService;

pub(super) const ADMIN_EMAIL: &str = "admin@example.com";

pub(super) fn form() -> SubmissionForm {
    SubmissionForm {
        first_name: "Ada".to_string(),
        surname: "Lovelace".to_string(),
        gender: "female".to_string(),
        date_of_birth: "1815-12-10".to_string(),
        relationship_status: "single".to_string(),
        state_of_origin: "Lagos".to_string(),
        local_government: "Ikeja".to_string(),
        employment_status: "employed".to_string(),
        phone_number: "555-0100".to_string(),
        email: "ada@example.com".to_string(),
        ..SubmissionForm::default()
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    sequence: AtomicU64,
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    records: Vec<SubmissionRecord>,
    last_stamp: Option<DateTime<Utc>>,
}

impl SubmissionRepository for MemoryRepository {
    fn insert(&self, form: SubmissionForm) -> Result<SubmissionRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;

        let mut submitted_at = Utc::now();
        if let Some(last) = inner.last_stamp {
            if submitted_at < last {
                submitted_at = last;
            }
        }
        inner.last_stamp = Some(submitted_at);

        let record = SubmissionRecord {
            id: SubmissionId(format!("sub-{sequence:06}")),
            form,
            submitted_at,
        };
        inner.records.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.records.iter().find(|record| &record.id == id).cloned())
    }

    fn list_recent_first(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.records.iter().rev().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl SubmissionRepository for UnavailableRepository {
    fn insert(&self, _form: SubmissionForm) -> Result<SubmissionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("store unreachable".to_string()))
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store unreachable".to_string()))
    }

    fn list_recent_first(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store unreachable".to_string()))
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    fail: bool,
    notified: Mutex<Vec<SubmissionId>>,
}

impl RecordingNotifier {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn notified(&self) -> Vec<SubmissionId> {
        self.notified.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::SendFailed("smtp unreachable".to_string()));
        }
        self.notified
            .lock()
            .expect("notifier mutex poisoned")
            .push(record.id.clone());
        Ok(())
    }
}

pub(super) struct RecordingExporter {
    configured: bool,
    fail: bool,
    deliveries: Mutex<Vec<SubmissionId>>,
    batches: Mutex<Vec<(usize, Option<String>)>>,
}

impl Default for RecordingExporter {
    fn default() -> Self {
        Self {
            configured: true,
            fail: false,
            deliveries: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingExporter {
    pub(super) fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn deliveries(&self) -> Vec<SubmissionId> {
        self.deliveries.lock().expect("exporter mutex poisoned").clone()
    }

    pub(super) fn batches(&self) -> Vec<(usize, Option<String>)> {
        self.batches.lock().expect("exporter mutex poisoned").clone()
    }
}

#[async_trait]
impl ExportBridge for RecordingExporter {
    async fn export_record(&self, record: &SubmissionRecord) -> Result<ExportOutcome, ExportError> {
        if !self.configured {
            return Ok(ExportOutcome::Skipped);
        }
        if self.fail {
            return Err(ExportError::Transport("webhook timed out".to_string()));
        }
        self.deliveries
            .lock()
            .expect("exporter mutex poisoned")
            .push(record.id.clone());
        Ok(ExportOutcome::Delivered)
    }

    async fn export_batch(
        &self,
        records: &[SubmissionRecord],
        override_url: Option<&str>,
    ) -> Result<usize, ExportError> {
        if override_url.is_none() && !self.configured {
            return Err(ExportError::NotConfigured);
        }
        if self.fail {
            return Err(ExportError::Transport("webhook timed out".to_string()));
        }
        self.batches
            .lock()
            .expect("exporter mutex poisoned")
            .push((records.len(), override_url.map(str::to_string)));
        Ok(records.len())
    }
}

pub(super) type TestService =
    SubmissionIntakeService<MemoryRepository, RecordingNotifier, RecordingExporter>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
    Arc<RecordingExporter>,
) {
    build_service_with(RecordingNotifier::default(), RecordingExporter::default())
}

pub(super) fn build_service_with(
    notifier: RecordingNotifier,
    exporter: RecordingExporter,
) -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
    Arc<RecordingExporter>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(notifier);
    let exporter = Arc::new(exporter);
    let service =
        SubmissionIntakeService::new(repository.clone(), notifier.clone(), exporter.clone());
    (service, repository, notifier, exporter)
}

pub(super) fn build_router() -> (
    axum::Router,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
    Arc<RecordingExporter>,
) {
    build_router_with(RecordingNotifier::default(), RecordingExporter::default())
}

pub(super) fn build_router_with(
    notifier: RecordingNotifier,
    exporter: RecordingExporter,
) -> (
    axum::Router,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
    Arc<RecordingExporter>,
) {
    let (service, repository, notifier, exporter) = build_service_with(notifier, exporter);
    let gate = AdminGate::new(Arc::new(StaticAdminDirectory::new([
        ADMIN_EMAIL.to_string()
    ])));
    let api = Arc::new(SubmissionApi { service, gate });
    (submission_router(api), repository, notifier, exporter)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
