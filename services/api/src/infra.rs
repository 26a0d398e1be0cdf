use chrono::{DateTime, Utc};
use formdesk::submissions::{
    RepositoryError, SubmissionForm, SubmissionId, SubmissionRecord, SubmissionRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local submission store. Identifiers come from an atomic sequence
/// and timestamps are clamped so listing order matches insertion order even
/// when the wall clock steps backwards.
#[derive(Default)]
pub(crate) struct InMemorySubmissionRepository {
    sequence: AtomicU64,
    inner: Mutex<RepositoryInner>,
}

#[derive(Default)]
struct RepositoryInner {
    records: Vec<SubmissionRecord>,
    last_stamp: Option<DateTime<Utc>>,
}

impl SubmissionRepository for InMemorySubmissionRepository {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SubmissionForm {
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

    #[test]
    fn identifiers_follow_the_sequence() {
        let repository = InMemorySubmissionRepository::default();
        let first = repository.insert(form()).expect("first insert");
        let second = repository.insert(form()).expect("second insert");
        assert_eq!(first.id, SubmissionId("sub-000001".to_string()));
        assert_eq!(second.id, SubmissionId("sub-000002".to_string()));
    }

    #[test]
    fn listing_is_newest_first() {
        let repository = InMemorySubmissionRepository::default();
        let first = repository.insert(form()).expect("first insert");
        let second = repository.insert(form()).expect("second insert");

        let records = repository.list_recent_first().expect("listing");
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
        assert!(records[0].submitted_at >= records[1].submitted_at);
    }

    #[test]
    fn fetch_returns_the_stored_record() {
        let repository = InMemorySubmissionRepository::default();
        let inserted = repository.insert(form()).expect("insert");
        let fetched = repository
            .fetch(&inserted.id)
            .expect("fetch succeeds")
            .expect("record present");
        assert_eq!(fetched, inserted);
        assert!(repository
            .fetch(&SubmissionId("sub-999999".to_string()))
            .expect("fetch succeeds")
            .is_none());
    }
}
