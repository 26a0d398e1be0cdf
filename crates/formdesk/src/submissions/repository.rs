use super::domain::{SubmissionForm, SubmissionId, SubmissionRecord};

/// Storage abstraction so the intake service can be exercised in isolation.
///
/// Implementations assign the identifier and creation timestamp atomically at
/// insert time; stored records are immutable and never deleted.
pub trait SubmissionRepository: Send + Sync {
    fn insert(&self, form: SubmissionForm) -> Result<SubmissionRecord, RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError>;
    /// All records, newest first.
    fn list_recent_first(&self) -> Result<Vec<SubmissionRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
