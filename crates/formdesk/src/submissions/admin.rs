use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

/// Lookup failure against the authorized-admin set.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("admin directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the externally provisioned admin set. Consulted on every
/// authorization decision; results are never cached across requests.
pub trait AdminDirectory: Send + Sync {
    fn contains(&self, email: &str) -> Result<bool, DirectoryError>;
}

/// Exact-match set of authorized administrator addresses. Case-variant or
/// near-miss strings are not authorized.
#[derive(Debug, Clone, Default)]
pub struct StaticAdminDirectory {
    emails: HashSet<String>,
}

impl StaticAdminDirectory {
    pub fn new<I>(emails: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            emails: emails.into_iter().collect(),
        }
    }
}

impl AdminDirectory for StaticAdminDirectory {
    fn contains(&self, email: &str) -> Result<bool, DirectoryError> {
        Ok(self.emails.contains(email))
    }
}

/// Authorization gate in front of every admin view and the sign-in path.
pub struct AdminGate<D> {
    directory: Arc<D>,
}

impl<D> AdminGate<D>
where
    D: AdminDirectory,
{
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Fail closed: a directory lookup failure denies access.
    pub fn authorize(&self, email: &str) -> bool {
        match self.directory.contains(email.trim()) {
            Ok(authorized) => authorized,
            Err(err) => {
                warn!(error = %err, "admin directory lookup failed; denying access");
                false
            }
        }
    }
}
