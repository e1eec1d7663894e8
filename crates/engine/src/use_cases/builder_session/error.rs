//! Builder session operation errors.

use rigbldr_domain::{BuilderError, DraftId};

use crate::infrastructure::ports::RepoError;

/// Errors that can occur during builder session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No active builder session: {0}")]
    SessionNotFound(DraftId),

    #[error("Persisted draft not found: {0}")]
    DraftNotFound(DraftId),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
