use std::collections::HashMap;

use super::domain::{ApplicantId, ApplicantRecord, ChildId, ChildKind};

/// Applicant table access needed by duplicate review.
pub trait ApplicantRepository: Send + Sync {
    /// Every applicant whose status is not closed, newest `created_at` first.
    fn active(&self) -> Result<Vec<ApplicantRecord>, RepositoryError>;
    fn fetch(&self, id: &ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError>;
    fn delete(&self, id: &ApplicantId) -> Result<(), RepositoryError>;
}

/// Access to the visit, case-note/event, and document tables.
pub trait ChildRecordRepository: Send + Sync {
    /// Child row counts for the given applicants. Applicants without rows may be absent.
    fn count_by_applicant(
        &self,
        kind: ChildKind,
        applicants: &[ApplicantId],
    ) -> Result<HashMap<ApplicantId, u64>, RepositoryError>;

    /// Point every `kind` row referencing `from` at `to`, returning the moved row ids.
    fn reassign(
        &self,
        kind: ChildKind,
        from: &ApplicantId,
        to: &ApplicantId,
    ) -> Result<Vec<ChildId>, RepositoryError>;

    /// Point the listed rows at `to`. Used to undo a partially applied merge.
    fn assign(
        &self,
        kind: ChildKind,
        children: &[ChildId],
        to: &ApplicantId,
    ) -> Result<(), RepositoryError>;
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
