use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::workflows::applicants::{
    ApplicantId, ApplicantRepository, ChildCounts, ChildId, ChildKind, ChildRecordRepository,
    RepositoryError,
};

/// Operator's choice of surviving and absorbed record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[serde(default)]
    pub master_id: String,
    #[serde(default)]
    pub duplicate_id: String,
}

impl MergeRequest {
    pub fn new(master_id: impl Into<String>, duplicate_id: impl Into<String>) -> Self {
        Self {
            master_id: master_id.into(),
            duplicate_id: duplicate_id.into(),
        }
    }

    /// Trimmed `(master, duplicate)` ids, rejecting blanks and self-merges.
    pub fn validate(&self) -> Result<(ApplicantId, ApplicantId), MergeError> {
        let master = self.master_id.trim();
        let duplicate = self.duplicate_id.trim();

        if master.is_empty() {
            return Err(MergeError::Validation("masterId is required"));
        }
        if duplicate.is_empty() {
            return Err(MergeError::Validation("duplicateId is required"));
        }
        if master == duplicate {
            return Err(MergeError::Validation(
                "masterId and duplicateId must reference different applicants",
            ));
        }

        Ok((ApplicantId::new(master), ApplicantId::new(duplicate)))
    }
}

/// Acknowledgement of a completed merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReceipt {
    pub master_id: ApplicantId,
    pub duplicate_id: ApplicantId,
    pub moved: ChildCounts,
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("invalid merge request: {0}")]
    Validation(&'static str),
    #[error("applicant {0} is already part of a merge in progress")]
    Busy(ApplicantId),
    #[error("duplicate applicant {0} not found")]
    DuplicateNotFound(ApplicantId),
    #[error("master applicant {0} not found")]
    MasterNotFound(ApplicantId),
    #[error("unable to look up applicants: {0}")]
    Lookup(#[source] RepositoryError),
    #[error("failed to move {kind} records from {duplicate} to {master}, duplicate kept: {source}")]
    Reassignment {
        kind: ChildKind,
        master: ApplicantId,
        duplicate: ApplicantId,
        #[source]
        source: RepositoryError,
    },
    #[error("records moved to {master} but deleting duplicate {duplicate} failed: {source}")]
    Delete {
        master: ApplicantId,
        duplicate: ApplicantId,
        #[source]
        source: RepositoryError,
    },
}

impl MergeError {
    /// Short machine-readable reason for API payloads.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Busy(_) => "busy",
            Self::DuplicateNotFound(_) | Self::MasterNotFound(_) => "not_found",
            Self::Lookup(_) => "lookup_failed",
            Self::Reassignment { .. } => "partial_reassignment",
            Self::Delete { .. } => "delete_failed",
        }
    }

    /// Whether the same request can be resent unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Busy(_) | Self::Lookup(_) | Self::Reassignment { .. } | Self::Delete { .. }
        )
    }
}

/// Applicant ids currently held by an in-flight merge.
#[derive(Debug, Default)]
pub struct MergeLocks {
    held: Mutex<HashSet<ApplicantId>>,
}

impl MergeLocks {
    /// Claim every id or none; returns the first id already held by another merge.
    pub fn try_claim(&self, ids: &[&ApplicantId]) -> Result<MergeClaim<'_>, ApplicantId> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(taken) = ids.iter().find(|id| held.contains(**id)) {
            return Err((*taken).clone());
        }
        let ids: Vec<ApplicantId> = ids.iter().map(|id| (*id).clone()).collect();
        held.extend(ids.iter().cloned());
        Ok(MergeClaim { locks: self, ids })
    }

    pub fn is_held(&self, id: &ApplicantId) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// Releases its ids when dropped.
#[derive(Debug)]
pub struct MergeClaim<'a> {
    locks: &'a MergeLocks,
    ids: Vec<ApplicantId>,
}

impl Drop for MergeClaim<'_> {
    fn drop(&mut self) {
        let mut held = self
            .locks
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for id in &self.ids {
            held.remove(id);
        }
    }
}

/// Moves child records from a duplicate applicant to its master, then deletes the duplicate.
pub struct MergeExecutor<A, C> {
    applicants: Arc<A>,
    children: Arc<C>,
    locks: MergeLocks,
}

impl<A, C> MergeExecutor<A, C>
where
    A: ApplicantRepository + 'static,
    C: ChildRecordRepository + 'static,
{
    pub fn new(applicants: Arc<A>, children: Arc<C>) -> Self {
        Self {
            applicants,
            children,
            locks: MergeLocks::default(),
        }
    }

    pub fn locks(&self) -> &MergeLocks {
        &self.locks
    }

    pub fn merge(&self, request: &MergeRequest) -> Result<MergeReceipt, MergeError> {
        let (master, duplicate) = request.validate()?;
        let _claim = self
            .locks
            .try_claim(&[&master, &duplicate])
            .map_err(MergeError::Busy)?;

        if self
            .applicants
            .fetch(&duplicate)
            .map_err(MergeError::Lookup)?
            .is_none()
        {
            return Err(MergeError::DuplicateNotFound(duplicate));
        }
        if self
            .applicants
            .fetch(&master)
            .map_err(MergeError::Lookup)?
            .is_none()
        {
            return Err(MergeError::MasterNotFound(master));
        }

        info!(%master, %duplicate, "merging duplicate applicant");

        let mut moved: Vec<(ChildKind, Vec<ChildId>)> = Vec::new();
        let mut totals = ChildCounts::default();
        for kind in ChildKind::ALL {
            match self.children.reassign(kind, &duplicate, &master) {
                Ok(ids) => {
                    totals.set(kind, ids.len() as u64);
                    moved.push((kind, ids));
                }
                Err(source) => {
                    warn!(
                        %master,
                        %duplicate,
                        kind = kind.label(),
                        error = %source,
                        "child reassignment failed, restoring moved records"
                    );
                    self.restore(&duplicate, &moved);
                    return Err(MergeError::Reassignment {
                        kind,
                        master,
                        duplicate,
                        source,
                    });
                }
            }
        }

        if let Err(source) = self.applicants.delete(&duplicate) {
            warn!(%master, %duplicate, error = %source, "duplicate delete failed after reassignment");
            return Err(MergeError::Delete {
                master,
                duplicate,
                source,
            });
        }

        info!(
            %master,
            %duplicate,
            visits = totals.visit_count,
            events = totals.event_count,
            documents = totals.document_count,
            "merge complete"
        );

        Ok(MergeReceipt {
            master_id: master,
            duplicate_id: duplicate,
            moved: totals,
        })
    }

    fn restore(&self, duplicate: &ApplicantId, moved: &[(ChildKind, Vec<ChildId>)]) {
        for (kind, ids) in moved.iter().rev() {
            if ids.is_empty() {
                continue;
            }
            if let Err(err) = self.children.assign(*kind, ids, duplicate) {
                error!(
                    %duplicate,
                    kind = kind.label(),
                    records = ids.len(),
                    error = %err,
                    "could not restore reassigned records"
                );
            }
        }
    }
}
