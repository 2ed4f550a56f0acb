use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{ApplicantId, ApplicantRecord, ChildId, ChildKind, ChildRecord};
use super::repository::{ApplicantRepository, ChildRecordRepository, RepositoryError};

/// Failures the in-memory store should simulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultPlan {
    pub fail_applicant_reads: bool,
    pub fail_counts: Option<ChildKind>,
    pub fail_reassign: Option<ChildKind>,
    pub fail_delete: bool,
}

/// Mutex-backed stand-in for the hosted case database.
///
/// Deletes are refused while child rows still reference the applicant, mirroring a
/// restrictive foreign key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCaseStore {
    applicants: Arc<Mutex<BTreeMap<ApplicantId, ApplicantRecord>>>,
    children: Arc<Mutex<BTreeMap<ChildId, ChildRecord>>>,
    faults: Arc<Mutex<FaultPlan>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

fn injected(operation: &str) -> RepositoryError {
    RepositoryError::Unavailable(format!("injected failure during {operation}"))
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_applicant(&self, record: ApplicantRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.applicants)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn insert_child(&self, record: ChildRecord) -> Result<(), RepositoryError> {
        if !lock(&self.applicants)?.contains_key(&record.applicant_id) {
            return Err(RepositoryError::NotFound);
        }
        let mut guard = lock(&self.children)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn applicants(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        Ok(lock(&self.applicants)?.values().cloned().collect())
    }

    pub fn children(&self) -> Result<Vec<ChildRecord>, RepositoryError> {
        Ok(lock(&self.children)?.values().cloned().collect())
    }

    /// Number of `kind` rows currently referencing `applicant`.
    pub fn child_count(
        &self,
        kind: ChildKind,
        applicant: &ApplicantId,
    ) -> Result<u64, RepositoryError> {
        Ok(lock(&self.children)?
            .values()
            .filter(|child| child.kind == kind && &child.applicant_id == applicant)
            .count() as u64)
    }

    pub fn set_faults(&self, plan: FaultPlan) -> Result<(), RepositoryError> {
        *lock(&self.faults)? = plan;
        Ok(())
    }

    fn faults(&self) -> Result<FaultPlan, RepositoryError> {
        Ok(lock(&self.faults)?.clone())
    }
}

impl ApplicantRepository for InMemoryCaseStore {
    fn active(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        if self.faults()?.fail_applicant_reads {
            return Err(injected("applicant read"));
        }
        let mut records: Vec<ApplicantRecord> = lock(&self.applicants)?
            .values()
            .filter(|record| !record.status.is_closed())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn fetch(&self, id: &ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
        if self.faults()?.fail_applicant_reads {
            return Err(injected("applicant read"));
        }
        Ok(lock(&self.applicants)?.get(id).cloned())
    }

    fn delete(&self, id: &ApplicantId) -> Result<(), RepositoryError> {
        if self.faults()?.fail_delete {
            return Err(injected("applicant delete"));
        }
        let children = lock(&self.children)?;
        let mut applicants = lock(&self.applicants)?;
        if !applicants.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }
        if children.values().any(|child| &child.applicant_id == id) {
            return Err(RepositoryError::Conflict);
        }
        applicants.remove(id);
        Ok(())
    }
}

impl ChildRecordRepository for InMemoryCaseStore {
    fn count_by_applicant(
        &self,
        kind: ChildKind,
        applicants: &[ApplicantId],
    ) -> Result<HashMap<ApplicantId, u64>, RepositoryError> {
        if self.faults()?.fail_counts == Some(kind) {
            return Err(injected("child count"));
        }
        let wanted: HashSet<&ApplicantId> = applicants.iter().collect();
        let mut counts = HashMap::new();
        for child in lock(&self.children)?.values() {
            if child.kind == kind && wanted.contains(&child.applicant_id) {
                *counts.entry(child.applicant_id.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    fn reassign(
        &self,
        kind: ChildKind,
        from: &ApplicantId,
        to: &ApplicantId,
    ) -> Result<Vec<ChildId>, RepositoryError> {
        if self.faults()?.fail_reassign == Some(kind) {
            return Err(injected("child reassignment"));
        }
        let mut children = lock(&self.children)?;
        if !lock(&self.applicants)?.contains_key(to) {
            return Err(RepositoryError::NotFound);
        }
        let mut moved = Vec::new();
        for child in children.values_mut() {
            if child.kind == kind && &child.applicant_id == from {
                child.applicant_id = to.clone();
                moved.push(child.id.clone());
            }
        }
        Ok(moved)
    }

    fn assign(
        &self,
        kind: ChildKind,
        children: &[ChildId],
        to: &ApplicantId,
    ) -> Result<(), RepositoryError> {
        let mut rows = lock(&self.children)?;
        if !lock(&self.applicants)?.contains_key(to) {
            return Err(RepositoryError::NotFound);
        }
        if children
            .iter()
            .any(|id| rows.get(id).map_or(true, |child| child.kind != kind))
        {
            return Err(RepositoryError::NotFound);
        }
        for id in children {
            if let Some(child) = rows.get_mut(id) {
                child.applicant_id = to.clone();
            }
        }
        Ok(())
    }
}
