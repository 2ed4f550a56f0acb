use std::collections::HashMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::applicants::{
    ApplicantId, ApplicantRecord, ApplicantRepository, ApplicantStatus, ChildId, ChildKind,
    ChildRecord, ChildRecordRepository, InMemoryCaseStore, RepositoryError,
};
use crate::workflows::duplicates::{duplicates_router, DuplicateReviewService};

pub(super) type MemoryService = DuplicateReviewService<InMemoryCaseStore, InMemoryCaseStore>;

pub(super) fn applicant(id: &str, name: &str, address: &str, day: u32) -> ApplicantRecord {
    ApplicantRecord {
        id: ApplicantId::new(id),
        full_name: name.to_string(),
        property_address: address.to_string(),
        city: "Des Moines".to_string(),
        county: "Polk".to_string(),
        zip: "50309".to_string(),
        phone: format!("515-555-01{id:0>2}"),
        email: None,
        status: ApplicantStatus::Pending,
        created_at: Utc
            .with_ymd_and_hms(2025, 3, day, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
        assigned_to: None,
        comments: None,
    }
}

pub(super) fn with_status(mut record: ApplicantRecord, status: ApplicantStatus) -> ApplicantRecord {
    record.status = status;
    record
}

pub(super) fn id(value: &str) -> ApplicantId {
    ApplicantId::new(value)
}

/// Add `count` rows of `kind` for `applicant`, with ids prefixed by `prefix`.
pub(super) fn add_children(
    store: &InMemoryCaseStore,
    kind: ChildKind,
    applicant: &str,
    prefix: &str,
    count: usize,
) {
    for n in 0..count {
        store
            .insert_child(ChildRecord {
                id: ChildId::new(format!("{prefix}-{n}")),
                kind,
                applicant_id: ApplicantId::new(applicant),
            })
            .expect("insert child");
    }
}

pub(super) fn store_with(records: Vec<ApplicantRecord>) -> Arc<InMemoryCaseStore> {
    let store = InMemoryCaseStore::new();
    for record in records {
        store.insert_applicant(record).expect("insert applicant");
    }
    Arc::new(store)
}

pub(super) fn service_for(store: &Arc<InMemoryCaseStore>) -> MemoryService {
    DuplicateReviewService::new(store.clone(), store.clone())
}

/// Two "John Smith" records and two records at "123 Main St", plus a closed one.
pub(super) fn scenario_store() -> Arc<InMemoryCaseStore> {
    store_with(vec![
        applicant("1", "John Smith", "10 Oak Ave", 2),
        applicant("2", "john   smith", "22 Pine Rd", 1),
        applicant("3", "Maria Lopez", "123 Main St.", 4),
        applicant("4", "M. Lopez", "123 main st", 3),
        with_status(
            applicant("5", "John Smith", "123 Main St", 5),
            ApplicantStatus::Closed,
        ),
    ])
}

pub(super) fn child_totals(store: &InMemoryCaseStore, applicant: &str) -> HashMap<ChildKind, u64> {
    ChildKind::ALL
        .into_iter()
        .map(|kind| {
            let count = store
                .child_count(kind, &ApplicantId::new(applicant))
                .expect("count");
            (kind, count)
        })
        .collect()
}

pub(super) fn memory_router(store: &Arc<InMemoryCaseStore>) -> axum::Router {
    duplicates_router(Arc::new(service_for(store)))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every operation fails.
pub(super) struct UnavailableStore;

impl ApplicantRepository for UnavailableStore {
    fn active(&self) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &ApplicantId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl ChildRecordRepository for UnavailableStore {
    fn count_by_applicant(
        &self,
        _kind: ChildKind,
        _applicants: &[ApplicantId],
    ) -> Result<HashMap<ApplicantId, u64>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn reassign(
        &self,
        _kind: ChildKind,
        _from: &ApplicantId,
        _to: &ApplicantId,
    ) -> Result<Vec<ChildId>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn assign(
        &self,
        _kind: ChildKind,
        _children: &[ChildId],
        _to: &ApplicantId,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
