//! Applicant and child-record model plus the storage seams duplicate review runs against.

pub mod domain;
pub mod import;
pub mod memory;
pub mod repository;

pub use domain::{
    ApplicantId, ApplicantRecord, ApplicantStatus, ApplicantWithCounts, ChildCounts, ChildId,
    ChildKind, ChildRecord,
};
pub use import::{load_store, parse_applicants, parse_children, seed_store, ImportError};
pub use memory::{FaultPlan, InMemoryCaseStore};
pub use repository::{ApplicantRepository, ChildRecordRepository, RepositoryError};
