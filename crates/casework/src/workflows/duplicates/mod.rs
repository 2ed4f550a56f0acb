//! Duplicate applicant detection and record merging.
//!
//! Scans group non-closed applicants that share a normalized name or property address so
//! a reviewer can pick a master record; merges move visits, case notes, and documents to
//! the master before the duplicate applicant is deleted.

pub mod domain;
pub mod finder;
pub mod merge;
pub mod normalizer;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{DuplicateGroup, MatchType};
pub use finder::{group_duplicates, ChildCountIndex, DuplicateFinder, FinderError};
pub use merge::{MergeClaim, MergeError, MergeExecutor, MergeLocks, MergeReceipt, MergeRequest};
pub use normalizer::{address_key, name_key};
pub use router::duplicates_router;
pub use service::DuplicateReviewService;
