use std::sync::Arc;

use super::domain::DuplicateGroup;
use super::finder::{DuplicateFinder, FinderError};
use super::merge::{MergeError, MergeExecutor, MergeReceipt, MergeRequest};
use crate::workflows::applicants::{ApplicantRepository, ChildRecordRepository};

/// Service pairing the duplicate finder with the merge executor over one store.
pub struct DuplicateReviewService<A, C> {
    finder: DuplicateFinder<A, C>,
    executor: MergeExecutor<A, C>,
}

impl<A, C> DuplicateReviewService<A, C>
where
    A: ApplicantRepository + 'static,
    C: ChildRecordRepository + 'static,
{
    pub fn new(applicants: Arc<A>, children: Arc<C>) -> Self {
        Self {
            finder: DuplicateFinder::new(applicants.clone(), children.clone()),
            executor: MergeExecutor::new(applicants, children),
        }
    }

    /// Current duplicate groups across all non-closed applicants.
    pub fn find_duplicates(&self) -> Result<Vec<DuplicateGroup>, FinderError> {
        self.finder.find()
    }

    /// Merge one applicant into another. Re-run [`Self::find_duplicates`] to observe the result.
    pub fn merge(&self, request: &MergeRequest) -> Result<MergeReceipt, MergeError> {
        self.executor.merge(request)
    }

    pub fn executor(&self) -> &MergeExecutor<A, C> {
        &self.executor
    }
}
