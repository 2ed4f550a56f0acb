use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{membership, DuplicateGroup, MatchType};
use super::normalizer::{address_key, name_key};
use crate::workflows::applicants::{
    ApplicantId, ApplicantRecord, ApplicantRepository, ApplicantWithCounts, ChildCounts,
    ChildKind, ChildRecordRepository, RepositoryError,
};

/// Child record counts per kind for one scan.
#[derive(Debug, Clone, Default)]
pub struct ChildCountIndex {
    by_kind: HashMap<ChildKind, HashMap<ApplicantId, u64>>,
}

impl ChildCountIndex {
    pub fn insert(&mut self, kind: ChildKind, counts: HashMap<ApplicantId, u64>) {
        self.by_kind.insert(kind, counts);
    }

    /// Counts for one applicant; kinds or ids without data read as zero.
    pub fn counts_for(&self, id: &ApplicantId) -> ChildCounts {
        let mut counts = ChildCounts::default();
        for kind in ChildKind::ALL {
            let count = self
                .by_kind
                .get(&kind)
                .and_then(|map| map.get(id))
                .copied()
                .unwrap_or(0);
            counts.set(kind, count);
        }
        counts
    }
}

/// Error raised when a duplicate scan cannot read the applicant set.
#[derive(Debug, thiserror::Error)]
pub enum FinderError {
    #[error("unable to load applicants: {0}")]
    Fetch(#[source] RepositoryError),
}

/// Reads a snapshot of active applicants and groups likely duplicates.
pub struct DuplicateFinder<A, C> {
    applicants: Arc<A>,
    children: Arc<C>,
}

impl<A, C> DuplicateFinder<A, C>
where
    A: ApplicantRepository + 'static,
    C: ChildRecordRepository + 'static,
{
    pub fn new(applicants: Arc<A>, children: Arc<C>) -> Self {
        Self {
            applicants,
            children,
        }
    }

    pub fn find(&self) -> Result<Vec<DuplicateGroup>, FinderError> {
        let applicants = self.applicants.active().map_err(FinderError::Fetch)?;
        if applicants.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ApplicantId> = applicants.iter().map(|record| record.id.clone()).collect();
        let mut counts = ChildCountIndex::default();
        for kind in ChildKind::ALL {
            match self.children.count_by_applicant(kind, &ids) {
                Ok(map) => counts.insert(kind, map),
                Err(err) => {
                    warn!(
                        kind = kind.label(),
                        error = %err,
                        "child count lookup failed, reporting zero"
                    );
                }
            }
        }

        let scanned = applicants.len();
        let groups = group_duplicates(applicants, &counts);
        info!(scanned, groups = groups.len(), "duplicate scan complete");
        Ok(groups)
    }
}

/// Group applicants by name key, then by address key, dropping address groups whose
/// exact member set was already reported.
///
/// `applicants` is expected newest first; keys are emitted in first-seen order so
/// repeated scans over unchanged data produce identical output.
pub fn group_duplicates(
    applicants: Vec<ApplicantRecord>,
    counts: &ChildCountIndex,
) -> Vec<DuplicateGroup> {
    let augmented: Vec<ApplicantWithCounts> = applicants
        .into_iter()
        .map(|applicant| {
            let counts = counts.counts_for(&applicant.id);
            ApplicantWithCounts { applicant, counts }
        })
        .collect();

    let mut groups = Vec::new();
    let mut reported: HashSet<BTreeSet<ApplicantId>> = HashSet::new();

    for members in bucket_by(&augmented, |record| name_key(&record.full_name)) {
        let group = build_group(MatchType::Name, members, |record| &record.full_name);
        reported.insert(group.membership());
        groups.push(group);
    }

    for members in bucket_by(&augmented, |record| address_key(&record.property_address)) {
        let ids = membership(members.iter().map(|member| &member.applicant.id));
        if !reported.insert(ids) {
            continue;
        }
        groups.push(build_group(MatchType::Address, members, |record| {
            &record.property_address
        }));
    }

    groups
}

/// Buckets with more than one member, in first-seen key order. Blank keys never group.
fn bucket_by<F>(records: &[ApplicantWithCounts], key_of: F) -> Vec<Vec<&ApplicantWithCounts>>
where
    F: Fn(&ApplicantRecord) -> String,
{
    let mut buckets: Vec<Vec<&ApplicantWithCounts>> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = key_of(&record.applicant);
        if key.is_empty() {
            continue;
        }
        let slot = *slots.entry(key).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(record);
    }

    buckets.retain(|members| members.len() > 1);
    buckets
}

fn build_group<F>(
    match_type: MatchType,
    members: Vec<&ApplicantWithCounts>,
    original: F,
) -> DuplicateGroup
where
    F: Fn(&ApplicantRecord) -> &String,
{
    let mut applications: Vec<ApplicantWithCounts> = members.into_iter().cloned().collect();
    applications.sort_by(|a, b| b.applicant.created_at.cmp(&a.applicant.created_at));
    let match_value = applications
        .first()
        .map(|member| original(&member.applicant).clone())
        .unwrap_or_default();

    DuplicateGroup {
        match_type,
        match_value,
        applications,
    }
}
