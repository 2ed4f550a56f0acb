use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::workflows::applicants::{ApplicantId, ApplicantWithCounts};

/// Which normalized field a duplicate group was matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Name,
    Address,
}

impl MatchType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Address => "address",
        }
    }
}

/// Applicants sharing a normalized name or address, newest first.
///
/// Derived on every scan and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub match_type: MatchType,
    pub match_value: String,
    pub applications: Vec<ApplicantWithCounts>,
}

impl DuplicateGroup {
    pub fn member_ids(&self) -> Vec<&ApplicantId> {
        self.applications
            .iter()
            .map(|member| &member.applicant.id)
            .collect()
    }

    pub fn contains(&self, id: &ApplicantId) -> bool {
        self.applications
            .iter()
            .any(|member| &member.applicant.id == id)
    }

    /// Order-independent identity of the member set.
    pub fn membership(&self) -> BTreeSet<ApplicantId> {
        membership(self.applications.iter().map(|member| &member.applicant.id))
    }
}

pub(crate) fn membership<'a, I>(ids: I) -> BTreeSet<ApplicantId>
where
    I: IntoIterator<Item = &'a ApplicantId>,
{
    ids.into_iter().cloned().collect()
}
