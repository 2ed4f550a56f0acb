use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for applicant (household/property case) records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub String);

impl ApplicantId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case status as recorded by intake and case workers.
///
/// Transitions are owned by other parts of the application; duplicate review only
/// needs to know whether a case is closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicantStatus {
    Pending,
    Contacted,
    InProgress,
    Approved,
    Denied,
    OnHold,
    Closed,
    Other(String),
}

impl ApplicantStatus {
    pub fn from_label(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "pending" => Self::Pending,
            "contacted" => Self::Contacted,
            "in_progress" => Self::InProgress,
            "approved" => Self::Approved,
            "denied" => Self::Denied,
            "on_hold" => Self::OnHold,
            "closed" => Self::Closed,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Contacted => "contacted",
            Self::InProgress => "in_progress",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::OnHold => "on_hold",
            Self::Closed => "closed",
            Self::Other(label) => label,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl From<String> for ApplicantStatus {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<ApplicantStatus> for String {
    fn from(value: ApplicantStatus) -> Self {
        value.label().to_string()
    }
}

/// Stored applicant record representing one household/property case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub id: ApplicantId,
    pub full_name: String,
    pub property_address: String,
    pub city: String,
    pub county: String,
    pub zip: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: ApplicantStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// The three kinds of record hanging off an applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
    Visit,
    Event,
    Document,
}

impl ChildKind {
    /// Reassignment order used by merges.
    pub const ALL: [ChildKind; 3] = [ChildKind::Visit, ChildKind::Event, ChildKind::Document];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Visit => "visit",
            Self::Event => "event",
            Self::Document => "document",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "visit" | "visits" => Some(Self::Visit),
            "event" | "events" | "note" | "notes" => Some(Self::Event),
            "document" | "documents" => Some(Self::Document),
            _ => None,
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildId(pub String);

impl ChildId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visit, case-note/event, or document row. Only the applicant reference matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub id: ChildId,
    pub kind: ChildKind,
    pub applicant_id: ApplicantId,
}

/// Per-kind child record tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildCounts {
    pub visit_count: u64,
    pub event_count: u64,
    pub document_count: u64,
}

impl ChildCounts {
    pub fn get(&self, kind: ChildKind) -> u64 {
        match kind {
            ChildKind::Visit => self.visit_count,
            ChildKind::Event => self.event_count,
            ChildKind::Document => self.document_count,
        }
    }

    pub fn set(&mut self, kind: ChildKind, count: u64) {
        match kind {
            ChildKind::Visit => self.visit_count = count,
            ChildKind::Event => self.event_count = count,
            ChildKind::Document => self.document_count = count,
        }
    }

    pub fn total(&self) -> u64 {
        self.visit_count + self.event_count + self.document_count
    }
}

/// Applicant fields plus child counts, as presented to reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantWithCounts {
    #[serde(flatten)]
    pub applicant: ApplicantRecord,
    #[serde(flatten)]
    pub counts: ChildCounts,
}
