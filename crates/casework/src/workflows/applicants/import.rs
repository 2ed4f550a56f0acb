//! CSV hydration for the in-memory case store.
//!
//! The hosted database exports each table as CSV; these readers accept those exports so
//! the service and CLI can run against a realistic snapshot.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{ApplicantId, ApplicantRecord, ApplicantStatus, ChildId, ChildKind, ChildRecord};
use super::memory::InMemoryCaseStore;
use super::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("applicant {id} has unparseable created_at '{value}'")]
    InvalidTimestamp { id: String, value: String },
    #[error("child record {id} has unknown kind '{value}'")]
    InvalidKind { id: String, value: String },
    #[error("could not load record {id}: {source}")]
    Store {
        id: String,
        #[source]
        source: RepositoryError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    id: String,
    full_name: String,
    #[serde(default)]
    property_address: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    county: String,
    #[serde(default)]
    zip: String,
    #[serde(default)]
    phone: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    status: String,
    created_at: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    assigned_to: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    comments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChildRow {
    id: String,
    kind: String,
    applicant_id: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::Headers);
    builder
}

pub fn parse_applicants<R: Read>(reader: R) -> Result<Vec<ApplicantRecord>, ImportError> {
    let mut csv_reader = reader_builder().from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<ApplicantRow>() {
        let row = row?;
        let created_at =
            parse_timestamp(&row.created_at).ok_or_else(|| ImportError::InvalidTimestamp {
                id: row.id.clone(),
                value: row.created_at.clone(),
            })?;

        records.push(ApplicantRecord {
            id: ApplicantId(row.id.trim().to_string()),
            full_name: row.full_name,
            property_address: row.property_address,
            city: row.city,
            county: row.county,
            zip: row.zip,
            phone: row.phone,
            email: row.email,
            status: ApplicantStatus::from_label(&row.status),
            created_at,
            assigned_to: row.assigned_to,
            comments: row.comments,
        });
    }

    Ok(records)
}

pub fn parse_children<R: Read>(reader: R) -> Result<Vec<ChildRecord>, ImportError> {
    let mut csv_reader = reader_builder().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<ChildRow>() {
        let row = row?;
        let kind = ChildKind::from_label(&row.kind).ok_or_else(|| ImportError::InvalidKind {
            id: row.id.clone(),
            value: row.kind.clone(),
        })?;
        records.push(ChildRecord {
            id: ChildId(row.id),
            kind,
            applicant_id: ApplicantId(row.applicant_id),
        });
    }

    Ok(records)
}

/// Build a store from an applicant export and an optional child-record export.
pub fn load_store<P: AsRef<Path>>(
    applicants: P,
    children: Option<P>,
) -> Result<InMemoryCaseStore, ImportError> {
    let applicants = parse_applicants(File::open(applicants)?)?;
    let children = match children {
        Some(path) => parse_children(File::open(path)?)?,
        None => Vec::new(),
    };
    seed_store(applicants, children)
}

pub fn seed_store(
    applicants: Vec<ApplicantRecord>,
    children: Vec<ChildRecord>,
) -> Result<InMemoryCaseStore, ImportError> {
    let store = InMemoryCaseStore::new();
    for record in applicants {
        let id = record.id.0.clone();
        store
            .insert_applicant(record)
            .map_err(|source| ImportError::Store { id, source })?;
    }
    for record in children {
        let id = record.id.0.clone();
        store
            .insert_child(record)
            .map_err(|source| ImportError::Store { id, source })?;
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::applicants::repository::ApplicantRepository;

    const APPLICANTS: &str = "id,full_name,property_address,city,county,zip,phone,email,status,created_at,assigned_to,comments\n\
1,John Smith,123 Main St.,Des Moines,Polk,50309,515-555-0100,,pending,2025-03-02T10:00:00Z,,\n\
2,john   smith,\"123 main st\",Des Moines,Polk,50309,515-555-0101,js@example.org,In-Progress,2025-03-01,worker-7,called twice\n";

    #[test]
    fn parses_applicant_export() {
        let records = parse_applicants(APPLICANTS.as_bytes()).expect("parses");
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id, ApplicantId::new("1"));
        assert!(first.email.is_none());
        assert!(first.assigned_to.is_none());
        assert_eq!(first.status, ApplicantStatus::Pending);

        let second = &records[1];
        assert_eq!(second.full_name, "john   smith");
        assert_eq!(second.status, ApplicantStatus::InProgress);
        assert_eq!(second.email.as_deref(), Some("js@example.org"));
        assert_eq!(second.assigned_to.as_deref(), Some("worker-7"));
        assert_eq!(second.created_at.to_rfc3339(), "2025-03-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_bad_timestamps() {
        let csv = "id,full_name,status,created_at\n9,Ann Lee,pending,yesterday\n";
        match parse_applicants(csv.as_bytes()) {
            Err(ImportError::InvalidTimestamp { id, .. }) => assert_eq!(id, "9"),
            other => panic!("expected timestamp error, got {other:?}"),
        }
    }

    #[test]
    fn parses_children_and_rejects_unknown_kinds() {
        let csv = "id,kind,applicant_id\nv1,visit,1\nn1,notes,1\n";
        let children = parse_children(csv.as_bytes()).expect("parses");
        assert_eq!(children[1].kind, ChildKind::Event);

        let bad = "id,kind,applicant_id\nx1,photo,1\n";
        assert!(matches!(
            parse_children(bad.as_bytes()),
            Err(ImportError::InvalidKind { .. })
        ));
    }

    #[test]
    fn seed_store_rejects_orphaned_children() {
        let applicants = parse_applicants(APPLICANTS.as_bytes()).expect("parses");
        let children =
            parse_children("id,kind,applicant_id\nv1,visit,404\n".as_bytes()).expect("parses");

        match seed_store(applicants, children) {
            Err(ImportError::Store {
                id,
                source: RepositoryError::NotFound,
            }) => assert_eq!(id, "v1"),
            other => panic!("expected orphan rejection, got {other:?}"),
        }
    }

    #[test]
    fn seed_store_loads_active_applicants() {
        let applicants = parse_applicants(APPLICANTS.as_bytes()).expect("parses");
        let store = seed_store(applicants, Vec::new()).expect("seeds");
        assert_eq!(store.active().expect("active").len(), 2);
    }
}
