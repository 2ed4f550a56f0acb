use casework::error::AppError;
use casework::workflows::applicants::{
    load_store, seed_store, ApplicantId, ApplicantRecord, ApplicantStatus, ChildId, ChildKind,
    ChildRecord, InMemoryCaseStore,
};
use casework::workflows::duplicates::{DuplicateGroup, DuplicateReviewService, MergeRequest};
use chrono::{TimeZone, Utc};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScanArgs {
    /// Applicant table export (CSV)
    #[arg(long)]
    pub(crate) applicants: PathBuf,
    /// Visit/event/document export (CSV with id, kind, applicant_id)
    #[arg(long)]
    pub(crate) children: Option<PathBuf>,
    /// Print the groups as JSON instead of a text listing
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the merge step and only list duplicate groups.
    #[arg(long)]
    pub(crate) skip_merge: bool,
}

pub(crate) fn run_scan(args: ScanArgs) -> Result<(), AppError> {
    let ScanArgs {
        applicants,
        children,
        json,
    } = args;

    let store = Arc::new(load_store(applicants, children)?);
    let service = DuplicateReviewService::new(store.clone(), store);
    let groups = service.find_duplicates()?;

    if json {
        match serde_json::to_string_pretty(&groups) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Duplicate groups unavailable as JSON: {err}"),
        }
    } else {
        render_groups(&groups);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Duplicate review demo");
    let store = Arc::new(demo_store()?);
    let service = DuplicateReviewService::new(store.clone(), store.clone());

    let groups = service.find_duplicates()?;
    render_groups(&groups);

    if args.skip_merge {
        return Ok(());
    }

    println!("\nMerging applicant 2 into applicant 1");
    let receipt = service.merge(&MergeRequest::new("1", "2"))?;
    println!(
        "- Moved {} visits, {} notes, {} documents to {}",
        receipt.moved.visit_count,
        receipt.moved.event_count,
        receipt.moved.document_count,
        receipt.master_id
    );

    let master = ApplicantId::new("1");
    println!(
        "- Applicant {} now has {} visits and {} notes",
        master,
        child_count(&store, ChildKind::Visit, &master),
        child_count(&store, ChildKind::Event, &master)
    );

    println!("\nAfter merge");
    render_groups(&service.find_duplicates()?);

    println!("\nRejected merge attempts");
    for request in [MergeRequest::new("1", "1"), MergeRequest::new("1", "2")] {
        match service.merge(&request) {
            Ok(_) => println!("- {} -> {}: unexpectedly merged", request.duplicate_id, request.master_id),
            Err(err) => println!(
                "- {} -> {}: {} ({})",
                request.duplicate_id,
                request.master_id,
                err,
                err.reason()
            ),
        }
    }

    Ok(())
}

fn child_count(store: &InMemoryCaseStore, kind: ChildKind, applicant: &ApplicantId) -> String {
    match store.child_count(kind, applicant) {
        Ok(count) => count.to_string(),
        Err(err) => format!("unknown ({err})"),
    }
}

fn render_groups(groups: &[DuplicateGroup]) {
    if groups.is_empty() {
        println!("Duplicate groups: none");
        return;
    }

    println!("Duplicate groups");
    for group in groups {
        println!(
            "- {} match \"{}\" ({} records)",
            group.match_type.label(),
            group.match_value,
            group.applications.len()
        );
        for member in &group.applications {
            println!(
                "    {} | {} | {} | created {} | {} visits, {} notes, {} documents",
                member.applicant.id,
                member.applicant.full_name,
                member.applicant.property_address,
                member.applicant.created_at.format("%Y-%m-%d"),
                member.counts.visit_count,
                member.counts.event_count,
                member.counts.document_count
            );
        }
    }
}

fn demo_applicant(
    id: &str,
    name: &str,
    address: &str,
    day: u32,
    status: ApplicantStatus,
) -> ApplicantRecord {
    ApplicantRecord {
        id: ApplicantId::new(id),
        full_name: name.to_string(),
        property_address: address.to_string(),
        city: "Des Moines".to_string(),
        county: "Polk".to_string(),
        zip: "50309".to_string(),
        phone: "515-555-0100".to_string(),
        email: None,
        status,
        created_at: Utc
            .with_ymd_and_hms(2025, 3, day, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        assigned_to: Some("field-worker-3".to_string()),
        comments: None,
    }
}

fn demo_children(applicant: &str, kind: ChildKind, count: usize) -> Vec<ChildRecord> {
    (0..count)
        .map(|n| ChildRecord {
            id: ChildId::new(format!("{}-{}-{n}", kind.label(), applicant)),
            kind,
            applicant_id: ApplicantId::new(applicant),
        })
        .collect()
}

fn demo_store() -> Result<InMemoryCaseStore, AppError> {
    let applicants = vec![
        demo_applicant("1", "John Smith", "40 Walnut St", 2, ApplicantStatus::Pending),
        demo_applicant("2", "john   smith", "1200 Grand Ave", 1, ApplicantStatus::Pending),
        demo_applicant("3", "Rosa Diaz", "123 Main St.", 4, ApplicantStatus::Contacted),
        demo_applicant("4", "R. Diaz", "123 main st", 3, ApplicantStatus::InProgress),
        demo_applicant("5", "John Smith", "9 Elm Ct", 5, ApplicantStatus::Closed),
    ];

    let mut children = demo_children("2", ChildKind::Visit, 3);
    children.extend(demo_children("2", ChildKind::Event, 1));
    children.extend(demo_children("1", ChildKind::Event, 2));
    children.extend(demo_children("3", ChildKind::Document, 1));

    Ok(seed_store(applicants, children)?)
}
