use super::common::*;
use std::sync::Arc;

use crate::workflows::applicants::{ApplicantStatus, ChildKind, FaultPlan};
use crate::workflows::duplicates::{
    group_duplicates, ChildCountIndex, DuplicateReviewService, FinderError, MatchType,
};

#[test]
fn mixed_case_names_group_newest_first() {
    let store = store_with(vec![
        applicant("2", "john   smith", "22 Pine Rd", 1),
        applicant("1", "John Smith", "10 Oak Ave", 2),
    ]);

    let groups = service_for(&store).find_duplicates().expect("scan succeeds");

    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.match_type, MatchType::Name);
    assert_eq!(group.match_value, "John Smith");
    assert_eq!(group.member_ids(), vec![&id("1"), &id("2")]);
}

#[test]
fn punctuation_differences_group_by_address() {
    let store = store_with(vec![
        applicant("3", "Maria Lopez", "123 Main St.", 4),
        applicant("4", "M. Lopez", "123 main st", 3),
    ]);

    let groups = service_for(&store).find_duplicates().expect("scan succeeds");

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].match_type, MatchType::Address);
    assert_eq!(groups[0].match_value, "123 Main St.");
    assert_eq!(groups[0].member_ids(), vec![&id("3"), &id("4")]);
}

#[test]
fn identical_membership_is_reported_once_under_name() {
    let store = store_with(vec![
        applicant("1", "Ann Lee", "5 Birch Ln", 2),
        applicant("2", "ann lee", "5 birch ln.", 1),
    ]);

    let groups = service_for(&store).find_duplicates().expect("scan succeeds");

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].match_type, MatchType::Name);
}

#[test]
fn overlapping_membership_reports_both_groups() {
    let store = store_with(vec![
        applicant("a", "Ann Lee", "5 Birch Ln", 3),
        applicant("b", "ANN LEE", "5 Birch Ln", 2),
        applicant("c", "Ben Lee", "5 birch ln", 1),
    ]);

    let groups = service_for(&store).find_duplicates().expect("scan succeeds");

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].match_type, MatchType::Name);
    assert_eq!(groups[0].member_ids(), vec![&id("a"), &id("b")]);
    assert_eq!(groups[1].match_type, MatchType::Address);
    assert_eq!(groups[1].member_ids(), vec![&id("a"), &id("b"), &id("c")]);
}

#[test]
fn name_groups_precede_address_groups() {
    let groups = service_for(&scenario_store())
        .find_duplicates()
        .expect("scan succeeds");

    let kinds: Vec<MatchType> = groups.iter().map(|group| group.match_type).collect();
    assert_eq!(kinds, vec![MatchType::Name, MatchType::Address]);
}

#[test]
fn closed_applicants_never_appear() {
    let store = scenario_store();
    let groups = service_for(&store).find_duplicates().expect("scan succeeds");

    assert!(groups.iter().all(|group| !group.contains(&id("5"))));
}

#[test]
fn no_shared_keys_yields_empty_list() {
    let store = store_with(vec![
        applicant("1", "Ann Lee", "5 Birch Ln", 1),
        applicant("2", "Ben Ortiz", "9 Cedar Ct", 2),
    ]);
    assert!(service_for(&store)
        .find_duplicates()
        .expect("scan succeeds")
        .is_empty());

    let empty = store_with(Vec::new());
    assert!(service_for(&empty)
        .find_duplicates()
        .expect("scan succeeds")
        .is_empty());
}

#[test]
fn only_closed_applicants_yields_empty_list() {
    let store = store_with(vec![
        with_status(applicant("1", "Ann Lee", "5 Birch Ln", 1), ApplicantStatus::Closed),
        with_status(applicant("2", "Ann Lee", "5 Birch Ln", 2), ApplicantStatus::Closed),
    ]);
    assert!(service_for(&store)
        .find_duplicates()
        .expect("scan succeeds")
        .is_empty());
}

#[test]
fn blank_addresses_do_not_group() {
    let store = store_with(vec![
        applicant("1", "Ann Lee", "  ", 1),
        applicant("2", "Ben Ortiz", "", 2),
    ]);
    assert!(service_for(&store)
        .find_duplicates()
        .expect("scan succeeds")
        .is_empty());
}

#[test]
fn repeated_scans_are_identical() {
    let store = scenario_store();
    add_children(&store, ChildKind::Visit, "1", "v", 2);
    let service = service_for(&store);

    let first = service.find_duplicates().expect("first scan");
    let second = service.find_duplicates().expect("second scan");
    assert_eq!(first, second);
}

#[test]
fn members_carry_child_counts() {
    let store = scenario_store();
    add_children(&store, ChildKind::Visit, "2", "v", 3);
    add_children(&store, ChildKind::Event, "2", "e", 1);
    add_children(&store, ChildKind::Document, "1", "d", 2);

    let groups = service_for(&store).find_duplicates().expect("scan succeeds");
    let name_group = &groups[0];

    let newer = &name_group.applications[0];
    assert_eq!(newer.applicant.id, id("1"));
    assert_eq!(newer.counts.visit_count, 0);
    assert_eq!(newer.counts.document_count, 2);

    let older = &name_group.applications[1];
    assert_eq!(older.counts.visit_count, 3);
    assert_eq!(older.counts.event_count, 1);
    assert_eq!(older.counts.document_count, 0);
}

#[test]
fn failed_count_lookup_degrades_to_zero() {
    let store = scenario_store();
    add_children(&store, ChildKind::Visit, "2", "v", 3);
    add_children(&store, ChildKind::Event, "2", "e", 1);
    store
        .set_faults(FaultPlan {
            fail_counts: Some(ChildKind::Visit),
            ..FaultPlan::default()
        })
        .expect("set faults");

    let groups = service_for(&store).find_duplicates().expect("scan succeeds");
    let older = &groups[0].applications[1];
    assert_eq!(older.counts.visit_count, 0);
    assert_eq!(older.counts.event_count, 1);
}

#[test]
fn applicant_read_failure_is_reported() {
    let store = scenario_store();
    store
        .set_faults(FaultPlan {
            fail_applicant_reads: true,
            ..FaultPlan::default()
        })
        .expect("set faults");

    match service_for(&store).find_duplicates() {
        Err(FinderError::Fetch(_)) => {}
        other => panic!("expected fetch failure, got {other:?}"),
    }
}

#[test]
fn unavailable_store_surfaces_fetch_error() {
    let store = Arc::new(UnavailableStore);
    let service = DuplicateReviewService::new(store.clone(), store);
    assert!(matches!(
        service.find_duplicates(),
        Err(FinderError::Fetch(_))
    ));
}

#[test]
fn grouping_is_a_pure_function_of_its_inputs() {
    let records = vec![
        applicant("1", "John Smith", "10 Oak Ave", 2),
        applicant("2", "john smith", "10 Oak Ave.", 1),
        applicant("3", "Jane Smith", "10 oak ave", 3),
    ];

    let groups = group_duplicates(records.clone(), &ChildCountIndex::default());
    assert_eq!(groups, group_duplicates(records, &ChildCountIndex::default()));

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[1].match_type, MatchType::Address);
    assert_eq!(groups[1].match_value, "10 oak ave");
    assert_eq!(groups[1].member_ids(), vec![&id("3"), &id("1"), &id("2")]);
}

#[test]
fn ids_containing_commas_do_not_collide() {
    let records = vec![
        applicant("a,b", "Ann Lee", "1 Oak St", 4),
        applicant("c", "Ann Lee", "9 Pine Rd", 3),
        applicant("a", "Bob Ray", "5 Elm Ct", 2),
        applicant("b,c", "Cy Doe", "5 Elm Ct", 1),
    ];

    let groups = group_duplicates(records, &ChildCountIndex::default());

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].match_type, MatchType::Name);
    assert_eq!(groups[1].match_type, MatchType::Address);
    let ids: Vec<&str> = groups[1]
        .member_ids()
        .into_iter()
        .map(|id| id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b,c"]);
}

#[test]
fn blank_names_still_group_by_address() {
    let records = vec![
        applicant("1", "  ", "5 Elm Ct", 2),
        applicant("2", "", "5 elm ct.", 1),
    ];

    let groups = group_duplicates(records, &ChildCountIndex::default());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].match_type, MatchType::Address);
}
