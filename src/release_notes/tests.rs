use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::forge::{manager::ForgeOptions, traits::MockForge};

fn merge_request(iid: u64, title: &str, labels: &[&str]) -> MergeRequest {
    MergeRequest {
        iid,
        title: title.into(),
        merged_at: None,
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

fn merged_at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

fn boundary(iid: u64, hour: u32) -> MergeRequest {
    MergeRequest {
        merged_at: Some(merged_at(hour)),
        ..merge_request(iid, "Version Update", &["Version Update"])
    }
}

#[test]
fn finds_bracketed_ticket() {
    let ticket = find_ticket("[ABC-123] Fix login").unwrap();
    assert_eq!(ticket.token, "[ABC-123]");
    assert_eq!(ticket.id, "ABC-123");
}

#[test]
fn finds_plain_ticket() {
    let ticket = find_ticket("feat: ABC-7 add search").unwrap();
    assert_eq!(ticket.token, "ABC-7");
    assert_eq!(ticket.id, "ABC-7");
}

#[test]
fn finds_first_ticket_only() {
    let ticket = find_ticket("[OPS-1] follow up to [OPS-2]").unwrap();
    assert_eq!(ticket.id, "OPS-1");
}

#[test]
fn no_ticket_in_title() {
    assert!(find_ticket("Fix thing - Some Title").is_none());
    assert!(find_ticket("bump deps").is_none());
    assert!(find_ticket("[ABC-] partial").is_none());
}

#[test]
fn substring_after_trims_separator() {
    assert_eq!(substring_after("[ABC-123] - Some Title", "[ABC-123]"), "Some Title");
    assert_eq!(
        substring_after("[ABC-123] Fix thing - Some Title", "[ABC-123]"),
        "Fix thing - Some Title"
    );
}

#[test]
fn substring_after_uses_last_occurrence() {
    assert_eq!(
        substring_after("[ABC-1] revert [ABC-1] - Second try", "[ABC-1]"),
        "Second try"
    );
}

#[test]
fn substring_after_token_at_end_is_empty() {
    assert_eq!(substring_after("[ABC-123]", "[ABC-123]"), "");
    assert_eq!(substring_after("Fix [ABC-123]", "[ABC-123]"), "");
}

#[test]
fn substring_after_missing_target_is_empty() {
    assert_eq!(substring_after("Fix login", "[ABC-123]"), "");
}

#[test]
fn format_labels_quotes_and_joins() {
    let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    assert_eq!(format_labels(&labels), "`a` `b` `c`");
}

#[test]
fn format_single_label() {
    assert_eq!(format_labels(&["x".to_string()]), "`x`");
}

#[test]
fn format_no_labels() {
    assert_eq!(format_labels(&[]), "");
}

#[test]
fn note_line_format() {
    let mr = merge_request(1, "[ABC-123] - Fix login", &["bug", "frontend"]);
    assert_eq!(
        note_line(&mr).unwrap(),
        "ABC-123 - Fix login - `bug` `frontend`\n"
    );
}

#[test]
fn build_release_note_skips_requests_without_ticket() {
    let merge_requests = vec![
        merge_request(1, "[ABC-1] First", &["bug"]),
        merge_request(2, "chore: bump deps", &["deps"]),
        merge_request(3, "XYZ-9 - Second", &[]),
    ];

    let note = build_release_note(&merge_requests);

    assert_eq!(note, "ABC-1 - First - `bug`\nXYZ-9 - Second - \n");
}

#[test]
fn build_release_note_is_repeatable() {
    let merge_requests = vec![
        merge_request(1, "[ABC-1] First", &["bug"]),
        merge_request(2, "[ABC-2] Second", &["feature"]),
    ];
    let snapshot = merge_requests.clone();

    let first = build_release_note(&merge_requests);
    let second = build_release_note(&merge_requests);

    assert_eq!(first, second);
    assert_eq!(merge_requests, snapshot);
}

#[tokio::test]
async fn compose_collects_requests_between_boundaries() {
    let mut mock_forge = MockForge::new();

    mock_forge
        .expect_list_merged_merge_requests()
        .withf(|req| req.labels == vec!["Version Update".to_string()])
        .times(1)
        .returning(|_| Ok(vec![boundary(40, 12), boundary(30, 8), boundary(20, 4)]));

    mock_forge
        .expect_list_merged_merge_requests()
        .withf(|req| req.labels.is_empty())
        .times(1)
        .returning(|req| {
            assert_eq!(req.target_branch, "develop");
            assert_eq!(req.updated_after, Some(merged_at(8)));
            assert_eq!(req.updated_before, Some(merged_at(12)));
            Ok(vec![
                merge_request(35, "[ABC-2] - Add search", &["feature"]),
                merge_request(33, "Merge branch develop", &[]),
                merge_request(31, "[ABC-1] - Fix login", &["bug", "frontend"]),
            ])
        });

    let manager = ForgeManager::new(Box::new(mock_forge), ForgeOptions::default());
    let note = compose(&manager, &ReleaseNotesConfig::default()).await.unwrap();

    assert_eq!(
        note,
        "ABC-2 - Add search - `feature`\nABC-1 - Fix login - `bug` `frontend`\n"
    );
}

#[tokio::test]
async fn compose_requires_two_boundaries() {
    let mut mock_forge = MockForge::new();

    mock_forge
        .expect_list_merged_merge_requests()
        .times(1)
        .returning(|_| Ok(vec![boundary(40, 12)]));

    let manager = ForgeManager::new(Box::new(mock_forge), ForgeOptions::default());
    let result = compose(&manager, &ReleaseNotesConfig::default()).await;

    assert!(matches!(
        result,
        Err(ReleaseBuilderError::MissingReleaseBoundary { found: 1, .. })
    ));
}

#[tokio::test]
async fn compose_requires_boundary_merge_timestamps() {
    let mut mock_forge = MockForge::new();

    mock_forge
        .expect_list_merged_merge_requests()
        .times(1)
        .returning(|_| {
            Ok(vec![
                boundary(40, 12),
                merge_request(30, "Version Update", &["Version Update"]),
            ])
        });

    let manager = ForgeManager::new(Box::new(mock_forge), ForgeOptions::default());
    let result = compose(&manager, &ReleaseNotesConfig::default()).await;

    assert!(matches!(result, Err(ReleaseBuilderError::ForgeError(_))));
}

#[tokio::test]
async fn compose_propagates_listing_errors() {
    let mut mock_forge = MockForge::new();

    mock_forge
        .expect_list_merged_merge_requests()
        .times(1)
        .returning(|_| Err(ReleaseBuilderError::forge("401 unauthorized")));

    let manager = ForgeManager::new(Box::new(mock_forge), ForgeOptions::default());
    let result = compose(&manager, &ReleaseNotesConfig::default()).await;

    assert!(matches!(result, Err(ReleaseBuilderError::ForgeError(_))));
}
