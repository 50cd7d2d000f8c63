use std::sync::atomic::Ordering;

use drive::error::ApiError;
use drive::FileSelection;

use crate::integration::support::{drive_with, FakeService};

#[tokio::test]
async fn upload_appends_unretrieved_owned_item() {
    let service = FakeService::new();
    let drive = drive_with(&service);

    let item = drive
        .upload(FileSelection::new("notes.txt", "text/plain", b"hello".to_vec()))
        .await
        .unwrap();

    assert_eq!(item.transaction_id.as_str(), "tx0001");
    assert_eq!(item.broad_type, "text");
    assert_eq!(item.sub_type, "plain");
    assert_eq!(item.owner, "Ada");
    assert!(!item.is_retrieved);
    assert!(item.content.is_none());
    assert_eq!(
        item.owner_private_key.as_deref(),
        Some(drive.keys().private_key.as_str())
    );
    assert_eq!(item.owner_public_key, drive.keys().public_key);
    assert_eq!(drive.items(), vec![item]);
}

#[tokio::test]
async fn failed_upload_commits_nothing() {
    let service = FakeService::new();
    service.fail_uploads.store(true, Ordering::SeqCst);
    let drive = drive_with(&service);

    let result = drive
        .upload(FileSelection::new("notes.txt", "", b"hello".to_vec()))
        .await;

    match result {
        Err(ApiError::ServiceRejected { status, payload }) => {
            assert_eq!(status, 500);
            assert_eq!(payload, "storage offline");
        }
        other => panic!("expected service rejection, got {:?}", other),
    }
    assert!(drive.is_empty());
    assert_eq!(service.uploads(), 1);
}

#[tokio::test]
async fn concurrent_uploads_each_commit() {
    let service = FakeService::new();
    let drive = drive_with(&service);

    let results = drive
        .upload_all(vec![
            FileSelection::new("a.txt", "", b"a".to_vec()),
            FileSelection::new("b.pdf", "", b"b".to_vec()),
            FileSelection::new("c.png", "", b"c".to_vec()),
        ])
        .await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(drive.len(), 3);
    let mut ids: Vec<String> = drive
        .items()
        .iter()
        .map(|item| item.transaction_id.to_string())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn upload_uses_current_owner_name() {
    let service = FakeService::new();
    let drive = drive_with(&service);
    drive.set_owner_name("Grace");

    let item = drive
        .upload(FileSelection::new("a.txt", "", b"a".to_vec()))
        .await
        .unwrap();
    assert_eq!(item.owner, "Grace");
}
