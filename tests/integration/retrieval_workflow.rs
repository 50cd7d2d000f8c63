use std::sync::Arc;

use drive::error::ApiError;
use drive::{FileSelection, RetrievalOutcome};

use crate::integration::support::{drive_with, FakeService, Gate};

#[tokio::test]
async fn unknown_id_appends_one_retrieved_item() {
    let service = FakeService::new();
    service.seed("ext42", "photo.png", "Grace", b"\x89PNG");
    let drive = drive_with(&service);

    let outcome = drive.retrieve("ext42").await.unwrap();

    assert!(!outcome.is_reconciled());
    assert_eq!(outcome.index(), 0);
    assert_eq!(drive.len(), 1);
    let item = outcome.item();
    assert_eq!(item.name, "photo.png");
    assert_eq!(item.broad_type, "image");
    assert_eq!(item.sub_type, "png");
    assert_eq!(item.owner, "Grace");
    assert_eq!(item.owner_public_key, "Grace-key");
    assert_eq!(item.date, "2024-11-18T12:34:56Z");
    assert!(item.is_retrieved);
    assert!(item.owner_private_key.is_none());
    let blob = item.content.as_ref().unwrap();
    assert_eq!(blob.media_type, "image/png");
    assert_eq!(blob.bytes, b"\x89PNG");
    assert_eq!(service.fetches(), 1);
    assert_eq!(service.lookups(), 1);
}

#[tokio::test]
async fn already_retrieved_id_is_rejected_without_network_call() {
    let service = FakeService::new();
    service.seed("ext42", "photo.png", "Grace", b"img");
    let drive = drive_with(&service);
    drive.retrieve("ext42").await.unwrap();

    let again = drive.retrieve("ext42").await;

    assert!(matches!(again, Err(ApiError::AlreadyRetrieved(ref id)) if id == "ext42"));
    assert_eq!(service.fetches(), 1);
    assert_eq!(service.lookups(), 1);
    assert_eq!(drive.len(), 1);
}

#[tokio::test]
async fn uploaded_item_is_reconciled_in_place() {
    let service = FakeService::new();
    let drive = drive_with(&service);
    drive
        .upload(FileSelection::new("first.txt", "", b"one".to_vec()))
        .await
        .unwrap();
    drive
        .upload(FileSelection::new("clip.bin", "video/mp4", b"two".to_vec()))
        .await
        .unwrap();

    let outcome = drive.retrieve("tx0002").await.unwrap();

    match outcome {
        RetrievalOutcome::Reconciled { index, ref item } => {
            assert_eq!(index, 1);
            assert!(item.is_retrieved);
            // The record's own type wins over the ledger's extension.
            assert_eq!(item.content.as_ref().unwrap().media_type, "video/mp4");
            assert_eq!(item.content.as_ref().unwrap().bytes, b"two");
            assert!(item.owner_private_key.is_some());
        }
        other => panic!("expected reconciliation, got {:?}", other),
    }
    assert_eq!(drive.len(), 2);
    assert_eq!(drive.items()[1].name, "clip.bin");
    assert!(!drive.items()[0].is_retrieved);
    assert_eq!(service.lookups(), 0);
}

#[tokio::test]
async fn identifiers_are_sanitized_before_use() {
    let service = FakeService::new();
    service.seed("ext42", "notes.txt", "Grace", b"hi");
    let drive = drive_with(&service);

    let outcome = drive.retrieve("  ext-42\n").await.unwrap();
    assert_eq!(outcome.item().transaction_id.as_str(), "ext42");

    let empty = drive.retrieve(" -_- ").await;
    assert!(matches!(empty, Err(ApiError::InvalidTransactionId(_))));
    assert_eq!(service.fetches(), 1);
}

#[tokio::test]
async fn missing_transaction_is_not_found_and_commits_nothing() {
    let service = FakeService::new();
    let drive = drive_with(&service);

    let result = drive.retrieve("nothere").await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(drive.is_empty());
}

#[tokio::test]
async fn concurrent_retrieval_of_same_id_is_rejected() {
    let gate = Arc::new(Gate::default());
    let service = FakeService::gated(gate.clone());
    service.seed("ext42", "photo.png", "Grace", b"img");
    let drive = drive_with(&service);

    let (first, second) = tokio::join!(drive.retrieve("ext42"), async {
        gate.started.notified().await;
        let second = drive.retrieve("ext42").await;
        gate.release.notify_one();
        second
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(ApiError::RetrievalInProgress(ref id)) if id == "ext42"));
    assert_eq!(drive.len(), 1);
    assert_eq!(service.fetches(), 1);

    // The claim is gone once the first retrieval finished.
    assert!(matches!(
        drive.retrieve("ext42").await,
        Err(ApiError::AlreadyRetrieved(_))
    ));
}

#[tokio::test]
async fn download_writes_retrieved_content_only() {
    let service = FakeService::new();
    service.seed("ext42", "report.pdf", "Grace", b"%PDF-1.7");
    let drive = drive_with(&service);
    drive
        .upload(FileSelection::new("mine.txt", "", b"mine".to_vec()))
        .await
        .unwrap();
    drive.retrieve("ext42").await.unwrap();
    let temp = tempfile::tempdir().unwrap();

    let path = drive.download("ext42", temp.path()).unwrap();
    assert_eq!(path, temp.path().join("report.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");

    assert!(matches!(
        drive.download("tx0001", temp.path()),
        Err(ApiError::NotRetrieved(_))
    ));
    assert!(matches!(
        drive.download("unknown", temp.path()),
        Err(ApiError::NotFound(_))
    ));
}
