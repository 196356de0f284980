//! The staged, scanned upload pipeline.

mod common;

use common::{eicar_body, TestHarness};

use drivebox_core::config::{ScanConfig, StorageConfig, TreeConfig};
use drivebox_core::error::ErrorKind;
use drivebox_entity::NodeAction;
use drivebox_service::{Actor, UploadRequest};
use uuid::Uuid;

fn request(folder_id: Option<Uuid>, name: &str, data: &'static [u8]) -> UploadRequest {
    UploadRequest {
        folder_id,
        file_name: name.into(),
        data: bytes::Bytes::from_static(data),
    }
}

#[tokio::test]
async fn test_upload_commits_file_with_measured_size() {
    let h = TestHarness::new().await;
    let (actor, root) = h.member_with_root("alice").await;

    let file = h
        .uploads
        .upload(&actor, request(Some(root.id), "report.pdf", b"pdf bytes"))
        .await
        .unwrap();

    assert_eq!(file.name, "report.pdf");
    assert_eq!(file.extension.as_deref(), Some("pdf"));
    assert_eq!(file.size_bytes, Some(9));
    assert!(h.blob_exists(file.id).await);
    assert_eq!(h.staged_count(), 0);

    let physical = h.tree.paths().physical_path_of(file.id).await.unwrap();
    assert!(physical.ends_with(".pdf"));
}

#[tokio::test]
async fn test_upload_defaults_to_root_folder() {
    let h = TestHarness::new().await;
    let (actor, root) = h.member_with_root("alice").await;

    let file = h
        .uploads
        .upload(&actor, request(None, "inbox.txt", b"hi"))
        .await
        .unwrap();
    assert_eq!(file.parent_id, Some(root.id));
}

#[tokio::test]
async fn test_malicious_upload_rejected_and_staging_cleaned() {
    let h = TestHarness::new().await;
    let (actor, root) = h.member_with_root("alice").await;

    let err = h
        .uploads
        .upload(
            &actor,
            UploadRequest {
                folder_id: Some(root.id),
                file_name: "totally-safe.exe".into(),
                data: eicar_body(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(h.staged_count(), 0);

    let listing = h.tree.listing(&actor, None).await.unwrap();
    assert!(listing.files.is_empty());
}

#[tokio::test]
async fn test_scan_disabled_skips_the_scanner() {
    let scan = ScanConfig {
        enabled: false,
        ..ScanConfig::default()
    };
    let h = TestHarness::with_config(TreeConfig::default(), StorageConfig::default(), scan).await;
    let (actor, root) = h.member_with_root("alice").await;

    let file = h
        .uploads
        .upload(
            &actor,
            UploadRequest {
                folder_id: Some(root.id),
                file_name: "eicar.txt".into(),
                data: eicar_body(),
            },
        )
        .await
        .unwrap();
    assert!(h.blob_exists(file.id).await);
}

#[tokio::test]
async fn test_duplicate_file_name_is_conflict() {
    let h = TestHarness::new().await;
    let (actor, root) = h.member_with_root("alice").await;

    h.uploads
        .upload(&actor, request(Some(root.id), "a.txt", b"1"))
        .await
        .unwrap();
    let err = h
        .uploads
        .upload(&actor, request(Some(root.id), "a.txt", b"2"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_oversize_upload_rejected() {
    let storage = StorageConfig {
        max_upload_size_bytes: 4,
        ..StorageConfig::default()
    };
    let h = TestHarness::with_config(TreeConfig::default(), storage, ScanConfig::default()).await;
    let (actor, root) = h.member_with_root("alice").await;

    let err = h
        .uploads
        .upload(&actor, request(Some(root.id), "big.bin", b"12345"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_quota_exceeded_rejected() {
    let storage = StorageConfig {
        quota_bytes: 10,
        ..StorageConfig::default()
    };
    let h = TestHarness::with_config(TreeConfig::default(), storage, ScanConfig::default()).await;
    let (actor, root) = h.member_with_root("alice").await;

    h.uploads
        .upload(&actor, request(Some(root.id), "first.bin", b"123456"))
        .await
        .unwrap();
    let err = h
        .uploads
        .upload(&actor, request(Some(root.id), "second.bin", b"123456"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(h.staged_count(), 0);
}

#[tokio::test]
async fn test_guest_needs_write_grant_to_upload() {
    let h = TestHarness::new().await;
    let (alice, root) = h.member_with_root("alice").await;
    let shared = h
        .tree
        .create_folder(&alice, Some(root.id), "dropbox")
        .await
        .unwrap();

    let guest = Actor::member(Uuid::new_v4());
    let err = h
        .uploads
        .upload(&guest, request(Some(shared.id), "note.txt", b"hi"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    h.permissions
        .grant(&alice, shared.id, guest.user_id, &[NodeAction::Write])
        .await
        .unwrap();

    let file = h
        .uploads
        .upload(&guest, request(Some(shared.id), "note.txt", b"hi"))
        .await
        .unwrap();
    // Uploaded into alice's tree, so alice owns the node.
    assert_eq!(file.owner_id, alice.user_id);
}

#[tokio::test]
async fn test_rename_preserves_original_extension() {
    let h = TestHarness::new().await;
    let (actor, root) = h.member_with_root("alice").await;
    let file = h
        .uploads
        .upload(&actor, request(Some(root.id), "report.pdf", b"pdf"))
        .await
        .unwrap();

    let renamed = h.tree.rename(&actor, file.id, "summary").await.unwrap();
    assert_eq!(renamed.name, "summary.pdf");

    let renamed = h.tree.rename(&actor, file.id, "final.docx").await.unwrap();
    assert_eq!(renamed.name, "final.pdf");
}

#[tokio::test]
async fn test_upload_into_file_rejected() {
    let h = TestHarness::new().await;
    let (actor, root) = h.member_with_root("alice").await;
    let file = h
        .uploads
        .upload(&actor, request(Some(root.id), "a.txt", b"x"))
        .await
        .unwrap();

    let err = h
        .uploads
        .upload(&actor, request(Some(file.id), "b.txt", b"y"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_invalid_file_names_rejected() {
    let h = TestHarness::new().await;
    let (actor, root) = h.member_with_root("alice").await;

    for bad in ["", "   ", "a/b.txt"] {
        let err = h
            .uploads
            .upload(
                &actor,
                UploadRequest {
                    folder_id: Some(root.id),
                    file_name: bad.into(),
                    data: bytes::Bytes::from_static(b"x"),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "name {bad:?}");
    }
}
