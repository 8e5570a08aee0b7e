use ledgerbot_core::LedgerbotError;
use ledgerbot_drive::{BlobStore, DriveStore};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn store_for(server: &MockServer) -> DriveStore {
    DriveStore::with_base_url(server.uri(), "test-token", "folder-1").unwrap()
}

#[tokio::test]
async fn test_upload_returns_id_and_uc_link() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "file-abc" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    let artifact = store
        .upload(vec![0xFF, 0xD8, 0xFF], "2025-04-04-15_50.jpg")
        .await
        .unwrap();

    assert_eq!(artifact.id, "file-abc");
    assert_eq!(artifact.link, "https://drive.google.com/uc?id=file-abc");
}

#[tokio::test]
async fn test_upload_failure_is_blob_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    let err = store.upload(vec![1, 2, 3], "r.jpg").await.unwrap_err();
    assert!(matches!(err, LedgerbotError::BlobUnavailable(_)));
}
