use crate::blob::{ArtifactRef, BlobStore};
use async_trait::async_trait;
use ledgerbot_core::{LedgerbotError, LedgerbotResult};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Drive implementation of [`BlobStore`].
///
/// Uploads with `uploadType=multipart`: one JSON part carrying the file
/// metadata (name and parent folder), one part carrying the image bytes.
pub struct DriveStore {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    folder_id: String,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

impl DriveStore {
    /// Create a client uploading into one Drive folder.
    pub fn new(access_token: impl Into<String>, folder_id: impl Into<String>) -> LedgerbotResult<Self> {
        Self::with_base_url(DEFAULT_UPLOAD_URL, access_token, folder_id)
    }

    /// Like [`DriveStore::new`] with an explicit API base URL. Used by
    /// tests to point at a local mock server.
    pub fn with_base_url(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        folder_id: impl Into<String>,
    ) -> LedgerbotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LedgerbotError::BlobUnavailable(format!("client build error: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
            folder_id: folder_id.into(),
        })
    }
}

#[async_trait]
impl BlobStore for DriveStore {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> LedgerbotResult<ArtifactRef> {
        let url = format!("{}/upload/drive/v3/files", self.base_url);

        let metadata = serde_json::json!({
            "name": filename,
            "parents": [self.folder_id],
        });
        let metadata_part = reqwest::multipart::Part::text(metadata.to_string())
            .mime_str("application/json; charset=UTF-8")
            .map_err(|e| LedgerbotError::BlobUnavailable(format!("metadata part error: {e}")))?;
        let media_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| LedgerbotError::BlobUnavailable(format!("media part error: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata_part)
            .part("media", media_part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .multipart(form)
            .send()
            .await
            .map_err(|e| LedgerbotError::BlobUnavailable(format!("upload error: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerbotError::BlobUnavailable(format!(
                "upload rejected: HTTP {}",
                response.status()
            )));
        }

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| LedgerbotError::BlobUnavailable(format!("upload parse error: {e}")))?;

        let link = format!("https://drive.google.com/uc?id={}", file.id);
        tracing::debug!(file_id = %file.id, filename, "Receipt uploaded");
        Ok(ArtifactRef { id: file.id, link })
    }
}
