use async_trait::async_trait;
use ledgerbot_core::LedgerbotResult;

/// Reference to an uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    /// Store-assigned identifier of the uploaded file.
    pub id: String,
    /// Shareable link that resolves to the file.
    pub link: String,
}

/// The external blob store holding receipt images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload the image bytes under the given filename and return a
    /// reference whose link can be embedded in the ledger.
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> LedgerbotResult<ArtifactRef>;
}
