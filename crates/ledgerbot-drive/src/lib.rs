//! Receipt image storage.
//!
//! The [`BlobStore`] trait is the seam to the external blob store;
//! [`DriveStore`] implements it with Google Drive multipart uploads. The
//! bot never persists image bytes itself.

/// The blob store trait and artifact reference type.
pub mod blob;
/// Google Drive upload client.
pub mod drive;

pub use blob::{ArtifactRef, BlobStore};
pub use drive::DriveStore;
