//! Pending expense sessions.
//!
//! Between "expense recorded" and "receipt received" each conversation
//! holds at most one [`PendingSession`] in a [`PendingStore`]. The store
//! gives per-key atomic take/put semantics and an idle TTL so a stale row
//! index is never patched.

pub mod store;

pub use store::{PendingSession, PendingStore, DEFAULT_TTL};
