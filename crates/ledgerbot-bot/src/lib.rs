//! The expense-receipt workflow.
//!
//! [`ExpenseController`] drives the per-conversation state machine: a
//! valid expense line is appended to the ledger and leaves the
//! conversation awaiting a receipt; a photo consumes the pending session
//! and patches the receipt link into exactly the row the append produced.
//! [`ReceiptCorrelator`] owns the image-side half: atomic session take,
//! upload, patch.

/// Receipt-to-row correlation: take, upload, patch.
pub mod correlator;
/// Inbound event handling and replies.
pub mod controller;

pub use controller::ExpenseController;
pub use correlator::{LinkedReceipt, ReceiptCorrelator};
