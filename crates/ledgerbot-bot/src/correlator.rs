use ledgerbot_core::{LedgerbotError, LedgerbotResult, RECEIPT_COLUMN};
use ledgerbot_drive::BlobStore;
use ledgerbot_session::PendingStore;
use ledgerbot_sheets::{hyperlink_formula, Ledger};
use std::sync::Arc;

/// Outcome of a successful receipt link.
#[derive(Debug, Clone)]
pub struct LinkedReceipt {
    /// Ledger row that received the link.
    pub row_index: u32,
    /// The artifact link embedded in the cell.
    pub link: String,
}

/// Correlates an incoming receipt image with the conversation's pending
/// expense and patches the link into the ledger.
pub struct ReceiptCorrelator {
    sessions: Arc<PendingStore>,
    ledger: Arc<dyn Ledger>,
    blobs: Arc<dyn BlobStore>,
}

impl ReceiptCorrelator {
    /// Wire the correlator to its collaborators.
    pub fn new(sessions: Arc<PendingStore>, ledger: Arc<dyn Ledger>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            sessions,
            ledger,
            blobs,
        }
    }

    /// Link a receipt image to the conversation's pending expense.
    ///
    /// Atomically takes the pending session, uploads the image under a
    /// filename derived from the record, and patches the session's row
    /// (receipt column) with a hyperlink formula. The session is consumed
    /// up front: if the upload or the patch fails afterwards, the user
    /// must resend both the expense and the image. At most one link is
    /// ever written per append.
    ///
    /// Fails with [`LedgerbotError::NoPendingExpense`] when the
    /// conversation has no live session (never submitted, already linked,
    /// or expired).
    pub async fn link_receipt(
        &self,
        conversation_id: &str,
        image: Vec<u8>,
    ) -> LedgerbotResult<LinkedReceipt> {
        let session = self
            .sessions
            .take(conversation_id)
            .ok_or(LedgerbotError::NoPendingExpense)?;

        let filename = session.record.receipt_filename();
        let artifact = self.blobs.upload(image, &filename).await?;

        let formula = hyperlink_formula(&artifact.link);
        self.ledger
            .patch_cell(session.row_index, RECEIPT_COLUMN, &formula)
            .await?;

        tracing::info!(
            conversation = %conversation_id,
            row = session.row_index,
            link = %artifact.link,
            "Receipt linked"
        );

        Ok(LinkedReceipt {
            row_index: session.row_index,
            link: artifact.link,
        })
    }
}
