use crate::correlator::ReceiptCorrelator;
use ledgerbot_channels::{Channel, ChannelEvent, InboundPhoto, InboundText};
use ledgerbot_core::{ExpenseRecord, LedgerbotError, ValidationError};
use ledgerbot_drive::BlobStore;
use ledgerbot_session::PendingStore;
use ledgerbot_sheets::Ledger;
use std::sync::Arc;

/// Canonical command that shows the usage text.
const START_COMMAND: &str = "start";
/// Accepted aliases for [`START_COMMAND`].
const COMMAND_ALIASES: &[&str] = &["help"];

const USAGE_REPLY: &str = "Hi! Send me your expense in this format:\n\
    2025-04-04, Berlin, 15.50, Food, R123, work, upload_later";
const RECORDED_REPLY: &str = "Expense recorded. You can now send the receipt image.";
const LINKED_REPLY: &str = "Receipt uploaded and linked in the sheet.";
const NO_PENDING_REPLY: &str =
    "Please send the expense details first before sending the receipt.";
const GENERIC_FAILURE_REPLY: &str = "Something went wrong. Check the format or try again.";

/// Drives the per-conversation expense workflow.
///
/// Each conversation is in one of two states, held implicitly by the
/// session store: no pending expense, or awaiting a receipt. A valid text
/// line appends a ledger row and stores the session (replacing any prior
/// one); a photo consumes the session through the correlator. Every
/// outcome is answered with a reply; reply delivery failures are logged
/// and never fail the event.
pub struct ExpenseController {
    sessions: Arc<PendingStore>,
    ledger: Arc<dyn Ledger>,
    channel: Arc<dyn Channel>,
    correlator: ReceiptCorrelator,
}

impl ExpenseController {
    /// Wire the controller to its collaborators.
    pub fn new(
        sessions: Arc<PendingStore>,
        ledger: Arc<dyn Ledger>,
        blobs: Arc<dyn BlobStore>,
        channel: Arc<dyn Channel>,
    ) -> Self {
        let correlator = ReceiptCorrelator::new(sessions.clone(), ledger.clone(), blobs);
        Self {
            sessions,
            ledger,
            channel,
            correlator,
        }
    }

    /// Handle one inbound event. Never fails; every error path ends in a
    /// reply and a log line.
    pub async fn handle_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::Text(text) => self.handle_text(text).await,
            ChannelEvent::Photo(photo) => self.handle_photo(photo).await,
        }
    }

    async fn handle_text(&self, msg: InboundText) {
        if let Some(command) = parse_command(&msg.text) {
            if command == START_COMMAND || COMMAND_ALIASES.contains(&command.as_str()) {
                self.reply(&msg.conversation_id, USAGE_REPLY).await;
            } else {
                tracing::debug!(conversation = %msg.conversation_id, command, "Ignoring unknown command");
            }
            return;
        }

        let record = match ExpenseRecord::parse(&msg.text) {
            Ok(record) => record,
            Err(e) => {
                tracing::info!(conversation = %msg.conversation_id, error = %e, "Rejected expense line");
                self.reply(&msg.conversation_id, &validation_reply(&e)).await;
                return;
            }
        };

        let row_index = match self.ledger.append_row(record.to_row()).await {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(conversation = %msg.conversation_id, error = %e, "Ledger append failed");
                self.reply(&msg.conversation_id, GENERIC_FAILURE_REPLY).await;
                return;
            }
        };

        // Replaces any prior unconsumed session for this conversation;
        // the replaced session's row stays un-linked.
        self.sessions.put(&msg.conversation_id, record, row_index);
        tracing::info!(conversation = %msg.conversation_id, row = row_index, "Expense recorded");
        self.reply(&msg.conversation_id, RECORDED_REPLY).await;
    }

    async fn handle_photo(&self, msg: InboundPhoto) {
        match self
            .correlator
            .link_receipt(&msg.conversation_id, msg.bytes)
            .await
        {
            Ok(_) => {
                self.reply(&msg.conversation_id, LINKED_REPLY).await;
            }
            Err(LedgerbotError::NoPendingExpense) => {
                self.reply(&msg.conversation_id, NO_PENDING_REPLY).await;
            }
            Err(e) => {
                tracing::error!(conversation = %msg.conversation_id, error = %e, "Receipt link failed");
                self.reply(&msg.conversation_id, GENERIC_FAILURE_REPLY).await;
            }
        }
    }

    async fn reply(&self, conversation_id: &str, text: &str) {
        if let Err(e) = self.channel.send_text(conversation_id, text).await {
            tracing::warn!(conversation = %conversation_id, error = %e, "Reply delivery failed");
        }
    }
}

/// Extract the command name from a `/command` line, dropping any
/// `@botname` suffix. Returns `None` for ordinary text.
fn parse_command(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix('/')?;
    let name = rest.split_whitespace().next()?;
    let name = name.split('@').next().unwrap_or(name);
    Some(name.to_ascii_lowercase())
}

fn validation_reply(error: &ValidationError) -> String {
    match error {
        ValidationError::FieldCount { .. } => {
            "Invalid format. Please send exactly 7 items separated by commas.".to_string()
        }
        other => format!("Invalid format. {other}."),
    }
}
