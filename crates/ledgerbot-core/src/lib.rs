//! Core types and error definitions for ledgerbot.
//!
//! This crate provides the foundational types shared across all ledgerbot
//! crates: the unified error enum, the typed expense record, and the
//! validation that turns a raw chat line into one.
//!
//! # Main types
//!
//! - [`LedgerbotError`] — Unified error enum for all ledgerbot subsystems.
//! - [`LedgerbotResult`] — Convenience alias for `Result<T, LedgerbotError>`.
//! - [`ExpenseRecord`] — A validated seven-field expense entry.
//! - [`ValidationError`] — Why a raw line failed to parse as a record.

/// Expense record parsing and validation.
pub mod record;

use thiserror::Error;

pub use record::{ExpenseRecord, ValidationError, FIELD_COUNT, RECEIPT_COLUMN};

/// Top-level error type for ledgerbot.
///
/// Each variant corresponds to a subsystem or collaborator that can fail.
/// Every variant is per-event recoverable; nothing here is fatal to the
/// process. Malformed user input is not represented here: it stays a
/// [`ValidationError`], handled where the line is parsed.
#[derive(Debug, Error)]
pub enum LedgerbotError {
    /// A receipt arrived for a conversation with no pending expense.
    #[error("no pending expense for this conversation")]
    NoPendingExpense,

    /// The ledger store could not be reached or rejected the write.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The blob store could not be reached or rejected the upload.
    #[error("blob store unavailable: {0}")]
    BlobUnavailable(String),

    /// An error from the messaging channel (e.g. Telegram API).
    #[error("channel error: {0}")]
    Channel(String),

    /// An error in configuration parsing or credential resolution.
    #[error("config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`LedgerbotError`].
pub type LedgerbotResult<T> = Result<T, LedgerbotError>;
