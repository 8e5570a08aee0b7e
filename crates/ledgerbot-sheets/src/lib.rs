//! Ledger access for ledgerbot.
//!
//! The [`Ledger`] trait is the seam between the expense workflow and the
//! external spreadsheet; [`SheetsLedger`] implements it against the
//! Google Sheets v4 values API.
//!
//! # Main types
//!
//! - [`Ledger`] — Append a row, patch a single cell.
//! - [`SheetsLedger`] — HTTP implementation backed by Google Sheets.

/// The ledger trait and display-formula helpers.
pub mod ledger;
/// Google Sheets HTTP client.
pub mod sheets;

pub use ledger::{hyperlink_formula, Ledger};
pub use sheets::SheetsLedger;
