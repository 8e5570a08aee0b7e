use crate::ledger::Ledger;
use async_trait::async_trait;
use ledgerbot_core::{LedgerbotError, LedgerbotResult, FIELD_COUNT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Sheets implementation of [`Ledger`].
///
/// Talks to the v4 values API with a pre-resolved OAuth access token.
/// Appends go through `...:append`, which reports the range the new row
/// landed in; the row index comes straight out of that response.
pub struct SheetsLedger {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    spreadsheet_id: String,
    worksheet: String,
}

// ── Sheets API wire types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ValueRange<'a> {
    values: Vec<Vec<&'a str>>,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
}

// ── Implementation ──────────────────────────────────────────────────────────

impl SheetsLedger {
    /// Create a client for one spreadsheet/worksheet pair.
    pub fn new(
        access_token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
    ) -> LedgerbotResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, access_token, spreadsheet_id, worksheet)
    }

    /// Like [`SheetsLedger::new`] with an explicit API base URL. Used by
    /// tests to point at a local mock server.
    pub fn with_base_url(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
    ) -> LedgerbotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LedgerbotError::LedgerUnavailable(format!("client build error: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
        })
    }

    fn values_url(&self, range: &str, op: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.base_url, self.spreadsheet_id, range, op
        )
    }
}

#[async_trait]
impl Ledger for SheetsLedger {
    async fn append_row(&self, fields: [String; FIELD_COUNT]) -> LedgerbotResult<u32> {
        let url = self.values_url(&self.worksheet, ":append");
        let body = ValueRange {
            values: vec![fields.iter().map(String::as_str).collect()],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "USER_ENTERED"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerbotError::LedgerUnavailable(format!("append error: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerbotError::LedgerUnavailable(format!(
                "append rejected: HTTP {}",
                response.status()
            )));
        }

        let body: AppendResponse = response
            .json()
            .await
            .map_err(|e| LedgerbotError::LedgerUnavailable(format!("append parse error: {e}")))?;

        let row = parse_row_index(&body.updates.updated_range).ok_or_else(|| {
            LedgerbotError::LedgerUnavailable(format!(
                "unparseable updatedRange '{}'",
                body.updates.updated_range
            ))
        })?;

        tracing::debug!(row, range = %body.updates.updated_range, "Row appended");
        Ok(row)
    }

    async fn patch_cell(&self, row: u32, column: u32, value: &str) -> LedgerbotResult<()> {
        let range = format!("{}!{}{}", self.worksheet, column_letter(column), row);
        let url = self.values_url(&range, "");
        let body = ValueRange {
            values: vec![vec![value]],
        };

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerbotError::LedgerUnavailable(format!("patch error: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerbotError::LedgerUnavailable(format!(
                "patch rejected: HTTP {}",
                response.status()
            )));
        }

        tracing::debug!(row, column, "Cell patched");
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Extract the 1-based row index from an A1-notation range such as
/// `Expenses!A12:G12` or `Sheet1!A5`.
fn parse_row_index(updated_range: &str) -> Option<u32> {
    let cells = updated_range.rsplit('!').next()?;
    let first_cell = cells.split(':').next()?;
    let digits: String = first_cell.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// A1-notation column letters for a 1-based column index.
fn column_letter(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}
