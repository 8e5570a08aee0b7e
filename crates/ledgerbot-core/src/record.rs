use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fields in an expense line.
pub const FIELD_COUNT: usize = 7;

/// 1-based ledger column holding the receipt link (the `receipt_state`
/// field's column).
pub const RECEIPT_COLUMN: u32 = 7;

/// Field delimiter in the raw chat line.
const DELIMITER: char = ',';

/// Why a raw expense line failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The line did not split into exactly [`FIELD_COUNT`] fields.
    #[error("expected exactly {FIELD_COUNT} comma-separated fields, got {got}")]
    FieldCount {
        /// How many fields the line actually contained.
        got: usize,
    },

    /// The amount field did not parse as a non-negative decimal number.
    #[error("amount '{0}' is not a non-negative number")]
    AmountFormat(String),

    /// The date field was not a real calendar date in `YYYY-MM-DD` form.
    #[error("date '{0}' is not a calendar date (YYYY-MM-DD)")]
    DateFormat(String),
}

/// A validated expense entry with exactly seven ordered fields, matching
/// the ledger's column layout.
///
/// Construct one with [`ExpenseRecord::parse`]; the fields are trimmed and
/// cannot contain the delimiter, so [`ExpenseRecord::to_row`] always yields
/// a well-formed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    pub date: String,
    /// Where the expense happened.
    pub location: String,
    /// Decimal amount, kept as the string the user typed.
    pub amount: String,
    /// Free-text category (e.g. `Food`).
    pub category: String,
    /// Free-text reference, may be empty.
    pub reference: String,
    /// Free-text type tag (e.g. `work`).
    pub kind: String,
    /// Receipt placeholder (e.g. `upload_later`); replaced by the link
    /// formula once the receipt is patched in.
    pub receipt_state: String,
}

impl ExpenseRecord {
    /// Parses and validates a raw chat line into a record.
    ///
    /// Splits the trimmed input on `,`, trims every field, and requires
    /// exactly seven fields, a non-negative decimal amount, and a real
    /// `YYYY-MM-DD` date. Pure function, no side effects.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let fields: Vec<&str> = raw.trim().split(DELIMITER).map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ValidationError::FieldCount { got: fields.len() });
        }

        let amount = fields[2];
        match amount.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => {}
            _ => return Err(ValidationError::AmountFormat(amount.to_string())),
        }

        let date = fields[0];
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(ValidationError::DateFormat(date.to_string()));
        }

        Ok(Self {
            date: date.to_string(),
            location: fields[1].to_string(),
            amount: amount.to_string(),
            category: fields[3].to_string(),
            reference: fields[4].to_string(),
            kind: fields[5].to_string(),
            receipt_state: fields[6].to_string(),
        })
    }

    /// The record as an ordered ledger row.
    pub fn to_row(&self) -> [String; FIELD_COUNT] {
        [
            self.date.clone(),
            self.location.clone(),
            self.amount.clone(),
            self.category.clone(),
            self.reference.clone(),
            self.kind.clone(),
            self.receipt_state.clone(),
        ]
    }

    /// Filename for the uploaded receipt image, derived from the record:
    /// `<date>-<amount>.jpg` with dots in the amount replaced so the name
    /// has a single extension.
    pub fn receipt_filename(&self) -> String {
        format!("{}-{}.jpg", self.date, self.amount.replace('.', "_"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const VALID: &str = "2025-04-04, Berlin, 15.50, Food, R123, work, upload_later";

    #[test]
    fn test_parse_valid_line() {
        let record = ExpenseRecord::parse(VALID).unwrap();
        assert_eq!(record.date, "2025-04-04");
        assert_eq!(record.location, "Berlin");
        assert_eq!(record.amount, "15.50");
        assert_eq!(record.category, "Food");
        assert_eq!(record.reference, "R123");
        assert_eq!(record.kind, "work");
        assert_eq!(record.receipt_state, "upload_later");
    }

    #[test]
    fn test_parse_trims_outer_whitespace() {
        let record = ExpenseRecord::parse(&format!("  {VALID}  \n")).unwrap();
        assert_eq!(record.location, "Berlin");
    }

    #[test]
    fn test_too_few_fields() {
        let err = ExpenseRecord::parse("2025-04-04, Berlin, 15.50").unwrap_err();
        assert_eq!(err, ValidationError::FieldCount { got: 3 });
    }

    #[test]
    fn test_too_many_fields() {
        let err = ExpenseRecord::parse(&format!("{VALID}, extra")).unwrap_err();
        assert_eq!(err, ValidationError::FieldCount { got: 8 });
    }

    #[test]
    fn test_empty_reference_is_allowed() {
        let record =
            ExpenseRecord::parse("2025-04-04, Berlin, 15.50, Food, , work, upload_later").unwrap();
        assert_eq!(record.reference, "");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err =
            ExpenseRecord::parse("2025-04-04, Berlin, -3.00, Food, R1, work, upload_later")
                .unwrap_err();
        assert_eq!(err, ValidationError::AmountFormat("-3.00".to_string()));
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        let err = ExpenseRecord::parse("2025-04-04, Berlin, cheap, Food, R1, work, upload_later")
            .unwrap_err();
        assert!(matches!(err, ValidationError::AmountFormat(_)));
    }

    #[test]
    fn test_bad_date_rejected() {
        let err = ExpenseRecord::parse("04/04/2025, Berlin, 15.50, Food, R1, work, upload_later")
            .unwrap_err();
        assert!(matches!(err, ValidationError::DateFormat(_)));
    }

    #[test]
    fn test_impossible_date_rejected() {
        let err = ExpenseRecord::parse("2025-02-30, Berlin, 15.50, Food, R1, work, upload_later")
            .unwrap_err();
        assert_eq!(err, ValidationError::DateFormat("2025-02-30".to_string()));
    }

    #[test]
    fn test_to_row_preserves_order() {
        let record = ExpenseRecord::parse(VALID).unwrap();
        let row = record.to_row();
        assert_eq!(row[0], "2025-04-04");
        assert_eq!(row[6], "upload_later");
    }

    #[test]
    fn test_receipt_filename() {
        let record = ExpenseRecord::parse(VALID).unwrap();
        assert_eq!(record.receipt_filename(), "2025-04-04-15_50.jpg");
    }
}
