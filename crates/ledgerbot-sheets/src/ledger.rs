use async_trait::async_trait;
use ledgerbot_core::{LedgerbotResult, FIELD_COUNT};

/// The external ledger store.
///
/// Implementations must return the row index from the append's own
/// result: re-counting rows around the write races with concurrent
/// appends from other conversations.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Append the fields as a new row at the end of the ledger and
    /// return the 1-based row index the row now occupies.
    async fn append_row(&self, fields: [String; FIELD_COUNT]) -> LedgerbotResult<u32>;

    /// Overwrite a single cell with a display value. `row` and `column`
    /// are 1-based.
    async fn patch_cell(&self, row: u32, column: u32, value: &str) -> LedgerbotResult<()>;
}

/// Display formula that renders `link` as a clickable cell labeled
/// "receipt".
pub fn hyperlink_formula(link: &str) -> String {
    format!("=HYPERLINK(\"{link}\", \"receipt\")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperlink_formula() {
        assert_eq!(
            hyperlink_formula("https://drive.google.com/uc?id=abc123"),
            "=HYPERLINK(\"https://drive.google.com/uc?id=abc123\", \"receipt\")"
        );
    }
}
