use ledgerbot_core::LedgerbotError;
use ledgerbot_sheets::{Ledger, SheetsLedger};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fields() -> [String; 7] {
    [
        "2025-04-04".into(),
        "Berlin".into(),
        "15.50".into(),
        "Food".into(),
        "R123".into(),
        "work".into(),
        "upload_later".into(),
    ]
}

async fn ledger_for(server: &MockServer) -> SheetsLedger {
    SheetsLedger::with_base_url(server.uri(), "test-token", "sheet-id", "Expenses").unwrap()
}

#[tokio::test]
async fn test_append_returns_row_from_updated_range() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-id/values/Expenses:append"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(body_partial_json(serde_json::json!({
            "values": [["2025-04-04", "Berlin", "15.50", "Food", "R123", "work", "upload_later"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "updates": { "updatedRange": "Expenses!A42:G42", "updatedRows": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ledger = ledger_for(&server).await;
    let row = ledger.append_row(fields()).await.unwrap();
    assert_eq!(row, 42);
}

#[tokio::test]
async fn test_append_server_error_is_ledger_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let ledger = ledger_for(&server).await;
    let err = ledger.append_row(fields()).await.unwrap_err();
    assert!(matches!(err, LedgerbotError::LedgerUnavailable(_)));
}

#[tokio::test]
async fn test_append_with_unparseable_range_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "updates": { "updatedRange": "???" }
        })))
        .mount(&server)
        .await;

    let ledger = ledger_for(&server).await;
    assert!(ledger.append_row(fields()).await.is_err());
}

#[tokio::test]
async fn test_patch_cell_targets_exact_cell() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v4/spreadsheets/sheet-id/values/Expenses!G42"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(body_partial_json(serde_json::json!({
            "values": [["=HYPERLINK(\"https://example.com/r\", \"receipt\")"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let ledger = ledger_for(&server).await;
    ledger
        .patch_cell(42, 7, "=HYPERLINK(\"https://example.com/r\", \"receipt\")")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_patch_cell_rejection_is_ledger_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let ledger = ledger_for(&server).await;
    let err = ledger.patch_cell(1, 7, "x").await.unwrap_err();
    assert!(matches!(err, LedgerbotError::LedgerUnavailable(_)));
}
