#[cfg(test)]
mod integration_tests {
    use crate::schemas::{ApiResponse, ErrorResponse, HealthResponse};
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::str::FromStr;

    /// Decimals cross the wire as strings.
    fn dec(value: &Value) -> Decimal {
        Decimal::from_str(value.as_str().unwrap()).unwrap()
    }

    async fn test_server() -> TestServer {
        let app = setup_test_app().await;
        TestServer::new(app).unwrap()
    }

    async fn create_company(server: &TestServer, name: &str) -> i64 {
        let response = server
            .post("/api/v1/companies")
            .json(&json!({ "name": name }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    async fn create_account(server: &TestServer, company_id: i64, name: &str) -> i64 {
        let response = server
            .post("/api/v1/accounts")
            .json(&json!({
                "company_id": company_id,
                "name": name,
                "account_type": "checking",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    /// Creates a BPO-side unique payable and returns its id.
    async fn create_payable(server: &TestServer, company_id: i64, value: &str, due: &str) -> i64 {
        let response = server
            .post("/api/v1/transactions")
            .json(&json!({
                "company_id": company_id,
                "transaction_type": "payable",
                "description": "Office rent",
                "value": value,
                "due_date": due,
                "occurrence": "unique",
                "created_by_side": "bpo_side",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = test_server().await;
        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "connected");
    }

    #[tokio::test]
    async fn test_create_company() {
        let server = test_server().await;
        let response = server
            .post("/api/v1/companies")
            .json(&json!({ "name": "Acme Services" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["name"], "Acme Services");
        assert!(body.data["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_bpo_transaction_is_implicitly_validated() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;
        let transaction_id = create_payable(&server, company_id, "1200.00", "2025-02-01").await;

        let response = server
            .get(&format!(
                "/api/v1/transactions/{}?company_id={}&type=payable",
                transaction_id, company_id
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["validated"], true);
        assert_eq!(body.data["status"], "pending");
        assert_eq!(body.data["created_by_side"], "bpo_side");
    }

    #[tokio::test]
    async fn test_settlement_posts_cash_movement_and_updates_balance() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;
        let account_id = create_account(&server, company_id, "Main checking").await;
        let transaction_id = create_payable(&server, company_id, "300.00", "2025-02-01").await;

        let response = server
            .post(&format!(
                "/api/v1/transactions/{}/settle?company_id={}&type=payable",
                transaction_id, company_id
            ))
            .json(&json!({
                "financial_account_id": account_id,
                "date": "2025-02-03",
                "notes": "paid by wire",
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert!(body.warnings.is_empty());
        assert_eq!(body.data["status"], "paid");
        assert_eq!(dec(&body.data["paid_amount"]), Decimal::new(30000, 2));
        assert_eq!(body.data["payment_date"], "2025-02-03");

        // A payable settlement posts a debit referencing the transaction.
        let response = server
            .get(&format!("/api/v1/cash-movements?company_id={}", company_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["movement_type"], "debit");
        assert_eq!(body.data[0]["reference_type"], "account_payment");
        assert_eq!(body.data[0]["reference_id"].as_i64().unwrap(), transaction_id);

        let response = server
            .get(&format!(
                "/api/v1/accounts/{}/balance?company_id={}",
                account_id, company_id
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(dec(&body.data["balance"]), Decimal::new(-30000, 2));
    }

    #[tokio::test]
    async fn test_double_settlement_is_rejected() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;
        let account_id = create_account(&server, company_id, "Main checking").await;
        let transaction_id = create_payable(&server, company_id, "300.00", "2025-02-01").await;

        let settle_body = json!({
            "financial_account_id": account_id,
            "date": "2025-02-03",
        });
        let url = format!(
            "/api/v1/transactions/{}/settle?company_id={}&type=payable",
            transaction_id, company_id
        );

        server.post(&url).json(&settle_body).await.assert_status(StatusCode::OK);

        let response = server.post(&url).json(&settle_body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert!(!body.success);
        assert_eq!(body.code, "invariant_violation");

        // Still exactly one ledger posting.
        let response = server
            .get(&format!("/api/v1/cash-movements?company_id={}", company_id))
            .await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn test_reversal_restores_the_pending_state() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;
        let account_id = create_account(&server, company_id, "Main checking").await;
        let transaction_id = create_payable(&server, company_id, "300.00", "2025-02-01").await;

        server
            .post(&format!(
                "/api/v1/transactions/{}/settle?company_id={}&type=payable",
                transaction_id, company_id
            ))
            .json(&json!({
                "financial_account_id": account_id,
                "date": "2025-02-03",
            }))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .post(&format!(
                "/api/v1/transactions/{}/reverse?company_id={}&type=payable",
                transaction_id, company_id
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["status"], "pending");
        assert!(body.data["payment_date"].is_null());
        assert!(body.data["paid_amount"].is_null());

        let response = server
            .get(&format!("/api/v1/cash-movements?company_id={}", company_id))
            .await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert!(body.data.is_empty());
    }

    #[tokio::test]
    async fn test_client_submission_flows_through_validation() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;

        // Client-side recurring receivable: 3 monthly installments.
        let response = server
            .post("/api/v1/transactions")
            .json(&json!({
                "company_id": company_id,
                "transaction_type": "receivable",
                "description": "Consulting retainer",
                "value": "500.00",
                "due_date": "2025-03-10",
                "occurrence": "installments",
                "installment_count": 3,
                "installment_day": 10,
                "created_by_side": "client_side",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        let transaction_id = body.data["id"].as_i64().unwrap();
        assert_eq!(body.data["validated"], false);
        // No fan-out before validation.
        assert!(body.data["series_id"].is_null());

        // It appears in the pending-review queue, not the trusted view.
        let response = server
            .get(&format!(
                "/api/v1/transactions?company_id={}&type=receivable&view=pending-review",
                company_id
            ))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["total"].as_u64().unwrap(), 1);

        let response = server
            .get(&format!(
                "/api/v1/transactions?company_id={}&type=receivable",
                company_id
            ))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["total"].as_u64().unwrap(), 0);

        // Validate: stamps the operator and expands the series.
        let response = server
            .post(&format!(
                "/api/v1/transactions/{}/validate?company_id={}",
                transaction_id, company_id
            ))
            .json(&json!({ "validated_by": "operator-7" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert!(body.warnings.is_empty());
        assert_eq!(body.data["transaction"]["validated"], true);
        assert_eq!(body.data["transaction"]["validated_by"], "operator-7");
        let generated = body.data["generated"].as_array().unwrap();
        assert_eq!(generated.len(), 2);
        assert_eq!(generated[0]["due_date"], "2025-04-10");
        assert_eq!(generated[1]["due_date"], "2025-05-10");

        // The whole series is now in the trusted view.
        let response = server
            .get(&format!(
                "/api/v1/transactions?company_id={}&type=receivable",
                company_id
            ))
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["total"].as_u64().unwrap(), 3);

        // A second validate cannot double-expand.
        let response = server
            .post(&format!(
                "/api/v1/transactions/{}/validate?company_id={}",
                transaction_id, company_id
            ))
            .json(&json!({ "validated_by": "operator-7" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejection_requires_a_reason() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;

        let response = server
            .post("/api/v1/transactions")
            .json(&json!({
                "company_id": company_id,
                "transaction_type": "payable",
                "description": "Dubious invoice",
                "value": "50.00",
                "due_date": "2025-03-01",
                "occurrence": "unique",
                "created_by_side": "client_side",
            }))
            .await;
        let body: ApiResponse<Value> = response.json();
        let transaction_id = body.data["id"].as_i64().unwrap();

        let url = format!(
            "/api/v1/transactions/{}/reject?company_id={}",
            transaction_id, company_id
        );

        let response = server
            .post(&url)
            .json(&json!({ "rejected_by": "operator-7", "reason": "  " }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "validation_error");

        let response = server
            .post(&url)
            .json(&json!({ "rejected_by": "operator-7", "reason": "duplicate invoice" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["rejected"], true);
        assert_eq!(body.data["rejection_reason"], "duplicate invoice");

        // Rejection is terminal.
        let response = server
            .post(&format!(
                "/api/v1/transactions/{}/validate?company_id={}",
                transaction_id, company_id
            ))
            .json(&json!({ "validated_by": "operator-7" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_client_cannot_edit_a_validated_row() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;
        let transaction_id = create_payable(&server, company_id, "100.00", "2025-03-01").await;

        // BPO-side rows are validated at creation; a client-origin edit is
        // refused while a back-office edit passes.
        let url = format!(
            "/api/v1/transactions/{}?company_id={}&type=payable",
            transaction_id, company_id
        );

        let response = server
            .put(&format!("{}&origin=client_side", url))
            .json(&json!({ "notes": "client note" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "invariant_violation");

        let response = server
            .put(&url)
            .json(&json!({ "notes": "back office note" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["notes"], "back office note");
    }

    #[tokio::test]
    async fn test_series_update_and_scoped_delete() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;

        // BPO-side installment payable expands at creation.
        let response = server
            .post("/api/v1/transactions")
            .json(&json!({
                "company_id": company_id,
                "transaction_type": "payable",
                "description": "Equipment lease",
                "value": "250.00",
                "due_date": "2025-01-15",
                "occurrence": "installments",
                "installment_count": 4,
                "installment_day": 15,
                "created_by_side": "bpo_side",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        let series_id = body.data["series_id"].as_i64().unwrap();
        assert_eq!(series_id, body.data["id"].as_i64().unwrap());

        // Bulk update every occurrence.
        let response = server
            .put(&format!(
                "/api/v1/series/{}?company_id={}&type=payable&scope=all",
                series_id, company_id
            ))
            .json(&json!({ "payment_method": "wire", "value": "275.00" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 4);
        assert!(body.data.iter().all(|t| dec(&t["value"]) == Decimal::new(27500, 2)));

        // Scope current is not a series operation.
        let response = server
            .delete(&format!(
                "/api/v1/series/{}?company_id={}&type=payable&scope=current",
                series_id, company_id
            ))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Delete everything still unpaid.
        let response = server
            .delete(&format!(
                "/api/v1/series/{}?company_id={}&type=payable&scope=unpaid",
                series_id, company_id
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["count"].as_u64().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_summary_buckets_trusted_rows() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;

        // One long overdue, one far in the future.
        create_payable(&server, company_id, "100.00", "2020-01-01").await;
        create_payable(&server, company_id, "40.00", "2099-01-01").await;

        let response = server
            .get(&format!(
                "/api/v1/transactions/summary?company_id={}&type=payable",
                company_id
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["overdue"]["count"].as_u64().unwrap(), 1);
        assert_eq!(dec(&body.data["overdue"]["total"]), Decimal::new(10000, 2));
        assert_eq!(body.data["upcoming"]["count"].as_u64().unwrap(), 1);
        assert_eq!(body.data["paid"]["count"].as_u64().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_balance_adjustment_round_trip() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;
        let account_id = create_account(&server, company_id, "Cash").await;

        let response = server
            .post(&format!("/api/v1/accounts/{}/balance-adjustment", account_id))
            .json(&json!({
                "company_id": company_id,
                "target_balance": "1500.00",
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(dec(&body.data["balance"]), Decimal::new(150000, 2));

        // Re-targeting the same balance posts nothing.
        let response = server
            .post(&format!("/api/v1/accounts/{}/balance-adjustment", account_id))
            .json(&json!({
                "company_id": company_id,
                "target_balance": "1500.00",
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/cash-movements?company_id={}", company_id))
            .await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["reference_type"], "manual_adjustment");
        assert_eq!(body.data[0]["movement_type"], "credit");
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_404() {
        let server = test_server().await;
        let company_id = create_company(&server, "Acme").await;

        let response = server
            .get(&format!(
                "/api/v1/transactions/999?company_id={}&type=payable",
                company_id
            ))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "not_found");
    }
}
