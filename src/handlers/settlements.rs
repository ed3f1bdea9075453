use crate::handlers::transactions::{TransactionResponse, TransactionScopeQuery};
use crate::schemas::{
    ledger_error_response, warning_strings, ApiError, ApiResponse, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use ledger::Settlement;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Request body for settling a transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SettleRequest {
    /// Ledger account the money moved through
    pub financial_account_id: i32,
    /// Payment date
    pub date: NaiveDate,
    /// Amount actually paid/received; defaults to the transaction value
    pub amount: Option<Decimal>,
    /// Appended to the transaction notes, never overwriting them
    pub notes: Option<String>,
}

/// Settle a pending transaction and post its cash movement
#[utoipa::path(
    post,
    path = "/api/v1/transactions/{transaction_id}/settle",
    tag = "settlements",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        TransactionScopeQuery
    ),
    request_body = SettleRequest,
    responses(
        (status = 200, description = "Transaction settled", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request or already settled", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn settle_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<TransactionScopeQuery>,
    Json(request): Json<SettleRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    let settlement = Settlement {
        financial_account_id: request.financial_account_id,
        date: request.date,
        amount: request.amount,
        notes: request.notes,
    };

    let outcome = ledger::settle(
        &state.db,
        query.company_id,
        query.transaction_type.into(),
        transaction_id,
        settlement,
    )
    .await
    .map_err(ledger_error_response)?;

    info!("Transaction {} settled", transaction_id);
    let response = ApiResponse {
        data: TransactionResponse::from(outcome.value),
        message: "Transaction settled".to_string(),
        success: true,
        warnings: warning_strings(&outcome.warnings),
    };
    Ok(Json(response))
}

/// Reverse a settlement, deleting its cash movements and resetting the row
#[utoipa::path(
    post,
    path = "/api/v1/transactions/{transaction_id}/reverse",
    tag = "settlements",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        TransactionScopeQuery
    ),
    responses(
        (status = 200, description = "Settlement reversed", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Transaction is not settled", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn reverse_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<TransactionScopeQuery>,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    let outcome = ledger::reverse_settlement(
        &state.db,
        query.company_id,
        query.transaction_type.into(),
        transaction_id,
    )
    .await
    .map_err(ledger_error_response)?;

    info!("Settlement of transaction {} reversed", transaction_id);
    let response = ApiResponse {
        data: TransactionResponse::from(outcome.value),
        message: "Settlement reversed".to_string(),
        success: true,
        warnings: warning_strings(&outcome.warnings),
    };
    Ok(Json(response))
}
