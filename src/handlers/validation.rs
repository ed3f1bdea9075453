use crate::handlers::transactions::TransactionResponse;
use crate::schemas::{
    ledger_error_response, warning_strings, ApiError, ApiResponse, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

/// Request body for validating a client-submitted transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ValidateRequest {
    /// Operator performing the validation
    pub validated_by: String,
    /// Category to assign during validation
    pub category_id: Option<i32>,
}

/// Request body for rejecting a client-submitted transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RejectRequest {
    /// Operator performing the rejection
    pub rejected_by: String,
    /// Mandatory rejection reason
    pub reason: String,
}

/// Validation result: the validated row plus any series siblings it fanned
/// out into
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationResponse {
    pub transaction: TransactionResponse,
    pub generated: Vec<TransactionResponse>,
}

/// Company scope for validation endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct ValidationScopeQuery {
    pub company_id: i32,
}

/// Validate a client-submitted transaction, expanding its series if it is a
/// recurring head
#[utoipa::path(
    post,
    path = "/api/v1/transactions/{transaction_id}/validate",
    tag = "validation",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        ValidationScopeQuery
    ),
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Transaction validated", body = ApiResponse<ValidationResponse>),
        (status = 400, description = "Already validated, rejected, or BPO-originated", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn validate_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<ValidationScopeQuery>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ApiResponse<ValidationResponse>>, ApiError> {
    let outcome = ledger::validate_transaction(
        &state.db,
        query.company_id,
        transaction_id,
        &request.validated_by,
        request.category_id,
    )
    .await
    .map_err(ledger_error_response)?;

    let (transaction, generated) = outcome.value;
    info!(
        "Transaction {} validated, {} series rows generated",
        transaction_id,
        generated.len()
    );
    let response = ApiResponse {
        data: ValidationResponse {
            transaction: TransactionResponse::from(transaction),
            generated: generated.into_iter().map(TransactionResponse::from).collect(),
        },
        message: "Transaction validated".to_string(),
        success: true,
        warnings: warning_strings(&outcome.warnings),
    };
    Ok(Json(response))
}

/// Reject a client-submitted transaction. Terminal.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/{transaction_id}/reject",
    tag = "validation",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        ValidationScopeQuery
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Transaction rejected", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Missing reason, already validated, or already rejected", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn reject_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<ValidationScopeQuery>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    let rejected = ledger::reject_transaction(
        &state.db,
        query.company_id,
        transaction_id,
        &request.rejected_by,
        &request.reason,
    )
    .await
    .map_err(ledger_error_response)?;

    info!("Transaction {} rejected", transaction_id);
    let response = ApiResponse {
        data: TransactionResponse::from(rejected),
        message: "Transaction rejected".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}
