use crate::handlers::transactions::TransactionResponse;
use crate::schemas::{
    ledger_error_response, ApiError, ApiResponse, AppState, SeriesScopeParam,
    TransactionTypeParam,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use ledger::SeriesUpdate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

/// Query parameters scoping a series operation
#[derive(Debug, Deserialize, IntoParams)]
pub struct SeriesScopeQuery {
    pub company_id: i32,
    /// payable or receivable
    #[serde(rename = "type")]
    pub transaction_type: TransactionTypeParam,
    /// Which occurrences the operation touches
    pub scope: SeriesScopeParam,
}

/// Request body for a bulk series update. Absent fields are left alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateSeriesRequest {
    pub payment_method: Option<String>,
    pub value: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub date_of_issue: Option<NaiveDate>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<i32>,
}

/// Result of a series delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeriesDeletionResponse {
    pub count: u64,
    pub ids: Vec<i32>,
}

/// Bulk-update the occurrences of a recurring series
#[utoipa::path(
    put,
    path = "/api/v1/series/{series_id}",
    tag = "series",
    params(
        ("series_id" = i32, Path, description = "Series ID (the template transaction's ID)"),
        SeriesScopeQuery
    ),
    request_body = UpdateSeriesRequest,
    responses(
        (status = 200, description = "Series updated", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 400, description = "Invalid scope or empty update", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Series not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_series(
    State(state): State<AppState>,
    Path(series_id): Path<i32>,
    Query(query): Query<SeriesScopeQuery>,
    Json(request): Json<UpdateSeriesRequest>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, ApiError> {
    let update = SeriesUpdate {
        payment_method: request.payment_method,
        value: request.value,
        due_date: request.due_date,
        date_of_issue: request.date_of_issue,
        document_number: request.document_number,
        notes: request.notes,
        category_id: request.category_id,
    };

    let updated = ledger::update_series(
        &state.db,
        query.company_id,
        query.transaction_type.into(),
        series_id,
        query.scope.into(),
        update,
    )
    .await
    .map_err(ledger_error_response)?;

    info!("Series {} updated ({} rows)", series_id, updated.len());
    let response = ApiResponse {
        data: updated.into_iter().map(TransactionResponse::from).collect(),
        message: "Series updated".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}

/// Bulk-delete the occurrences of a recurring series
#[utoipa::path(
    delete,
    path = "/api/v1/series/{series_id}",
    tag = "series",
    params(
        ("series_id" = i32, Path, description = "Series ID (the template transaction's ID)"),
        SeriesScopeQuery
    ),
    responses(
        (status = 200, description = "Series deleted", body = ApiResponse<SeriesDeletionResponse>),
        (status = 400, description = "Invalid scope", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Series not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_series(
    State(state): State<AppState>,
    Path(series_id): Path<i32>,
    Query(query): Query<SeriesScopeQuery>,
) -> Result<Json<ApiResponse<SeriesDeletionResponse>>, ApiError> {
    let deletion = ledger::delete_series(
        &state.db,
        query.company_id,
        query.transaction_type.into(),
        series_id,
        query.scope.into(),
    )
    .await
    .map_err(ledger_error_response)?;

    info!("Series {} deleted ({} rows)", series_id, deletion.count);
    let response = ApiResponse {
        data: SeriesDeletionResponse {
            count: deletion.count,
            ids: deletion.ids,
        },
        message: "Series deleted".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}
