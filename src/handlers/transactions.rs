use crate::schemas::{
    ledger_error_response, warning_strings, ApiError, ApiResponse, AppState, OccurrenceParam,
    SideParam, TransactionStatusParam, TransactionTypeParam, ViewParam,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use common::summary::TransactionSummary;
use ledger::{LedgerError, NewTransaction, TransactionFilter, TransactionUpdate};
use model::entities::financial_transaction;
use model::recurrence::RecurrenceRule;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub company_id: i32,
    pub transaction_type: TransactionTypeParam,
    pub description: String,
    /// Amount owed; must be strictly positive
    pub value: Decimal,
    pub payment_method: Option<String>,
    pub due_date: NaiveDate,
    pub date_of_issue: Option<NaiveDate>,
    /// Recurrence tag; the config fields below are interpreted against it
    pub occurrence: OccurrenceParam,
    /// 0 = Monday .. 6 = Sunday; required for weekly occurrence
    pub day_of_week: Option<i16>,
    /// 1..=31; required for monthly occurrence
    pub day_of_month: Option<i16>,
    /// Total number of installments (>= 2); required for installments
    pub installment_count: Option<i32>,
    /// 1..=31; required for installments
    pub installment_day: Option<i16>,
    /// Originating side; decides the trust default
    pub created_by_side: SideParam,
    pub counterparty_id: Option<i32>,
    pub category_id: Option<i32>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
}

/// Request body for updating a transaction. Absent fields are left alone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateTransactionRequest {
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub value: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub date_of_issue: Option<NaiveDate>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<i32>,
    pub counterparty_id: Option<i32>,
}

/// Transaction response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub company_id: i32,
    pub transaction_type: TransactionTypeParam,
    pub description: String,
    pub value: Decimal,
    pub paid_amount: Option<Decimal>,
    pub payment_method: Option<String>,
    pub due_date: NaiveDate,
    pub date_of_issue: Option<NaiveDate>,
    pub occurrence: OccurrenceParam,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub installment_count: Option<i32>,
    pub installment_day: Option<i16>,
    pub series_id: Option<i32>,
    pub status: TransactionStatusParam,
    pub payment_date: Option<NaiveDate>,
    pub financial_account_id: Option<i32>,
    pub created_by_side: SideParam,
    pub validated: bool,
    pub validated_at: Option<NaiveDateTime>,
    pub validated_by: Option<String>,
    pub rejected: bool,
    pub rejected_at: Option<NaiveDateTime>,
    pub rejected_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub counterparty_id: Option<i32>,
    pub category_id: Option<i32>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
}

impl From<financial_transaction::Model> for TransactionResponse {
    fn from(model: financial_transaction::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            transaction_type: model.transaction_type.into(),
            description: model.description,
            value: model.value,
            paid_amount: model.paid_amount,
            payment_method: model.payment_method,
            due_date: model.due_date,
            date_of_issue: model.date_of_issue,
            occurrence: model.occurrence.into(),
            day_of_week: model.day_of_week,
            day_of_month: model.day_of_month,
            installment_count: model.installment_count,
            installment_day: model.installment_day,
            series_id: model.series_id,
            status: model.status.into(),
            payment_date: model.payment_date,
            financial_account_id: model.financial_account_id,
            created_by_side: model.created_by_side.into(),
            validated: model.validated,
            validated_at: model.validated_at,
            validated_by: model.validated_by,
            rejected: model.rejected,
            rejected_at: model.rejected_at,
            rejected_by: model.rejected_by,
            rejection_reason: model.rejection_reason,
            counterparty_id: model.counterparty_id,
            category_id: model.category_id,
            document_number: model.document_number,
            notes: model.notes,
        }
    }
}

/// One page of transactions
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionPageResponse {
    pub items: Vec<TransactionResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct ListTransactionsQuery {
    pub company_id: i32,
    /// payable or receivable
    #[serde(rename = "type")]
    pub transaction_type: TransactionTypeParam,
    pub status: Option<TransactionStatusParam>,
    pub category_id: Option<i32>,
    pub financial_account_id: Option<i32>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
    /// Substring match over description and document number
    pub search: Option<String>,
    /// trusted (default) or pending-review
    pub view: Option<ViewParam>,
    /// Zero-based page index
    #[validate(range(max = 10_000))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 1_000))]
    pub page_size: Option<u64>,
}

/// Query parameters for single-transaction endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionScopeQuery {
    pub company_id: i32,
    #[serde(rename = "type")]
    pub transaction_type: TransactionTypeParam,
    /// Side making the request; client-side requests hit the editability guard
    pub origin: Option<SideParam>,
}

/// Query parameters for the summary endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    pub company_id: i32,
    #[serde(rename = "type")]
    pub transaction_type: TransactionTypeParam,
}

fn recurrence_rule(request: &CreateTransactionRequest) -> Result<RecurrenceRule, ApiError> {
    RecurrenceRule::from_parts(
        request.occurrence.into(),
        request.day_of_week,
        request.day_of_month,
        request.installment_count,
        request.installment_day,
    )
    .map_err(|reason| ledger_error_response(LedgerError::Validation(reason)))
}

/// Create a new payable or receivable transaction
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    tag = "transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), ApiError> {
    debug!(
        "Creating {:?} transaction for company {}",
        request.transaction_type, request.company_id
    );

    let rule = recurrence_rule(&request)?;
    let new = NewTransaction {
        company_id: request.company_id,
        transaction_type: request.transaction_type.into(),
        description: request.description,
        value: request.value,
        payment_method: request.payment_method,
        due_date: request.due_date,
        date_of_issue: request.date_of_issue,
        rule,
        created_by_side: request.created_by_side.into(),
        counterparty_id: request.counterparty_id,
        category_id: request.category_id,
        document_number: request.document_number,
        notes: request.notes,
    };

    let outcome = ledger::create_transaction(&state.db, new)
        .await
        .map_err(ledger_error_response)?;

    info!("Transaction created successfully with ID: {}", outcome.value.id);
    let response = ApiResponse {
        data: TransactionResponse::from(outcome.value),
        message: "Transaction created successfully".to_string(),
        success: true,
        warnings: warning_strings(&outcome.warnings),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// List transactions with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    tag = "transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<TransactionPageResponse>),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transactions(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ListTransactionsQuery>>,
) -> Result<Json<ApiResponse<TransactionPageResponse>>, ApiError> {
    let filter = TransactionFilter {
        status: query.status.map(Into::into),
        category_id: query.category_id,
        financial_account_id: query.financial_account_id,
        due_from: query.due_from,
        due_to: query.due_to,
        search: query.search,
        view: query.view.map(Into::into),
    };

    let page = ledger::list_transactions(
        &state.db,
        query.company_id,
        query.transaction_type.into(),
        filter,
        query.page.unwrap_or(0),
        query.page_size.unwrap_or(50),
    )
    .await
    .map_err(ledger_error_response)?;

    debug!(
        "Retrieved page {} ({} of {} transactions)",
        page.page,
        page.items.len(),
        page.total
    );
    let response = ApiResponse {
        data: TransactionPageResponse {
            items: page.items.into_iter().map(TransactionResponse::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        },
        message: "Transactions retrieved successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}

/// Summary of a company's trusted transactions, bucketed by due date and
/// payment method
#[utoipa::path(
    get,
    path = "/api/v1/transactions/summary",
    tag = "transactions",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Summary computed successfully", body = ApiResponse<TransactionSummary>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transaction_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<ApiResponse<TransactionSummary>>, ApiError> {
    let cache_key = format!("summary:{}:{:?}", query.company_id, query.transaction_type);

    if let Some(cached) = state.summary_cache.get(&cache_key).await {
        debug!("Summary cache hit for {}", cache_key);
        let response = ApiResponse {
            data: cached,
            message: "Summary retrieved from cache".to_string(),
            success: true,
            warnings: Vec::new(),
        };
        return Ok(Json(response));
    }

    let summary = ledger::transaction_summary(
        &state.db,
        query.company_id,
        query.transaction_type.into(),
        Utc::now().date_naive(),
    )
    .await
    .map_err(ledger_error_response)?;

    state.summary_cache.insert(cache_key, summary.clone()).await;

    let response = ApiResponse {
        data: summary,
        message: "Summary computed successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}

/// Get one transaction by ID
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        TransactionScopeQuery
    ),
    responses(
        (status = 200, description = "Transaction retrieved successfully", body = ApiResponse<TransactionResponse>),
        (status = 404, description = "Transaction not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<TransactionScopeQuery>,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    let transaction = ledger::get_transaction(&state.db, query.company_id, transaction_id)
        .await
        .map_err(ledger_error_response)?;

    let response = ApiResponse {
        data: TransactionResponse::from(transaction),
        message: "Transaction retrieved successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}

/// Update one pending transaction
#[utoipa::path(
    put,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        TransactionScopeQuery
    ),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<TransactionScopeQuery>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, ApiError> {
    guard_client_origin(&state, &query, transaction_id).await?;

    let update = TransactionUpdate {
        description: request.description,
        payment_method: request.payment_method,
        value: request.value,
        due_date: request.due_date,
        date_of_issue: request.date_of_issue,
        document_number: request.document_number,
        notes: request.notes,
        category_id: request.category_id,
        counterparty_id: request.counterparty_id,
    };

    let updated = ledger::update_transaction(
        &state.db,
        query.company_id,
        query.transaction_type.into(),
        transaction_id,
        update,
    )
    .await
    .map_err(ledger_error_response)?;

    info!("Transaction {} updated", updated.id);
    let response = ApiResponse {
        data: TransactionResponse::from(updated),
        message: "Transaction updated successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}

/// Delete one pending transaction
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        TransactionScopeQuery
    ),
    responses(
        (status = 200, description = "Transaction deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<TransactionScopeQuery>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    guard_client_origin(&state, &query, transaction_id).await?;

    ledger::delete_transaction(
        &state.db,
        query.company_id,
        query.transaction_type.into(),
        transaction_id,
    )
    .await
    .map_err(ledger_error_response)?;

    info!("Transaction {} deleted", transaction_id);
    let response = ApiResponse {
        data: format!("Transaction {} deleted", transaction_id),
        message: "Transaction deleted successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}

/// Client-originated edits are only allowed while the row is still
/// unvalidated and unrejected.
async fn guard_client_origin(
    state: &AppState,
    query: &TransactionScopeQuery,
    transaction_id: i32,
) -> Result<(), ApiError> {
    if query.origin == Some(SideParam::ClientSide) {
        let transaction = ledger::get_transaction(&state.db, query.company_id, transaction_id)
            .await
            .map_err(ledger_error_response)?;
        ledger::ensure_client_editable(&transaction).map_err(ledger_error_response)?;
    }
    Ok(())
}
