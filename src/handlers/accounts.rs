use crate::schemas::{
    ledger_error_response, ApiError, ApiResponse, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use model::entities::financial_account;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use utoipa::{IntoParams, ToSchema};

/// Request body for creating a financial account
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAccountRequest {
    /// Owning company ID
    pub company_id: i32,
    /// Account name
    pub name: String,
    /// Account type label (e.g. "checking", "cash")
    pub account_type: Option<String>,
}

/// Financial account response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub account_type: Option<String>,
}

impl From<financial_account::Model> for AccountResponse {
    fn from(model: financial_account::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            account_type: model.account_type,
        }
    }
}

/// Computed account balance
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub account_id: i32,
    /// Sum of credits minus sum of debits
    pub balance: Decimal,
}

/// Request body for a manual balance adjustment
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BalanceAdjustmentRequest {
    pub company_id: i32,
    /// The balance the account should show after the adjustment
    pub target_balance: Decimal,
    /// Ledger date of the adjustment; defaults to today
    pub date: Option<NaiveDate>,
}

/// Company scope for account queries
#[derive(Debug, Deserialize, IntoParams)]
pub struct CompanyScopeQuery {
    pub company_id: i32,
}

/// Create a new financial account
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<AccountResponse>),
        (status = 404, description = "Company not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), ApiError> {
    debug!("Creating account '{}' for company {}", request.name, request.company_id);

    ledger::require_company(&state.db, request.company_id)
        .await
        .map_err(ledger_error_response)?;

    let new_account = financial_account::ActiveModel {
        company_id: Set(request.company_id),
        name: Set(request.name.clone()),
        account_type: Set(request.account_type.clone()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    match new_account.insert(&state.db).await {
        Ok(account_model) => {
            info!("Account created successfully with ID: {}", account_model.id);
            let response = ApiResponse {
                data: AccountResponse::from(account_model),
                message: "Account created successfully".to_string(),
                success: true,
                warnings: Vec::new(),
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create account '{}': {}", request.name, db_error);
            Err(ledger_error_response(db_error.into()))
        }
    }
}

/// Get all accounts of a company
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    tag = "accounts",
    params(CompanyScopeQuery),
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = ApiResponse<Vec<AccountResponse>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_accounts(
    State(state): State<AppState>,
    Query(query): Query<CompanyScopeQuery>,
) -> Result<Json<ApiResponse<Vec<AccountResponse>>>, ApiError> {
    let accounts = financial_account::Entity::find()
        .filter(financial_account::Column::CompanyId.eq(query.company_id))
        .all(&state.db)
        .await
        .map_err(|e| ledger_error_response(e.into()))?;

    debug!("Retrieved {} accounts for company {}", accounts.len(), query.company_id);
    let response = ApiResponse {
        data: accounts.into_iter().map(AccountResponse::from).collect(),
        message: "Accounts retrieved successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}

/// Get the computed balance of one account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/balance",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
        CompanyScopeQuery
    ),
    responses(
        (status = 200, description = "Balance computed successfully", body = ApiResponse<BalanceResponse>),
        (status = 404, description = "Account not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_account_balance(
    State(state): State<AppState>,
    Path(account_id): Path<i32>,
    Query(query): Query<CompanyScopeQuery>,
) -> Result<Json<ApiResponse<BalanceResponse>>, ApiError> {
    let balance = ledger::account_balance(&state.db, query.company_id, account_id)
        .await
        .map_err(ledger_error_response)?;

    let response = ApiResponse {
        data: BalanceResponse { account_id, balance },
        message: "Balance computed successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}

/// Force an account balance to a target value via a manual adjustment
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{account_id}/balance-adjustment",
    tag = "accounts",
    params(("account_id" = i32, Path, description = "Account ID")),
    request_body = BalanceAdjustmentRequest,
    responses(
        (status = 200, description = "Adjustment processed", body = ApiResponse<BalanceResponse>),
        (status = 404, description = "Account not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn adjust_account_balance(
    State(state): State<AppState>,
    Path(account_id): Path<i32>,
    Json(request): Json<BalanceAdjustmentRequest>,
) -> Result<Json<ApiResponse<BalanceResponse>>, ApiError> {
    let date = request.date.unwrap_or_else(|| Utc::now().date_naive());
    let movement = ledger::adjust_account_balance(
        &state.db,
        request.company_id,
        account_id,
        request.target_balance,
        date,
    )
    .await
    .map_err(ledger_error_response)?;

    let message = match movement {
        Some(movement) => {
            info!(
                "Posted {:?} adjustment of {} on account {}",
                movement.movement_type, movement.amount, account_id
            );
            "Balance adjusted".to_string()
        }
        None => "Balance already within tolerance; nothing posted".to_string(),
    };

    let balance = ledger::account_balance(&state.db, request.company_id, account_id)
        .await
        .map_err(ledger_error_response)?;

    let response = ApiResponse {
        data: BalanceResponse { account_id, balance },
        message,
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}
