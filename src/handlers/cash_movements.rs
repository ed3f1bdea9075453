use crate::schemas::{ledger_error_response, ApiError, ApiResponse, AppState};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use model::entities::cash_movement::{self, MovementType, ReferenceType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing cash movements
#[derive(Debug, Deserialize, IntoParams)]
pub struct CashMovementsQuery {
    pub company_id: i32,
    pub financial_account_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Cash movement response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CashMovementResponse {
    pub id: i32,
    pub company_id: i32,
    pub financial_account_id: i32,
    pub amount: Decimal,
    /// credit or debit
    pub movement_type: String,
    pub description: String,
    /// account_payment, account_receipt, or manual_adjustment
    pub reference_type: String,
    pub reference_id: Option<i32>,
    pub date: NaiveDate,
}

impl From<cash_movement::Model> for CashMovementResponse {
    fn from(model: cash_movement::Model) -> Self {
        let movement_type = match model.movement_type {
            MovementType::Credit => "credit",
            MovementType::Debit => "debit",
        };
        let reference_type = match model.reference_type {
            ReferenceType::AccountPayment => "account_payment",
            ReferenceType::AccountReceipt => "account_receipt",
            ReferenceType::ManualAdjustment => "manual_adjustment",
        };
        Self {
            id: model.id,
            company_id: model.company_id,
            financial_account_id: model.financial_account_id,
            amount: model.amount,
            movement_type: movement_type.to_string(),
            description: model.description,
            reference_type: reference_type.to_string(),
            reference_id: model.reference_id,
            date: model.date,
        }
    }
}

/// List cash movements, optionally narrowed to one account and a date range
#[utoipa::path(
    get,
    path = "/api/v1/cash-movements",
    tag = "cash-movements",
    params(CashMovementsQuery),
    responses(
        (status = 200, description = "Cash movements retrieved successfully", body = ApiResponse<Vec<CashMovementResponse>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_cash_movements(
    State(state): State<AppState>,
    Query(query): Query<CashMovementsQuery>,
) -> Result<Json<ApiResponse<Vec<CashMovementResponse>>>, ApiError> {
    let movements = ledger::list_cash_movements(
        &state.db,
        query.company_id,
        query.financial_account_id,
        query.from,
        query.to,
    )
    .await
    .map_err(ledger_error_response)?;

    debug!(
        "Retrieved {} cash movements for company {}",
        movements.len(),
        query.company_id
    );
    let response = ApiResponse {
        data: movements.into_iter().map(CashMovementResponse::from).collect(),
        message: "Cash movements retrieved successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}
