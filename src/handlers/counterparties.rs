use crate::handlers::accounts::CompanyScopeQuery;
use crate::schemas::{ledger_error_response, ApiError, ApiResponse, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use model::entities::counterparty::{self, CounterpartyKind};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

/// Counterparty kind as it appears on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartyKindParam {
    Client,
    Supplier,
    Both,
}

impl From<CounterpartyKindParam> for CounterpartyKind {
    fn from(value: CounterpartyKindParam) -> Self {
        match value {
            CounterpartyKindParam::Client => CounterpartyKind::Client,
            CounterpartyKindParam::Supplier => CounterpartyKind::Supplier,
            CounterpartyKindParam::Both => CounterpartyKind::Both,
        }
    }
}

impl From<CounterpartyKind> for CounterpartyKindParam {
    fn from(value: CounterpartyKind) -> Self {
        match value {
            CounterpartyKind::Client => CounterpartyKindParam::Client,
            CounterpartyKind::Supplier => CounterpartyKindParam::Supplier,
            CounterpartyKind::Both => CounterpartyKindParam::Both,
        }
    }
}

/// Request body for creating a counterparty
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCounterpartyRequest {
    pub company_id: i32,
    pub name: String,
    pub kind: CounterpartyKindParam,
}

/// Counterparty response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CounterpartyResponse {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub kind: CounterpartyKindParam,
}

impl From<counterparty::Model> for CounterpartyResponse {
    fn from(model: counterparty::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            kind: model.kind.into(),
        }
    }
}

/// Create a new counterparty
#[utoipa::path(
    post,
    path = "/api/v1/counterparties",
    tag = "counterparties",
    request_body = CreateCounterpartyRequest,
    responses(
        (status = 201, description = "Counterparty created successfully", body = ApiResponse<CounterpartyResponse>),
        (status = 404, description = "Company not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_counterparty(
    State(state): State<AppState>,
    Json(request): Json<CreateCounterpartyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CounterpartyResponse>>), ApiError> {
    ledger::require_company(&state.db, request.company_id)
        .await
        .map_err(ledger_error_response)?;

    let new_counterparty = counterparty::ActiveModel {
        company_id: Set(request.company_id),
        name: Set(request.name.clone()),
        kind: Set(request.kind.into()),
        ..Default::default()
    };

    let model = new_counterparty
        .insert(&state.db)
        .await
        .map_err(|e| ledger_error_response(e.into()))?;

    info!("Counterparty created successfully with ID: {}", model.id);
    let response = ApiResponse {
        data: CounterpartyResponse::from(model),
        message: "Counterparty created successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all counterparties of a company
#[utoipa::path(
    get,
    path = "/api/v1/counterparties",
    tag = "counterparties",
    params(CompanyScopeQuery),
    responses(
        (status = 200, description = "Counterparties retrieved successfully", body = ApiResponse<Vec<CounterpartyResponse>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_counterparties(
    State(state): State<AppState>,
    Query(query): Query<CompanyScopeQuery>,
) -> Result<Json<ApiResponse<Vec<CounterpartyResponse>>>, ApiError> {
    let counterparties = counterparty::Entity::find()
        .filter(counterparty::Column::CompanyId.eq(query.company_id))
        .all(&state.db)
        .await
        .map_err(|e| ledger_error_response(e.into()))?;

    debug!(
        "Retrieved {} counterparties for company {}",
        counterparties.len(),
        query.company_id
    );
    let response = ApiResponse {
        data: counterparties
            .into_iter()
            .map(CounterpartyResponse::from)
            .collect(),
        message: "Counterparties retrieved successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}
