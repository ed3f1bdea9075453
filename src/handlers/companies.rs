use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::company;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

/// Request body for creating a company
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCompanyRequest {
    /// Company name
    pub name: String,
}

/// Company response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub id: i32,
    pub name: String,
}

impl From<company::Model> for CompanyResponse {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Create a new company (tenant)
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    tag = "companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created successfully", body = ApiResponse<CompanyResponse>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CompanyResponse>>), StatusCode> {
    debug!("Creating company with name: {}", request.name);

    let new_company = company::ActiveModel {
        name: Set(request.name.clone()),
        ..Default::default()
    };

    match new_company.insert(&state.db).await {
        Ok(company_model) => {
            info!("Company created successfully with ID: {}", company_model.id);
            let response = ApiResponse {
                data: CompanyResponse::from(company_model),
                message: "Company created successfully".to_string(),
                success: true,
                warnings: Vec::new(),
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create company '{}': {}", request.name, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all companies
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    tag = "companies",
    responses(
        (status = 200, description = "Companies retrieved successfully", body = ApiResponse<Vec<CompanyResponse>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_companies(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CompanyResponse>>>, StatusCode> {
    match company::Entity::find().all(&state.db).await {
        Ok(companies) => {
            debug!("Retrieved {} companies", companies.len());
            let response = ApiResponse {
                data: companies.into_iter().map(CompanyResponse::from).collect(),
                message: "Companies retrieved successfully".to_string(),
                success: true,
                warnings: Vec::new(),
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve companies: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
