use crate::handlers::accounts::CompanyScopeQuery;
use crate::schemas::{ledger_error_response, ApiError, ApiResponse, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use model::entities::category;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

/// Request body for creating a category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub company_id: i32,
    pub name: String,
}

/// Category response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
        }
    }
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Company not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), ApiError> {
    ledger::require_company(&state.db, request.company_id)
        .await
        .map_err(ledger_error_response)?;

    let new_category = category::ActiveModel {
        company_id: Set(request.company_id),
        name: Set(request.name.clone()),
        ..Default::default()
    };

    let model = new_category
        .insert(&state.db)
        .await
        .map_err(|e| ledger_error_response(e.into()))?;

    info!("Category created successfully with ID: {}", model.id);
    let response = ApiResponse {
        data: CategoryResponse::from(model),
        message: "Category created successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all categories of a company
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    params(CompanyScopeQuery),
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
    Query(query): Query<CompanyScopeQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ApiError> {
    let categories = category::Entity::find()
        .filter(category::Column::CompanyId.eq(query.company_id))
        .all(&state.db)
        .await
        .map_err(|e| ledger_error_response(e.into()))?;

    debug!(
        "Retrieved {} categories for company {}",
        categories.len(),
        query.company_id
    );
    let response = ApiResponse {
        data: categories.into_iter().map(CategoryResponse::from).collect(),
        message: "Categories retrieved successfully".to_string(),
        success: true,
        warnings: Vec::new(),
    };
    Ok(Json(response))
}
