use axum::http::StatusCode;
use axum::response::Json;
use common::summary::{BucketTotals, PaymentMethodTotals, TransactionSummary};
use ledger::{LedgerError, SeriesScope, TransactionView, Warning};
use model::entities::financial_transaction::{
    CreatedBySide, OccurrenceKind, TransactionStatus, TransactionType,
};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Short-lived cache for transaction summaries, keyed by company + type
    pub summary_cache: Cache<String, TransactionSummary>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
    /// Partial-failure warnings (settlement posting, series expansion)
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps an engine error onto the HTTP error envelope. Database errors never
/// leak their text; the detail goes to tracing only.
pub fn ledger_error_response(error: LedgerError) -> ApiError {
    match error {
        LedgerError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message,
                code: "validation_error".to_string(),
                success: false,
            }),
        ),
        LedgerError::NotFound(message) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: message,
                code: "not_found".to_string(),
                success: false,
            }),
        ),
        LedgerError::InvariantViolation(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message,
                code: "invariant_violation".to_string(),
                success: false,
            }),
        ),
        LedgerError::Database(db_error) => {
            tracing::error!("Database error: {}", db_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    code: "internal_error".to_string(),
                    success: false,
                }),
            )
        }
    }
}

pub fn warning_strings(warnings: &[Warning]) -> Vec<String> {
    warnings.iter().map(|w| w.to_string()).collect()
}

/// Transaction type as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionTypeParam {
    Payable,
    Receivable,
}

impl From<TransactionTypeParam> for TransactionType {
    fn from(value: TransactionTypeParam) -> Self {
        match value {
            TransactionTypeParam::Payable => TransactionType::Payable,
            TransactionTypeParam::Receivable => TransactionType::Receivable,
        }
    }
}

impl From<TransactionType> for TransactionTypeParam {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Payable => TransactionTypeParam::Payable,
            TransactionType::Receivable => TransactionTypeParam::Receivable,
        }
    }
}

/// Settlement status as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatusParam {
    Pending,
    Paid,
}

impl From<TransactionStatusParam> for TransactionStatus {
    fn from(value: TransactionStatusParam) -> Self {
        match value {
            TransactionStatusParam::Pending => TransactionStatus::Pending,
            TransactionStatusParam::Paid => TransactionStatus::Paid,
        }
    }
}

impl From<TransactionStatus> for TransactionStatusParam {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Pending => TransactionStatusParam::Pending,
            TransactionStatus::Paid => TransactionStatusParam::Paid,
        }
    }
}

/// Recurrence tag as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceParam {
    Unique,
    Weekly,
    Monthly,
    Installments,
}

impl From<OccurrenceParam> for OccurrenceKind {
    fn from(value: OccurrenceParam) -> Self {
        match value {
            OccurrenceParam::Unique => OccurrenceKind::Unique,
            OccurrenceParam::Weekly => OccurrenceKind::Weekly,
            OccurrenceParam::Monthly => OccurrenceKind::Monthly,
            OccurrenceParam::Installments => OccurrenceKind::Installments,
        }
    }
}

impl From<OccurrenceKind> for OccurrenceParam {
    fn from(value: OccurrenceKind) -> Self {
        match value {
            OccurrenceKind::Unique => OccurrenceParam::Unique,
            OccurrenceKind::Weekly => OccurrenceParam::Weekly,
            OccurrenceKind::Monthly => OccurrenceParam::Monthly,
            OccurrenceKind::Installments => OccurrenceParam::Installments,
        }
    }
}

/// Originating side of a transaction as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SideParam {
    ClientSide,
    BpoSide,
}

impl From<SideParam> for CreatedBySide {
    fn from(value: SideParam) -> Self {
        match value {
            SideParam::ClientSide => CreatedBySide::ClientSide,
            SideParam::BpoSide => CreatedBySide::BpoSide,
        }
    }
}

impl From<CreatedBySide> for SideParam {
    fn from(value: CreatedBySide) -> Self {
        match value {
            CreatedBySide::ClientSide => SideParam::ClientSide,
            CreatedBySide::BpoSide => SideParam::BpoSide,
        }
    }
}

/// Series mutation scope as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeriesScopeParam {
    Current,
    Future,
    Unpaid,
    All,
}

impl From<SeriesScopeParam> for SeriesScope {
    fn from(value: SeriesScopeParam) -> Self {
        match value {
            SeriesScopeParam::Current => SeriesScope::Current,
            SeriesScopeParam::Future => SeriesScope::Future,
            SeriesScopeParam::Unpaid => SeriesScope::Unpaid,
            SeriesScopeParam::All => SeriesScope::All,
        }
    }
}

/// Listing view as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ViewParam {
    #[serde(rename = "trusted")]
    Trusted,
    #[serde(rename = "pending-review")]
    PendingReview,
}

impl From<ViewParam> for TransactionView {
    fn from(value: ViewParam) -> Self {
        match value {
            ViewParam::Trusted => TransactionView::Trusted,
            ViewParam::PendingReview => TransactionView::PendingReview,
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::companies::create_company,
        crate::handlers::companies::get_companies,
        crate::handlers::accounts::create_account,
        crate::handlers::accounts::get_accounts,
        crate::handlers::accounts::get_account_balance,
        crate::handlers::accounts::adjust_account_balance,
        crate::handlers::counterparties::create_counterparty,
        crate::handlers::counterparties::get_counterparties,
        crate::handlers::categories::create_category,
        crate::handlers::categories::get_categories,
        crate::handlers::transactions::create_transaction,
        crate::handlers::transactions::get_transactions,
        crate::handlers::transactions::get_transaction_summary,
        crate::handlers::transactions::get_transaction,
        crate::handlers::transactions::update_transaction,
        crate::handlers::transactions::delete_transaction,
        crate::handlers::settlements::settle_transaction,
        crate::handlers::settlements::reverse_transaction,
        crate::handlers::validation::validate_transaction,
        crate::handlers::validation::reject_transaction,
        crate::handlers::series::update_series,
        crate::handlers::series::delete_series,
        crate::handlers::cash_movements::get_cash_movements,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::companies::CompanyResponse>,
            ApiResponse<Vec<crate::handlers::companies::CompanyResponse>>,
            ApiResponse<crate::handlers::accounts::AccountResponse>,
            ApiResponse<crate::handlers::accounts::BalanceResponse>,
            ApiResponse<crate::handlers::transactions::TransactionResponse>,
            ApiResponse<crate::handlers::transactions::TransactionPageResponse>,
            ApiResponse<TransactionSummary>,
            ErrorResponse,
            HealthResponse,
            TransactionTypeParam,
            TransactionStatusParam,
            OccurrenceParam,
            SideParam,
            SeriesScopeParam,
            ViewParam,
            TransactionSummary,
            BucketTotals,
            PaymentMethodTotals,
            crate::handlers::companies::CreateCompanyRequest,
            crate::handlers::companies::CompanyResponse,
            crate::handlers::accounts::CreateAccountRequest,
            crate::handlers::accounts::AccountResponse,
            crate::handlers::accounts::BalanceResponse,
            crate::handlers::accounts::BalanceAdjustmentRequest,
            crate::handlers::counterparties::CreateCounterpartyRequest,
            crate::handlers::counterparties::CounterpartyResponse,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::CategoryResponse,
            crate::handlers::transactions::CreateTransactionRequest,
            crate::handlers::transactions::UpdateTransactionRequest,
            crate::handlers::transactions::TransactionResponse,
            crate::handlers::transactions::TransactionPageResponse,
            crate::handlers::settlements::SettleRequest,
            crate::handlers::validation::ValidateRequest,
            crate::handlers::validation::RejectRequest,
            crate::handlers::validation::ValidationResponse,
            crate::handlers::series::UpdateSeriesRequest,
            crate::handlers::series::SeriesDeletionResponse,
            crate::handlers::cash_movements::CashMovementResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "companies", description = "Tenant bootstrap endpoints"),
        (name = "accounts", description = "Financial account and balance endpoints"),
        (name = "counterparties", description = "Counterparty registry endpoints"),
        (name = "categories", description = "Category registry endpoints"),
        (name = "transactions", description = "Payable/receivable transaction endpoints"),
        (name = "settlements", description = "Settlement and reversal endpoints"),
        (name = "validation", description = "Dual-control validation endpoints"),
        (name = "series", description = "Recurring series mutation endpoints"),
        (name = "cash-movements", description = "Cash ledger endpoints"),
    ),
    info(
        title = "FinLedger API",
        description = "Financial transaction ledger for back-office payables and receivables",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
