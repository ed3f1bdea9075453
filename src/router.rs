use crate::handlers::{
    accounts::{adjust_account_balance, create_account, get_account_balance, get_accounts},
    cash_movements::get_cash_movements,
    categories::{create_category, get_categories},
    companies::{create_company, get_companies},
    counterparties::{create_counterparty, get_counterparties},
    health::health_check,
    series::{delete_series, update_series},
    settlements::{reverse_transaction, settle_transaction},
    transactions::{
        create_transaction, delete_transaction, get_transaction, get_transaction_summary,
        get_transactions, update_transaction,
    },
    validation::{reject_transaction, validate_transaction},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Tenant bootstrap
        .route("/api/v1/companies", post(create_company))
        .route("/api/v1/companies", get(get_companies))
        // Accounts and balances
        .route("/api/v1/accounts", post(create_account))
        .route("/api/v1/accounts", get(get_accounts))
        .route("/api/v1/accounts/:account_id/balance", get(get_account_balance))
        .route(
            "/api/v1/accounts/:account_id/balance-adjustment",
            post(adjust_account_balance),
        )
        // Registries
        .route("/api/v1/counterparties", post(create_counterparty))
        .route("/api/v1/counterparties", get(get_counterparties))
        .route("/api/v1/categories", post(create_category))
        .route("/api/v1/categories", get(get_categories))
        // Transactions
        .route("/api/v1/transactions", post(create_transaction))
        .route("/api/v1/transactions", get(get_transactions))
        .route("/api/v1/transactions/summary", get(get_transaction_summary))
        .route("/api/v1/transactions/:transaction_id", get(get_transaction))
        .route("/api/v1/transactions/:transaction_id", put(update_transaction))
        .route("/api/v1/transactions/:transaction_id", delete(delete_transaction))
        // Settlement and reversal
        .route(
            "/api/v1/transactions/:transaction_id/settle",
            post(settle_transaction),
        )
        .route(
            "/api/v1/transactions/:transaction_id/reverse",
            post(reverse_transaction),
        )
        // Dual-control validation
        .route(
            "/api/v1/transactions/:transaction_id/validate",
            post(validate_transaction),
        )
        .route(
            "/api/v1/transactions/:transaction_id/reject",
            post(reject_transaction),
        )
        // Series mutation
        .route("/api/v1/series/:series_id", put(update_series))
        .route("/api/v1/series/:series_id", delete(delete_series))
        // Cash ledger
        .route("/api/v1/cash-movements", get(get_cash_movements))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
