//! Read contracts over the transaction store: filtered listing with
//! pagination and single-record lookup.

use chrono::NaiveDate;
use model::entities::financial_transaction::{
    self, CreatedBySide, TransactionStatus, TransactionType,
};
use model::entities::prelude::*;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use tracing::instrument;

use crate::error::{LedgerError, Result};

/// Which slice of the store a listing sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionView {
    /// Validated rows, the operational truth.
    Trusted,
    /// Client-submitted rows still waiting for an operator decision.
    PendingReview,
}

/// Optional narrowing criteria for `list_transactions`.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub category_id: Option<i32>,
    pub financial_account_id: Option<i32>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
    /// Case-insensitive substring match over description and document number.
    pub search: Option<String>,
    pub view: Option<TransactionView>,
}

/// One page of transactions plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub items: Vec<financial_transaction::Model>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Lists a company's transactions of one type, newest due date last.
#[instrument(skip(db, filter))]
pub async fn list_transactions(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    filter: TransactionFilter,
    page: u64,
    page_size: u64,
) -> Result<TransactionPage> {
    if page_size == 0 {
        return Err(LedgerError::Validation(
            "page_size must be greater than zero".to_string(),
        ));
    }

    let mut query = FinancialTransaction::find()
        .filter(financial_transaction::Column::CompanyId.eq(company_id))
        .filter(financial_transaction::Column::TransactionType.eq(transaction_type));

    match filter.view {
        Some(TransactionView::Trusted) | None => {
            query = query.filter(financial_transaction::Column::Validated.eq(true));
        }
        Some(TransactionView::PendingReview) => {
            query = query
                .filter(
                    financial_transaction::Column::CreatedBySide.eq(CreatedBySide::ClientSide),
                )
                .filter(financial_transaction::Column::Validated.eq(false))
                .filter(financial_transaction::Column::Rejected.eq(false));
        }
    }

    if let Some(status) = filter.status {
        query = query.filter(financial_transaction::Column::Status.eq(status));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(financial_transaction::Column::CategoryId.eq(category_id));
    }
    if let Some(account_id) = filter.financial_account_id {
        query = query.filter(financial_transaction::Column::FinancialAccountId.eq(account_id));
    }
    if let Some(from) = filter.due_from {
        query = query.filter(financial_transaction::Column::DueDate.gte(from));
    }
    if let Some(to) = filter.due_to {
        query = query.filter(financial_transaction::Column::DueDate.lte(to));
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        query = query.filter(
            Condition::any()
                .add(financial_transaction::Column::Description.like(&pattern))
                .add(financial_transaction::Column::DocumentNumber.like(&pattern)),
        );
    }

    let query = query
        .order_by_asc(financial_transaction::Column::DueDate)
        .order_by_asc(financial_transaction::Column::Id);

    let paginator = query.paginate(db, page_size);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page).await?;

    Ok(TransactionPage {
        items,
        total,
        page,
        page_size,
    })
}

/// Fetches one transaction scoped to its company. Both trusted and
/// pending-review rows resolve; rejected rows stay readable (their audit
/// trail matters).
#[instrument(skip(db))]
pub async fn get_transaction(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_id: i32,
) -> Result<financial_transaction::Model> {
    FinancialTransaction::find_by_id(transaction_id)
        .filter(financial_transaction::Column::CompanyId.eq(company_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            LedgerError::NotFound(format!(
                "transaction {} does not exist for company {}",
                transaction_id, company_id
            ))
        })
}
