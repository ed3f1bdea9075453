//! Bulk mutation of a recurring series: edit or delete every occurrence a
//! scope selects, strictly bounded by `series_id`, transaction type and
//! company.

use chrono::{NaiveDate, Utc};
use model::entities::financial_transaction::{self, TransactionStatus, TransactionType};
use model::entities::prelude::*;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};
use tracing::{info, instrument};

use crate::error::{LedgerError, Result};

/// Which occurrences of a series a bulk operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesScope {
    /// Single-record scope; series operations refuse it and point callers
    /// at the per-transaction path.
    Current,
    /// Occurrences from today on. Inclusive for updates; for deletes the
    /// boundary differs per transaction type (see `delete_series`).
    Future,
    /// Occurrences still pending payment.
    Unpaid,
    /// Every occurrence of the series.
    All,
}

/// Allow-listed fields a series update may touch. `None` leaves the column
/// as it is.
#[derive(Debug, Clone, Default)]
pub struct SeriesUpdate {
    pub payment_method: Option<String>,
    pub value: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub date_of_issue: Option<NaiveDate>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<i32>,
}

impl SeriesUpdate {
    fn is_empty(&self) -> bool {
        self.payment_method.is_none()
            && self.value.is_none()
            && self.due_date.is_none()
            && self.date_of_issue.is_none()
            && self.document_number.is_none()
            && self.notes.is_none()
            && self.category_id.is_none()
    }
}

/// Outcome of a series delete: how many rows went away and which ones.
#[derive(Debug, Clone)]
pub struct SeriesDeletion {
    pub count: u64,
    pub ids: Vec<i32>,
}

/// Applies an allow-listed update to every occurrence the scope selects.
///
/// Settled receivables are excluded under every scope; their economics are
/// already reflected in the cash ledger and must not change silently.
#[instrument(skip(db, update))]
pub async fn update_series(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    series_id: i32,
    scope: SeriesScope,
    update: SeriesUpdate,
) -> Result<Vec<financial_transaction::Model>> {
    if scope == SeriesScope::Current {
        return Err(LedgerError::Validation(
            "scope 'current' is not a series operation; update the transaction directly"
                .to_string(),
        ));
    }
    if update.is_empty() {
        return Err(LedgerError::Validation(
            "the series update carries no fields".to_string(),
        ));
    }
    if let Some(value) = update.value {
        if value <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "value must be greater than zero".to_string(),
            ));
        }
    }

    let today = Utc::now().date_naive();
    let mut query = series_members(company_id, transaction_type, series_id);
    query = match scope {
        SeriesScope::Future => {
            query.filter(financial_transaction::Column::DueDate.gte(today))
        }
        SeriesScope::Unpaid => {
            query.filter(financial_transaction::Column::Status.eq(TransactionStatus::Pending))
        }
        SeriesScope::All => query,
        SeriesScope::Current => unreachable!("rejected above"),
    };
    if transaction_type == TransactionType::Receivable {
        query = query.filter(financial_transaction::Column::Status.ne(TransactionStatus::Paid));
    }

    let targets = query.all(db).await?;
    if targets.is_empty() {
        return Err(LedgerError::NotFound(format!(
            "series {} has no matching transactions for company {}",
            series_id, company_id
        )));
    }
    let ids: Vec<i32> = targets.iter().map(|t| t.id).collect();

    let mut patch = financial_transaction::ActiveModel {
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    if let Some(payment_method) = update.payment_method {
        patch.payment_method = Set(Some(payment_method));
    }
    if let Some(value) = update.value {
        patch.value = Set(value);
    }
    if let Some(due_date) = update.due_date {
        patch.due_date = Set(due_date);
    }
    if let Some(date_of_issue) = update.date_of_issue {
        patch.date_of_issue = Set(Some(date_of_issue));
    }
    if let Some(document_number) = update.document_number {
        patch.document_number = Set(Some(document_number));
    }
    if let Some(notes) = update.notes {
        patch.notes = Set(Some(notes));
    }
    if let Some(category_id) = update.category_id {
        patch.category_id = Set(Some(category_id));
    }

    FinancialTransaction::update_many()
        .set(patch)
        .filter(financial_transaction::Column::Id.is_in(ids.clone()))
        .exec(db)
        .await?;

    info!(
        "Updated {} transactions of series {} (scope {:?})",
        ids.len(),
        series_id,
        scope
    );

    let updated = FinancialTransaction::find()
        .filter(financial_transaction::Column::Id.is_in(ids))
        .order_by_asc(financial_transaction::Column::DueDate)
        .all(db)
        .await?;
    Ok(updated)
}

/// Deletes every occurrence the scope selects.
///
/// The `Future` boundary is asymmetric: payables due today are still
/// cancellable (`due_date >= today`), receivables due today are already in
/// collection and survive (`due_date > today`).
///
/// Settled occurrences survive under every scope; their ledger postings
/// reference them and deletion would orphan those. Reverse the settlement
/// first, then delete.
#[instrument(skip(db))]
pub async fn delete_series(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    series_id: i32,
    scope: SeriesScope,
) -> Result<SeriesDeletion> {
    if scope == SeriesScope::Current {
        return Err(LedgerError::Validation(
            "scope 'current' is not a series operation; delete the transaction directly"
                .to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let mut query = series_members(company_id, transaction_type, series_id);
    query = match scope {
        SeriesScope::Future => match transaction_type {
            TransactionType::Payable => {
                query.filter(financial_transaction::Column::DueDate.gte(today))
            }
            TransactionType::Receivable => {
                query.filter(financial_transaction::Column::DueDate.gt(today))
            }
        },
        SeriesScope::Unpaid => {
            query.filter(financial_transaction::Column::Status.eq(TransactionStatus::Pending))
        }
        SeriesScope::All => query,
        SeriesScope::Current => unreachable!("rejected above"),
    };
    // Settled rows keep their postings; never delete them out from under.
    query = query.filter(financial_transaction::Column::Status.ne(TransactionStatus::Paid));

    let targets = query.all(db).await?;
    if targets.is_empty() {
        return Err(LedgerError::NotFound(format!(
            "series {} has no matching transactions for company {}",
            series_id, company_id
        )));
    }
    let ids: Vec<i32> = targets.iter().map(|t| t.id).collect();

    let result = FinancialTransaction::delete_many()
        .filter(financial_transaction::Column::Id.is_in(ids.clone()))
        .exec(db)
        .await?;

    info!(
        "Deleted {} transactions of series {} (scope {:?})",
        result.rows_affected, series_id, scope
    );

    Ok(SeriesDeletion {
        count: result.rows_affected,
        ids,
    })
}

fn series_members(
    company_id: i32,
    transaction_type: TransactionType,
    series_id: i32,
) -> Select<FinancialTransaction> {
    FinancialTransaction::find()
        .filter(financial_transaction::Column::CompanyId.eq(company_id))
        .filter(financial_transaction::Column::TransactionType.eq(transaction_type))
        .filter(financial_transaction::Column::SeriesId.eq(series_id))
}
