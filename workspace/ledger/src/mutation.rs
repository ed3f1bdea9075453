//! Single-record maintenance: editing and deleting one transaction.
//!
//! This is the scope=current counterpart of the series operations. Settled
//! rows are immutable here; a settlement must be reversed before its row can
//! change shape again.

use chrono::{NaiveDate, Utc};
use model::entities::financial_transaction::{self, TransactionStatus, TransactionType};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, ModelTrait, Set};
use tracing::{info, instrument};

use crate::error::{LedgerError, Result};
use crate::settlement::find_scoped;

/// Allow-listed fields a single-record update may touch.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
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

impl TransactionUpdate {
    fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.payment_method.is_none()
            && self.value.is_none()
            && self.due_date.is_none()
            && self.date_of_issue.is_none()
            && self.document_number.is_none()
            && self.notes.is_none()
            && self.category_id.is_none()
            && self.counterparty_id.is_none()
    }
}

/// Applies an allow-listed update to one pending transaction.
#[instrument(skip(db, update))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    transaction_id: i32,
    update: TransactionUpdate,
) -> Result<financial_transaction::Model> {
    if update.is_empty() {
        return Err(LedgerError::Validation(
            "the update carries no fields".to_string(),
        ));
    }
    if let Some(value) = update.value {
        if value <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "value must be greater than zero".to_string(),
            ));
        }
    }
    if let Some(description) = update.description.as_deref() {
        if description.trim().is_empty() {
            return Err(LedgerError::Validation(
                "description must not be empty".to_string(),
            ));
        }
    }

    let transaction = find_scoped(db, company_id, transaction_type, transaction_id).await?;
    if transaction.status == TransactionStatus::Paid {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is settled; reverse the settlement before editing it",
            transaction_id
        )));
    }

    let mut active: financial_transaction::ActiveModel = transaction.into();
    if let Some(description) = update.description {
        active.description = Set(description);
    }
    if let Some(payment_method) = update.payment_method {
        active.payment_method = Set(Some(payment_method));
    }
    if let Some(value) = update.value {
        active.value = Set(value);
    }
    if let Some(due_date) = update.due_date {
        active.due_date = Set(due_date);
    }
    if let Some(date_of_issue) = update.date_of_issue {
        active.date_of_issue = Set(Some(date_of_issue));
    }
    if let Some(document_number) = update.document_number {
        active.document_number = Set(Some(document_number));
    }
    if let Some(notes) = update.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(category_id) = update.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(counterparty_id) = update.counterparty_id {
        active.counterparty_id = Set(Some(counterparty_id));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let updated = active.update(db).await?;
    info!("Updated transaction {}", updated.id);
    Ok(updated)
}

/// Deletes one pending transaction.
#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    transaction_id: i32,
) -> Result<()> {
    let transaction = find_scoped(db, company_id, transaction_type, transaction_id).await?;
    if transaction.status == TransactionStatus::Paid {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is settled; reverse the settlement before deleting it",
            transaction_id
        )));
    }

    transaction.delete(db).await?;
    info!("Deleted transaction {}", transaction_id);
    Ok(())
}
