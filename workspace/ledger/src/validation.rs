//! Dual-control validation workflow: the trust gate for client-submitted
//! transactions. An operator either validates a record (making it trusted
//! fact, and expanding its series if it is a recurring head) or rejects it
//! terminally with a reason.

use chrono::Utc;
use model::entities::financial_transaction::{self, CreatedBySide, OccurrenceKind};
use model::entities::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, instrument, warn};

use crate::error::{LedgerError, Outcome, Result, Warning};
use crate::recurrence::generate_series;

/// Validates a client-submitted transaction.
///
/// Only client-side, unvalidated, non-rejected rows can be validated. When
/// the row is the head of a recurring series, expansion runs synchronously as
/// part of validation; expansion failure does not undo the validation and is
/// reported on the warning channel.
#[instrument(skip(db))]
pub async fn validate_transaction(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_id: i32,
    validated_by: &str,
    category_override: Option<i32>,
) -> Result<Outcome<(financial_transaction::Model, Vec<financial_transaction::Model>)>> {
    let transaction = find_for_review(db, company_id, transaction_id).await?;

    if transaction.rejected {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} was rejected and cannot be validated",
            transaction_id
        )));
    }
    if transaction.validated {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is already validated",
            transaction_id
        )));
    }
    if transaction.created_by_side != CreatedBySide::ClientSide {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} was created by the back office and needs no validation",
            transaction_id
        )));
    }

    let now = Utc::now().naive_utc();
    let mut active: financial_transaction::ActiveModel = transaction.into();
    active.validated = Set(true);
    active.validated_at = Set(Some(now));
    active.validated_by = Set(Some(validated_by.to_string()));
    if let Some(category_id) = category_override {
        active.category_id = Set(Some(category_id));
    }
    active.updated_at = Set(now);
    let validated = active.update(db).await?;

    info!(
        "Transaction {} validated by {}",
        validated.id, validated_by
    );

    let mut warnings = Vec::new();
    let mut siblings = Vec::new();
    let mut head = validated;

    if head.occurrence != OccurrenceKind::Unique {
        match generate_series(db, &head).await {
            Ok(generated) => {
                siblings = generated;
                // Expansion back-filled the head's series_id.
                if let Some(fresh) = FinancialTransaction::find_by_id(head.id).one(db).await? {
                    head = fresh;
                }
            }
            Err(e) => {
                warn!(
                    "Series expansion after validating transaction {} failed: {}",
                    head.id, e
                );
                warnings.push(Warning::SeriesGenerationFailed {
                    template_id: head.id,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(Outcome::with_warnings((head, siblings), warnings))
}

/// Rejects a client-submitted transaction. Terminal: a rejected row can
/// never be validated or re-rejected.
#[instrument(skip(db, reason))]
pub async fn reject_transaction(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_id: i32,
    rejected_by: &str,
    reason: &str,
) -> Result<financial_transaction::Model> {
    if reason.trim().is_empty() {
        return Err(LedgerError::Validation(
            "a rejection reason is mandatory".to_string(),
        ));
    }

    let transaction = find_for_review(db, company_id, transaction_id).await?;

    if transaction.rejected {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is already rejected",
            transaction_id
        )));
    }
    if transaction.validated {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is already validated and cannot be rejected",
            transaction_id
        )));
    }

    let now = Utc::now().naive_utc();
    let mut active: financial_transaction::ActiveModel = transaction.into();
    active.rejected = Set(true);
    active.rejected_at = Set(Some(now));
    active.rejected_by = Set(Some(rejected_by.to_string()));
    active.rejection_reason = Set(Some(reason.to_string()));
    active.updated_at = Set(now);
    let rejected = active.update(db).await?;

    info!("Transaction {} rejected by {}", rejected.id, rejected_by);
    Ok(rejected)
}

/// Guard used by the client-facing update/delete paths: a client-side row is
/// editable by its originator only while it is neither validated nor
/// rejected. Validated rows are read-only to the client side.
pub fn ensure_client_editable(transaction: &financial_transaction::Model) -> Result<()> {
    if transaction.validated {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is validated and read-only for the client side",
            transaction.id
        )));
    }
    if transaction.rejected {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} was rejected and can no longer be edited",
            transaction.id
        )));
    }
    Ok(())
}

async fn find_for_review(
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
