//! Settlement reversal: the exact inverse of settlement. Removes the posted
//! cash movement(s) and returns the transaction to pending.

use chrono::Utc;
use model::entities::cash_movement::{self, ReferenceType};
use model::entities::financial_transaction::{self, TransactionStatus, TransactionType};
use model::entities::prelude::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, instrument, warn};

use crate::error::{LedgerError, Outcome, Result, Warning};
use crate::settlement::find_scoped;

/// Reverses a settled transaction.
///
/// Ledger deletion is attempted first; if it fails the status reset still
/// proceeds and the dangling entries are reported on the warning channel, so
/// the row never gets stuck in `Paid` with no way to retry. Reversing a
/// pending row is rejected outright to surface caller bugs.
#[instrument(skip(db))]
pub async fn reverse_settlement(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    transaction_id: i32,
) -> Result<Outcome<financial_transaction::Model>> {
    let transaction = find_scoped(db, company_id, transaction_type, transaction_id).await?;

    if transaction.status != TransactionStatus::Paid {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is not settled; nothing to reverse",
            transaction_id
        )));
    }

    let reference_type = match transaction_type {
        TransactionType::Payable => ReferenceType::AccountPayment,
        TransactionType::Receivable => ReferenceType::AccountReceipt,
    };

    let mut warnings = Vec::new();
    let deleted = CashMovement::delete_many()
        .filter(cash_movement::Column::CompanyId.eq(company_id))
        .filter(cash_movement::Column::ReferenceType.eq(reference_type))
        .filter(cash_movement::Column::ReferenceId.eq(transaction_id))
        .exec(db)
        .await;

    match deleted {
        Ok(result) => {
            info!(
                "Deleted {} ledger entries for reversed transaction {}",
                result.rows_affected, transaction_id
            );
        }
        Err(e) => {
            // Best effort: the reset below still runs so reversal stays
            // retryable; the leftover postings are reported, not hidden.
            warn!(
                "Could not delete ledger entries for transaction {}: {}",
                transaction_id, e
            );
            warnings.push(Warning::DanglingLedgerEntries {
                transaction_id,
                reason: e.to_string(),
            });
        }
    }

    // Conditional reset mirrors settlement: only a paid row flips back.
    let update = FinancialTransaction::update_many()
        .set(financial_transaction::ActiveModel {
            status: Set(TransactionStatus::Pending),
            payment_date: Set(None),
            paid_amount: Set(None),
            financial_account_id: Set(None),
            updated_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        })
        .filter(financial_transaction::Column::Id.eq(transaction_id))
        .filter(financial_transaction::Column::CompanyId.eq(company_id))
        .filter(financial_transaction::Column::Status.eq(TransactionStatus::Paid))
        .exec(db)
        .await?;

    if update.rows_affected == 0 {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} was reversed concurrently",
            transaction_id
        )));
    }

    let reversed = find_scoped(db, company_id, transaction_type, transaction_id).await?;
    info!("Reversed settlement of transaction {}", reversed.id);
    Ok(Outcome::with_warnings(reversed, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::{settle, Settlement};
    use crate::testing::{new_account, new_company, new_template, setup_db, TemplateSpec};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sea_orm::PaginatorTrait;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn settle_then_reverse_roundtrips_to_pre_settlement_state() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();
        let account = new_account(&db, &company).await.unwrap();
        let tx = new_template(
            &db,
            &company,
            TemplateSpec::payable(Decimal::new(30000, 2), date(2025, 2, 1)),
        )
        .await
        .unwrap();

        settle(
            &db,
            company.id,
            TransactionType::Payable,
            tx.id,
            Settlement {
                financial_account_id: account.id,
                date: date(2025, 2, 1),
                amount: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        let outcome = reverse_settlement(&db, company.id, TransactionType::Payable, tx.id)
            .await
            .unwrap();
        let reversed = outcome.value;
        assert!(outcome.warnings.is_empty());

        // Back to the pre-settlement field values.
        assert_eq!(reversed.status, TransactionStatus::Pending);
        assert_eq!(reversed.paid_amount, None);
        assert_eq!(reversed.payment_date, None);
        assert_eq!(reversed.financial_account_id, None);
        assert_eq!(reversed.value, tx.value);
        assert_eq!(reversed.due_date, tx.due_date);

        // Zero ledger rows reference the transaction.
        let count = CashMovement::find()
            .filter(cash_movement::Column::ReferenceId.eq(tx.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn reversing_a_pending_transaction_is_rejected() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();
        let tx = new_template(
            &db,
            &company,
            TemplateSpec::payable(Decimal::new(30000, 2), date(2025, 2, 1)),
        )
        .await
        .unwrap();

        let err = reverse_settlement(&db, company.id, TransactionType::Payable, tx.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn reversal_only_deletes_the_settlement_postings() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();
        let account = new_account(&db, &company).await.unwrap();
        let tx = new_template(
            &db,
            &company,
            TemplateSpec::receivable(Decimal::new(50000, 2), date(2025, 3, 1)),
        )
        .await
        .unwrap();

        // Unrelated manual adjustment on the same account.
        crate::testing::new_movement(
            &db,
            &company,
            &account,
            Decimal::new(9900, 2),
            cash_movement::MovementType::Credit,
            date(2025, 1, 1),
        )
        .await
        .unwrap();

        settle(
            &db,
            company.id,
            TransactionType::Receivable,
            tx.id,
            Settlement {
                financial_account_id: account.id,
                date: date(2025, 3, 1),
                amount: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        reverse_settlement(&db, company.id, TransactionType::Receivable, tx.id)
            .await
            .unwrap();

        // The manual adjustment survives.
        let remaining = CashMovement::find().all(&db).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(
            remaining[0].reference_type,
            ReferenceType::ManualAdjustment
        );
    }

    #[tokio::test]
    async fn reversal_of_missing_transaction_is_not_found() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();

        let err = reverse_settlement(&db, company.id, TransactionType::Payable, 424242)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}
