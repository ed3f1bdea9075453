//! Settlement: flips a pending transaction to paid and posts the matching
//! cash movement.
//!
//! The status flip is an atomic conditional update (`status = Pending` in the
//! WHERE clause), so two racing settlements of the same row cannot both win.
//! The ledger posting runs after the flip; if it fails the paid status is
//! kept and the miss is reported on the warning channel rather than rolled
//! back.

use chrono::{NaiveDate, Utc};
use model::entities::cash_movement::{self, MovementType, ReferenceType};
use model::entities::financial_transaction::{
    self, TransactionStatus, TransactionType,
};
use model::entities::prelude::*;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{LedgerError, Outcome, Result, Warning};

/// Ledger descriptions are bounded; longer source text is cut.
pub const DESCRIPTION_LIMIT: usize = 140;

/// Input for settling one transaction.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub financial_account_id: i32,
    pub date: NaiveDate,
    /// Paid/received amount; defaults to the transaction's value.
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// Settles a pending transaction and posts exactly one cash movement.
#[instrument(skip(db, settlement))]
pub async fn settle(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    transaction_id: i32,
    settlement: Settlement,
) -> Result<Outcome<financial_transaction::Model>> {
    let transaction = find_scoped(db, company_id, transaction_type, transaction_id).await?;

    let amount = settlement.amount.unwrap_or(transaction.value);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "paid amount must be positive, got {}",
            amount
        )));
    }

    let account = FinancialAccount::find_by_id(settlement.financial_account_id)
        .filter(model::entities::financial_account::Column::CompanyId.eq(company_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            LedgerError::Validation(format!(
                "financial account {} does not exist for company {}",
                settlement.financial_account_id, company_id
            ))
        })?;

    let now = Utc::now().naive_utc();
    let notes = append_notes(transaction.notes.as_deref(), settlement.notes.as_deref());

    // Conditional update: only a still-pending row can flip to paid. A
    // concurrent settlement that lost the race sees zero affected rows.
    let update = FinancialTransaction::update_many()
        .set(financial_transaction::ActiveModel {
            status: Set(TransactionStatus::Paid),
            payment_date: Set(Some(settlement.date)),
            paid_amount: Set(Some(amount)),
            financial_account_id: Set(Some(account.id)),
            notes: Set(notes),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(financial_transaction::Column::Id.eq(transaction_id))
        .filter(financial_transaction::Column::CompanyId.eq(company_id))
        .filter(financial_transaction::Column::Status.eq(TransactionStatus::Pending))
        .exec(db)
        .await?;

    if update.rows_affected == 0 {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is already settled",
            transaction_id
        )));
    }

    let settled = find_scoped(db, company_id, transaction_type, transaction_id).await?;
    info!(
        "Settled transaction {} for {} on account {}",
        settled.id, amount, account.id
    );

    let description = movement_description(db, &settled).await?;
    let (movement_type, reference_type) = match transaction_type {
        TransactionType::Payable => (MovementType::Debit, ReferenceType::AccountPayment),
        TransactionType::Receivable => (MovementType::Credit, ReferenceType::AccountReceipt),
    };

    let posting = cash_movement::ActiveModel {
        company_id: Set(company_id),
        financial_account_id: Set(account.id),
        amount: Set(amount),
        movement_type: Set(movement_type),
        description: Set(description),
        reference_type: Set(reference_type),
        reference_id: Set(Some(settled.id)),
        date: Set(settlement.date),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await;

    let mut warnings = Vec::new();
    match posting {
        Ok(movement) => {
            debug!(
                "Posted cash movement {} for transaction {}",
                movement.id, settled.id
            );
        }
        Err(e) => {
            // Documented partial-failure window: the paid status stands,
            // the missing posting is reconciled later.
            warn!(
                "Ledger posting for settled transaction {} failed: {}",
                settled.id, e
            );
            warnings.push(Warning::LedgerPostingFailed {
                transaction_id: settled.id,
                reason: e.to_string(),
            });
        }
    }

    Ok(Outcome::with_warnings(settled, warnings))
}

/// Builds the posting description from counterparty name, document number
/// and notes, bounded to [`DESCRIPTION_LIMIT`].
async fn movement_description(
    db: &DatabaseConnection,
    transaction: &financial_transaction::Model,
) -> Result<String> {
    let mut parts = Vec::new();

    if let Some(counterparty_id) = transaction.counterparty_id {
        if let Some(counterparty) = Counterparty::find_by_id(counterparty_id).one(db).await? {
            parts.push(counterparty.name);
        }
    }
    if parts.is_empty() {
        parts.push(transaction.description.clone());
    }
    if let Some(document) = &transaction.document_number {
        parts.push(document.clone());
    }
    if let Some(notes) = &transaction.notes {
        parts.push(notes.clone());
    }

    let mut description = parts.join(" - ");
    if description.len() > DESCRIPTION_LIMIT {
        description = description
            .chars()
            .take(DESCRIPTION_LIMIT)
            .collect::<String>();
    }
    Ok(description)
}

/// New notes are appended to what is already there, never overwriting it.
fn append_notes(existing: Option<&str>, incoming: Option<&str>) -> Option<String> {
    match (existing, incoming) {
        (Some(old), Some(new)) if !new.trim().is_empty() => {
            Some(format!("{}\n{}", old, new))
        }
        (None, Some(new)) if !new.trim().is_empty() => Some(new.to_string()),
        (old, _) => old.map(str::to_string),
    }
}

/// Fetches a transaction scoped by company and type.
pub(crate) async fn find_scoped(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    transaction_id: i32,
) -> Result<financial_transaction::Model> {
    FinancialTransaction::find_by_id(transaction_id)
        .filter(financial_transaction::Column::CompanyId.eq(company_id))
        .filter(financial_transaction::Column::TransactionType.eq(transaction_type))
        .one(db)
        .await?
        .ok_or_else(|| {
            LedgerError::NotFound(format!(
                "{:?} transaction {} does not exist for company {}",
                transaction_type, transaction_id, company_id
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        new_account, new_company, new_counterparty, new_template, setup_db, TemplateSpec,
    };
    use sea_orm::{ConnectionTrait, PaginatorTrait};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settlement(account_id: i32) -> Settlement {
        Settlement {
            financial_account_id: account_id,
            date: date(2025, 2, 1),
            amount: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn settling_a_payable_posts_one_debit() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();
        let account = new_account(&db, &company).await.unwrap();
        let supplier = new_counterparty(&db, &company, "Office Landlord")
            .await
            .unwrap();
        let tx = new_template(
            &db,
            &company,
            TemplateSpec::payable(Decimal::new(30000, 2), date(2025, 2, 1))
                .counterparty(supplier.id)
                .document("NF-42"),
        )
        .await
        .unwrap();

        let outcome = settle(
            &db,
            company.id,
            TransactionType::Payable,
            tx.id,
            Settlement {
                amount: Some(Decimal::new(30000, 2)),
                ..settlement(account.id)
            },
        )
        .await
        .unwrap();

        let settled = outcome.value;
        assert!(outcome.warnings.is_empty());
        assert_eq!(settled.status, TransactionStatus::Paid);
        assert_eq!(settled.paid_amount, Some(Decimal::new(30000, 2)));
        assert_eq!(settled.payment_date, Some(date(2025, 2, 1)));
        assert_eq!(settled.financial_account_id, Some(account.id));

        let movements = CashMovement::find()
            .filter(cash_movement::Column::ReferenceId.eq(tx.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
        let movement = &movements[0];
        assert_eq!(movement.movement_type, MovementType::Debit);
        assert_eq!(movement.reference_type, ReferenceType::AccountPayment);
        assert_eq!(movement.amount, Decimal::new(30000, 2));
        assert_eq!(movement.financial_account_id, account.id);
        assert!(movement.description.starts_with("Office Landlord"));
        assert!(movement.description.contains("NF-42"));
    }

    #[tokio::test]
    async fn settling_a_receivable_posts_one_credit() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();
        let account = new_account(&db, &company).await.unwrap();
        let tx = new_template(
            &db,
            &company,
            TemplateSpec::receivable(Decimal::new(50000, 2), date(2025, 3, 10)),
        )
        .await
        .unwrap();

        let settled = settle(
            &db,
            company.id,
            TransactionType::Receivable,
            tx.id,
            settlement(account.id),
        )
        .await
        .unwrap()
        .value;

        // Amount defaults to the transaction value.
        assert_eq!(settled.paid_amount, Some(Decimal::new(50000, 2)));

        let movement = CashMovement::find()
            .filter(cash_movement::Column::ReferenceId.eq(tx.id))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(movement.movement_type, MovementType::Credit);
        assert_eq!(movement.reference_type, ReferenceType::AccountReceipt);
    }

    #[tokio::test]
    async fn double_settlement_is_rejected_without_new_posting() {
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
            settlement(account.id),
        )
        .await
        .unwrap();

        let err = settle(
            &db,
            company.id,
            TransactionType::Payable,
            tx.id,
            settlement(account.id),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvariantViolation(_)));

        let count = CashMovement::find()
            .filter(cash_movement::Column::ReferenceId.eq(tx.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn settlement_is_scoped_by_type_and_company() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();
        let other = new_company(&db).await.unwrap();
        let account = new_account(&db, &company).await.unwrap();
        let tx = new_template(
            &db,
            &company,
            TemplateSpec::payable(Decimal::new(30000, 2), date(2025, 2, 1)),
        )
        .await
        .unwrap();

        // Wrong type.
        let err = settle(
            &db,
            company.id,
            TransactionType::Receivable,
            tx.id,
            settlement(account.id),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        // Wrong tenant.
        let err = settle(
            &db,
            other.id,
            TransactionType::Payable,
            tx.id,
            settlement(account.id),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn settlement_notes_are_appended_not_overwritten() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();
        let account = new_account(&db, &company).await.unwrap();
        let tx = new_template(
            &db,
            &company,
            TemplateSpec::payable(Decimal::new(30000, 2), date(2025, 2, 1))
                .notes("agreed by phone"),
        )
        .await
        .unwrap();

        let settled = settle(
            &db,
            company.id,
            TransactionType::Payable,
            tx.id,
            Settlement {
                notes: Some("paid in cash".to_string()),
                ..settlement(account.id)
            },
        )
        .await
        .unwrap()
        .value;

        let notes = settled.notes.unwrap();
        assert!(notes.contains("agreed by phone"));
        assert!(notes.contains("paid in cash"));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected_before_mutation() {
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

        let err = settle(
            &db,
            company.id,
            TransactionType::Payable,
            tx.id,
            Settlement {
                amount: Some(Decimal::ZERO),
                ..settlement(account.id)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let unchanged = FinancialTransaction::find_by_id(tx.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn failed_posting_keeps_paid_status_and_reports_warning() {
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

        // Break the ledger table so the posting step fails after the flip.
        db.execute_unprepared("DROP TABLE cash_movements;")
            .await
            .unwrap();

        let outcome = settle(
            &db,
            company.id,
            TransactionType::Payable,
            tx.id,
            settlement(account.id),
        )
        .await
        .unwrap();

        assert_eq!(outcome.value.status, TransactionStatus::Paid);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            outcome.warnings[0],
            Warning::LedgerPostingFailed { transaction_id, .. } if transaction_id == tx.id
        ));
    }

    #[test]
    fn append_notes_cases() {
        assert_eq!(append_notes(None, None), None);
        assert_eq!(append_notes(Some("old"), None), Some("old".to_string()));
        assert_eq!(append_notes(None, Some("new")), Some("new".to_string()));
        assert_eq!(
            append_notes(Some("old"), Some("new")),
            Some("old\nnew".to_string())
        );
        // Blank incoming notes leave the old text untouched.
        assert_eq!(append_notes(Some("old"), Some("  ")), Some("old".to_string()));
    }
}
