//! Transaction creation: validation, trust defaulting, and the immediate
//! fan-out of BPO-originated recurring templates.

use chrono::{NaiveDate, Utc};
use model::entities::financial_transaction::{
    self, CreatedBySide, OccurrenceKind, TransactionStatus, TransactionType,
};
use model::entities::{company, prelude::*};
use model::recurrence::RecurrenceRule;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{info, instrument, warn};

use crate::error::{LedgerError, Outcome, Result, Warning};
use crate::recurrence::generate_series;

/// Input for creating a payable/receivable transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub company_id: i32,
    pub transaction_type: TransactionType,
    pub description: String,
    pub value: Decimal,
    pub payment_method: Option<String>,
    pub due_date: NaiveDate,
    pub date_of_issue: Option<NaiveDate>,
    pub rule: RecurrenceRule,
    pub created_by_side: CreatedBySide,
    pub counterparty_id: Option<i32>,
    pub category_id: Option<i32>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
}

/// Creates a transaction.
///
/// Trust defaults follow the originating side: BPO-side rows are implicitly
/// validated, client-side rows start in the pending-review queue. A BPO-side
/// recurring template fans out immediately; client-side templates wait for
/// explicit validation. Expansion failure never rolls back the template
/// itself; it is reported on the warning channel.
#[instrument(skip(db, new))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    new: NewTransaction,
) -> Result<Outcome<financial_transaction::Model>> {
    if new.value <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "value must be positive, got {}",
            new.value
        )));
    }
    if new.description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "description must not be empty".to_string(),
        ));
    }

    require_company(db, new.company_id).await?;

    let now = Utc::now().naive_utc();
    let trusted = new.created_by_side == CreatedBySide::BpoSide;
    let (day_of_week, day_of_month, installment_count, installment_day) =
        new.rule.column_values();

    let transaction = financial_transaction::ActiveModel {
        company_id: Set(new.company_id),
        transaction_type: Set(new.transaction_type),
        description: Set(new.description),
        value: Set(new.value),
        paid_amount: Set(None),
        payment_method: Set(new.payment_method),
        due_date: Set(new.due_date),
        date_of_issue: Set(new.date_of_issue),
        occurrence: Set(new.rule.occurrence()),
        day_of_week: Set(day_of_week),
        day_of_month: Set(day_of_month),
        installment_count: Set(installment_count),
        installment_day: Set(installment_day),
        series_id: Set(None),
        status: Set(TransactionStatus::Pending),
        payment_date: Set(None),
        financial_account_id: Set(None),
        created_by_side: Set(new.created_by_side),
        validated: Set(trusted),
        validated_at: Set(trusted.then_some(now)),
        validated_by: Set(None),
        rejected: Set(false),
        rejected_at: Set(None),
        rejected_by: Set(None),
        rejection_reason: Set(None),
        counterparty_id: Set(new.counterparty_id),
        category_id: Set(new.category_id),
        document_number: Set(new.document_number),
        notes: Set(new.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created {:?} transaction {} for company {}",
        transaction.transaction_type, transaction.id, transaction.company_id
    );

    let mut warnings = Vec::new();
    let mut result = transaction;

    if trusted && result.occurrence != OccurrenceKind::Unique {
        match generate_series(db, &result).await {
            Ok(siblings) => {
                info!(
                    "Expanded template {} into {} siblings at creation",
                    result.id,
                    siblings.len()
                );
                // Re-read the head: generation back-filled its series_id.
                if let Some(head) = FinancialTransaction::find_by_id(result.id).one(db).await? {
                    result = head;
                }
            }
            Err(e) => {
                warn!("Series expansion for template {} failed: {}", result.id, e);
                warnings.push(Warning::SeriesGenerationFailed {
                    template_id: result.id,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(Outcome::with_warnings(result, warnings))
}

/// Look up the tenant, returning NotFound for unknown ids.
pub async fn require_company(
    db: &DatabaseConnection,
    company_id: i32,
) -> Result<company::Model> {
    Company::find_by_id(company_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("company {} does not exist", company_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{new_company, setup_db};
    use chrono::NaiveDate;
    use sea_orm::{ColumnTrait, PaginatorTrait, QueryFilter};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_request(company_id: i32) -> NewTransaction {
        NewTransaction {
            company_id,
            transaction_type: TransactionType::Payable,
            description: "Office rent".to_string(),
            value: Decimal::new(120000, 2),
            payment_method: Some("bank_transfer".to_string()),
            due_date: date(2025, 2, 1),
            date_of_issue: None,
            rule: RecurrenceRule::Unique,
            created_by_side: CreatedBySide::BpoSide,
            counterparty_id: None,
            category_id: None,
            document_number: Some("INV-001".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn bpo_side_creation_is_implicitly_validated() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();

        let outcome = create_transaction(&db, base_request(company.id))
            .await
            .unwrap();
        let tx = outcome.value;

        assert!(tx.validated);
        assert!(tx.validated_at.is_some());
        assert!(!tx.rejected);
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn client_side_creation_starts_unvalidated() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();

        let mut request = base_request(company.id);
        request.created_by_side = CreatedBySide::ClientSide;

        let tx = create_transaction(&db, request).await.unwrap().value;
        assert!(!tx.validated);
        assert!(tx.validated_at.is_none());
        assert!(tx.is_pending_review());
    }

    #[tokio::test]
    async fn non_positive_value_is_rejected() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();

        let mut request = base_request(company.id);
        request.value = Decimal::ZERO;
        assert!(matches!(
            create_transaction(&db, request).await.unwrap_err(),
            LedgerError::Validation(_)
        ));

        let mut request = base_request(company.id);
        request.value = Decimal::new(-100, 2);
        assert!(matches!(
            create_transaction(&db, request).await.unwrap_err(),
            LedgerError::Validation(_)
        ));

        // Nothing was inserted.
        let count = FinancialTransaction::find().count(&db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn unknown_company_is_not_found() {
        let db = setup_db().await.unwrap();
        let err = create_transaction(&db, base_request(9999)).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn bpo_side_recurring_template_expands_immediately() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();

        let mut request = base_request(company.id);
        request.rule = RecurrenceRule::Monthly { day_of_month: 1 };

        let outcome = create_transaction(&db, request).await.unwrap();
        let head = outcome.value;
        assert!(outcome.warnings.is_empty());
        assert_eq!(head.series_id, Some(head.id));

        let siblings = FinancialTransaction::find()
            .filter(financial_transaction::Column::SeriesId.eq(head.id))
            .filter(financial_transaction::Column::Id.ne(head.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(siblings.len(), 11);
        assert!(siblings.iter().any(|s| s.due_date == date(2025, 3, 1)));
    }

    #[tokio::test]
    async fn client_side_recurring_template_does_not_expand() {
        let db = setup_db().await.unwrap();
        let company = new_company(&db).await.unwrap();

        let mut request = base_request(company.id);
        request.rule = RecurrenceRule::Monthly { day_of_month: 1 };
        request.created_by_side = CreatedBySide::ClientSide;

        let head = create_transaction(&db, request).await.unwrap().value;
        assert_eq!(head.series_id, None);

        let count = FinancialTransaction::find()
            .filter(financial_transaction::Column::SeriesId.eq(head.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
