//! Series expansion: turns one validated recurring template into the
//! concrete sibling transactions of its series.

use chrono::Utc;
use model::entities::financial_transaction::{self, OccurrenceKind, TransactionStatus};
use model::recurrence::RecurrenceRule;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use tracing::{debug, info, instrument};

use crate::error::{LedgerError, Result};

/// Open-ended weekly templates expand to one year of occurrences
/// (the template plus 51 siblings).
pub const WEEKLY_HORIZON: u32 = 52;

/// Open-ended monthly templates expand to one year of occurrences
/// (the template plus 11 siblings).
pub const MONTHLY_HORIZON: u32 = 12;

/// Expands a validated template into its series siblings.
///
/// The template counts as the first occurrence; every generated sibling
/// copies the template's financial and classification fields, gets a
/// `Pending` status and shares `series_id = template.id` (back-filled onto
/// the template row as well).
///
/// Unvalidated templates are refused outright: client-submitted records must
/// never fan out into trusted-looking rows before an operator validated them.
#[instrument(skip(db, template), fields(template_id = template.id))]
pub async fn generate_series(
    db: &DatabaseConnection,
    template: &financial_transaction::Model,
) -> Result<Vec<financial_transaction::Model>> {
    if !template.is_trusted() {
        return Err(LedgerError::InvariantViolation(format!(
            "transaction {} is not validated; refusing to expand its series",
            template.id
        )));
    }

    let rule = RecurrenceRule::from_row(template).map_err(LedgerError::Validation)?;
    if rule.occurrence() == OccurrenceKind::Unique {
        debug!("Template {} is unique; nothing to generate", template.id);
        return Ok(Vec::new());
    }

    // A second validate call on the same head must not double-expand.
    let existing_siblings = financial_transaction::Entity::find()
        .filter(financial_transaction::Column::SeriesId.eq(template.id))
        .filter(financial_transaction::Column::Id.ne(template.id))
        .count(db)
        .await?;
    if existing_siblings > 0 {
        return Err(LedgerError::InvariantViolation(format!(
            "series {} already has {} generated transactions",
            template.id, existing_siblings
        )));
    }

    let sibling_count = match rule {
        RecurrenceRule::Weekly { .. } => WEEKLY_HORIZON - 1,
        RecurrenceRule::Monthly { .. } => MONTHLY_HORIZON - 1,
        RecurrenceRule::Installments { count, .. } => count - 1,
        RecurrenceRule::Unique => unreachable!("handled above"),
    };

    let now = Utc::now().naive_utc();

    // Stamp the template as the head of its own series first, so the series
    // is queryable as a whole even if sibling inserts fail midway.
    let mut head: financial_transaction::ActiveModel = template.clone().into();
    head.series_id = Set(Some(template.id));
    head.updated_at = Set(now);
    head.update(db).await?;

    let mut siblings = Vec::with_capacity(sibling_count as usize);
    for n in 1..=sibling_count {
        let due_date = match rule.nth_due_date(template.due_date, n) {
            Some(date) => date,
            None => continue,
        };

        let description = match rule {
            RecurrenceRule::Installments { count, .. } => {
                format!("{} ({}/{})", template.description, n + 1, count)
            }
            _ => template.description.clone(),
        };

        let sibling = financial_transaction::ActiveModel {
            company_id: Set(template.company_id),
            transaction_type: Set(template.transaction_type),
            description: Set(description),
            value: Set(template.value),
            paid_amount: Set(None),
            payment_method: Set(template.payment_method.clone()),
            due_date: Set(due_date),
            date_of_issue: Set(template.date_of_issue),
            occurrence: Set(template.occurrence),
            day_of_week: Set(template.day_of_week),
            day_of_month: Set(template.day_of_month),
            installment_count: Set(template.installment_count),
            installment_day: Set(template.installment_day),
            series_id: Set(Some(template.id)),
            status: Set(TransactionStatus::Pending),
            payment_date: Set(None),
            financial_account_id: Set(None),
            created_by_side: Set(template.created_by_side),
            validated: Set(template.validated),
            validated_at: Set(template.validated_at),
            validated_by: Set(template.validated_by.clone()),
            rejected: Set(false),
            rejected_at: Set(None),
            rejected_by: Set(None),
            rejection_reason: Set(None),
            counterparty_id: Set(template.counterparty_id),
            category_id: Set(template.category_id),
            document_number: Set(template.document_number.clone()),
            notes: Set(template.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        siblings.push(sibling);
    }

    info!(
        "Generated {} transactions for series {}",
        siblings.len(),
        template.id
    );
    Ok(siblings)
}
