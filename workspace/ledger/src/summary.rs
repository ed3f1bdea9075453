//! Aggregated dashboard view of one company's payables or receivables.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use common::summary::{DueBucket, PaymentMethodTotals, TransactionSummary};
use model::entities::financial_transaction::{self, TransactionStatus, TransactionType};
use model::entities::prelude::*;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::instrument;

use crate::error::Result;

const UNSPECIFIED_METHOD: &str = "unspecified";

/// Buckets a company's trusted transactions of one type by due date and by
/// payment method. Unvalidated and rejected rows never count.
#[instrument(skip(db))]
pub async fn transaction_summary(
    db: &DatabaseConnection,
    company_id: i32,
    transaction_type: TransactionType,
    today: NaiveDate,
) -> Result<TransactionSummary> {
    let rows = FinancialTransaction::find()
        .filter(financial_transaction::Column::CompanyId.eq(company_id))
        .filter(financial_transaction::Column::TransactionType.eq(transaction_type))
        .filter(financial_transaction::Column::Validated.eq(true))
        .filter(financial_transaction::Column::Rejected.eq(false))
        .all(db)
        .await?;

    let mut summary = TransactionSummary::default();
    let mut by_method: BTreeMap<String, (u64, Decimal)> = BTreeMap::new();

    for row in rows {
        let paid = row.status == TransactionStatus::Paid;
        let amount = if paid {
            row.paid_amount.unwrap_or(row.value)
        } else {
            row.value
        };

        let bucket = DueBucket::classify(paid, row.due_date, today);
        summary.bucket_mut(bucket).add(amount);

        let method = row
            .payment_method
            .clone()
            .unwrap_or_else(|| UNSPECIFIED_METHOD.to_string());
        let entry = by_method.entry(method).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += amount;
    }

    summary.by_payment_method = by_method
        .into_iter()
        .map(|(payment_method, (count, total))| PaymentMethodTotals {
            payment_method,
            count,
            total,
        })
        .collect();

    Ok(summary)
}
