//! Account balance queries and manual balance adjustment.
//!
//! A balance is never stored; it is always the sum of credits minus the sum
//! of debits over the account's cash movements.

use chrono::{NaiveDate, Utc};
use model::entities::cash_movement::{self, MovementType, ReferenceType};
use model::entities::prelude::*;
use model::entities::financial_account;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};

use crate::error::{LedgerError, Result};

/// Differences below one cent are treated as already balanced.
const ADJUSTMENT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Sum of credits minus sum of debits for one account.
#[instrument(skip(db))]
pub async fn account_balance(
    db: &DatabaseConnection,
    company_id: i32,
    account_id: i32,
) -> Result<Decimal> {
    require_account(db, company_id, account_id).await?;

    let movements = CashMovement::find()
        .filter(cash_movement::Column::CompanyId.eq(company_id))
        .filter(cash_movement::Column::FinancialAccountId.eq(account_id))
        .all(db)
        .await?;

    let balance = movements.iter().fold(Decimal::ZERO, |acc, m| {
        match m.movement_type {
            MovementType::Credit => acc + m.amount,
            MovementType::Debit => acc - m.amount,
        }
    });
    Ok(balance)
}

/// Forces the account balance to `target_balance` by posting a single
/// manual adjustment movement for the difference.
///
/// Returns `Ok(None)` without posting when the account is already within
/// one cent of the target.
#[instrument(skip(db))]
pub async fn adjust_account_balance(
    db: &DatabaseConnection,
    company_id: i32,
    account_id: i32,
    target_balance: Decimal,
    date: NaiveDate,
) -> Result<Option<cash_movement::Model>> {
    let current = account_balance(db, company_id, account_id).await?;
    let delta = target_balance - current;

    if delta.abs() < ADJUSTMENT_EPSILON {
        return Ok(None);
    }

    let movement_type = if delta > Decimal::ZERO {
        MovementType::Credit
    } else {
        MovementType::Debit
    };

    let movement = cash_movement::ActiveModel {
        company_id: Set(company_id),
        financial_account_id: Set(account_id),
        amount: Set(delta.abs()),
        movement_type: Set(movement_type),
        description: Set(format!(
            "Balance adjustment to {} (was {})",
            target_balance, current
        )),
        reference_type: Set(ReferenceType::ManualAdjustment),
        reference_id: Set(None),
        date: Set(date),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Posted {:?} adjustment of {} on account {}",
        movement.movement_type, movement.amount, account_id
    );
    Ok(Some(movement))
}

/// Lists cash movements for a company, optionally narrowed to one account
/// and a date range. Newest first.
#[instrument(skip(db))]
pub async fn list_cash_movements(
    db: &DatabaseConnection,
    company_id: i32,
    account_id: Option<i32>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<cash_movement::Model>> {
    let mut query = CashMovement::find()
        .filter(cash_movement::Column::CompanyId.eq(company_id));
    if let Some(account_id) = account_id {
        query = query.filter(cash_movement::Column::FinancialAccountId.eq(account_id));
    }
    if let Some(from) = from {
        query = query.filter(cash_movement::Column::Date.gte(from));
    }
    if let Some(to) = to {
        query = query.filter(cash_movement::Column::Date.lte(to));
    }
    let movements = query
        .order_by_desc(cash_movement::Column::Date)
        .order_by_desc(cash_movement::Column::Id)
        .all(db)
        .await?;
    Ok(movements)
}

async fn require_account(
    db: &DatabaseConnection,
    company_id: i32,
    account_id: i32,
) -> Result<financial_account::Model> {
    FinancialAccount::find_by_id(account_id)
        .filter(financial_account::Column::CompanyId.eq(company_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            LedgerError::NotFound(format!(
                "account {} does not exist for company {}",
                account_id, company_id
            ))
        })
}
