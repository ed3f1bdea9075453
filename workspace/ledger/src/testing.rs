//! Shared fixtures for the engine tests: an in-memory database plus
//! builders for the handful of rows most scenarios need.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};

use model::entities::{
    cash_movement, company, counterparty, financial_account, financial_transaction,
};
use model::entities::financial_transaction::{
    CreatedBySide, OccurrenceKind, TransactionStatus, TransactionType,
};

pub type Result<T> = std::result::Result<T, DbErr>;

pub async fn setup_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

pub async fn new_company(db: &DatabaseConnection) -> Result<company::Model> {
    static COMPANY_ID: AtomicU64 = AtomicU64::new(0);
    let current = COMPANY_ID.fetch_add(1, Ordering::SeqCst);

    company::ActiveModel {
        name: Set(format!("Test company {}", current)),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_account(
    db: &DatabaseConnection,
    company: &company::Model,
) -> Result<financial_account::Model> {
    static ACCOUNT_ID: AtomicU64 = AtomicU64::new(0);
    let current = ACCOUNT_ID.fetch_add(1, Ordering::SeqCst);

    financial_account::ActiveModel {
        company_id: Set(company.id),
        name: Set(format!("Test account {}", current)),
        account_type: Set(Some("checking".to_string())),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_counterparty(
    db: &DatabaseConnection,
    company: &company::Model,
    name: &str,
) -> Result<counterparty::Model> {
    counterparty::ActiveModel {
        company_id: Set(company.id),
        name: Set(name.to_string()),
        kind: Set(counterparty::CounterpartyKind::Both),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Builder for a transaction row inserted straight into the store, bypassing
/// the creation path (tests that exercise creation call the engine instead).
pub struct TemplateSpec {
    pub transaction_type: TransactionType,
    pub value: Decimal,
    pub due_date: NaiveDate,
    pub occurrence: OccurrenceKind,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub installment_count: Option<i32>,
    pub installment_day: Option<i16>,
    pub side: CreatedBySide,
    pub description: String,
    pub counterparty_id: Option<i32>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
}

impl TemplateSpec {
    pub fn payable(value: Decimal, due_date: NaiveDate) -> Self {
        Self::new(TransactionType::Payable, value, due_date)
    }

    pub fn receivable(value: Decimal, due_date: NaiveDate) -> Self {
        Self::new(TransactionType::Receivable, value, due_date)
    }

    fn new(transaction_type: TransactionType, value: Decimal, due_date: NaiveDate) -> Self {
        Self {
            transaction_type,
            value,
            due_date,
            occurrence: OccurrenceKind::Unique,
            day_of_week: None,
            day_of_month: None,
            installment_count: None,
            installment_day: None,
            side: CreatedBySide::BpoSide,
            description: "Test transaction".to_string(),
            counterparty_id: None,
            document_number: None,
            notes: None,
        }
    }

    pub fn weekly(mut self, day_of_week: i16) -> Self {
        self.occurrence = OccurrenceKind::Weekly;
        self.day_of_week = Some(day_of_week);
        self
    }

    pub fn monthly(mut self, day_of_month: i16) -> Self {
        self.occurrence = OccurrenceKind::Monthly;
        self.day_of_month = Some(day_of_month);
        self
    }

    pub fn installments(mut self, count: i32, anchor_day: i16) -> Self {
        self.occurrence = OccurrenceKind::Installments;
        self.installment_count = Some(count);
        self.installment_day = Some(anchor_day);
        self
    }

    pub fn side(mut self, side: CreatedBySide) -> Self {
        self.side = side;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn counterparty(mut self, id: i32) -> Self {
        self.counterparty_id = Some(id);
        self
    }

    pub fn document(mut self, number: &str) -> Self {
        self.document_number = Some(number.to_string());
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

/// Inserts a transaction row; BPO-side rows come out validated,
/// client-side rows come out in the pending-review state.
pub async fn new_template(
    db: &DatabaseConnection,
    company: &company::Model,
    spec: TemplateSpec,
) -> Result<financial_transaction::Model> {
    let now = Utc::now().naive_utc();
    let trusted = spec.side == CreatedBySide::BpoSide;

    financial_transaction::ActiveModel {
        company_id: Set(company.id),
        transaction_type: Set(spec.transaction_type),
        description: Set(spec.description),
        value: Set(spec.value),
        due_date: Set(spec.due_date),
        occurrence: Set(spec.occurrence),
        day_of_week: Set(spec.day_of_week),
        day_of_month: Set(spec.day_of_month),
        installment_count: Set(spec.installment_count),
        installment_day: Set(spec.installment_day),
        status: Set(TransactionStatus::Pending),
        created_by_side: Set(spec.side),
        validated: Set(trusted),
        validated_at: Set(trusted.then_some(now)),
        rejected: Set(false),
        counterparty_id: Set(spec.counterparty_id),
        document_number: Set(spec.document_number),
        notes: Set(spec.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_movement(
    db: &DatabaseConnection,
    company: &company::Model,
    account: &financial_account::Model,
    amount: Decimal,
    movement_type: cash_movement::MovementType,
    date: NaiveDate,
) -> Result<cash_movement::Model> {
    cash_movement::ActiveModel {
        company_id: Set(company.id),
        financial_account_id: Set(account.id),
        amount: Set(amount),
        movement_type: Set(movement_type),
        description: Set("Test movement".to_string()),
        reference_type: Set(cash_movement::ReferenceType::ManualAdjustment),
        reference_id: Set(None),
        date: Set(date),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}
