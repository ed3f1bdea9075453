use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{category, company, counterparty, financial_account};

/// Classification of a transaction: money the company owes or money it is owed.
/// Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(12))")]
pub enum TransactionType {
    #[sea_orm(string_value = "Payable")]
    Payable,
    #[sea_orm(string_value = "Receivable")]
    Receivable,
}

/// Settlement status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "Pending")]
    Pending, // Not yet paid/received.
    #[sea_orm(string_value = "Paid")]
    Paid, // Settled; carries payment_date, paid_amount and the ledger account.
}

/// How the transaction repeats. The recurrence config columns are interpreted
/// according to this tag; see `crate::recurrence::RecurrenceRule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(12))")]
pub enum OccurrenceKind {
    #[sea_orm(string_value = "Unique")]
    Unique,
    #[sea_orm(string_value = "Weekly")]
    Weekly,
    #[sea_orm(string_value = "Monthly")]
    Monthly,
    #[sea_orm(string_value = "Installments")]
    Installments,
}

/// Which side of the dual-control workflow created the record.
/// Client-side records start untrusted and must be validated by a
/// back-office operator before they drive reporting or series expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum CreatedBySide {
    #[sea_orm(string_value = "ClientSide")]
    ClientSide,
    #[sea_orm(string_value = "BpoSide")]
    BpoSide,
}

/// The unified payable/receivable record.
///
/// One row is one money obligation, due once. Rows generated from a recurring
/// template share the template's id in `series_id`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Tenant scope. Every read and write must filter on this.
    pub company_id: i32,

    pub transaction_type: TransactionType,

    pub description: String,

    /// The amount owed. Always strictly positive.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub value: Decimal,

    /// The amount actually paid/received. Set if and only if status is Paid.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub paid_amount: Option<Decimal>,

    pub payment_method: Option<String>,

    pub due_date: NaiveDate,
    pub date_of_issue: Option<NaiveDate>,

    /// Recurrence tag; the four columns below are its config.
    pub occurrence: OccurrenceKind,
    /// Weekly only: 0 = Monday .. 6 = Sunday.
    pub day_of_week: Option<i16>,
    /// Monthly only: 1..=31, clamped to month end when generating.
    pub day_of_month: Option<i16>,
    /// Installments only: total number of installments including the template.
    pub installment_count: Option<i32>,
    /// Installments only: anchor day of month for each installment.
    pub installment_day: Option<i16>,

    /// Shared by all rows generated from one recurring template (the
    /// template's own id). Null for standalone transactions.
    pub series_id: Option<i32>,

    pub status: TransactionStatus,
    pub payment_date: Option<NaiveDate>,
    /// Which cash/bank account the settlement moved money through.
    pub financial_account_id: Option<i32>,

    pub created_by_side: CreatedBySide,

    /// Trust flag. BPO-side rows start validated; client-side rows start
    /// unvalidated and must pass the dual-control step.
    pub validated: bool,
    pub validated_at: Option<NaiveDateTime>,
    pub validated_by: Option<String>,

    /// Terminal rejection. Mutually exclusive with `validated`.
    pub rejected: bool,
    pub rejected_at: Option<NaiveDateTime>,
    pub rejected_by: Option<String>,
    pub rejection_reason: Option<String>,

    pub counterparty_id: Option<i32>,
    pub category_id: Option<i32>,

    pub document_number: Option<String>,
    pub notes: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "company::Entity",
        from = "Column::CompanyId",
        to = "company::Column::Id",
        on_delete = "Cascade"
    )]
    Company,
    #[sea_orm(
        belongs_to = "financial_account::Entity",
        from = "Column::FinancialAccountId",
        to = "financial_account::Column::Id",
        on_delete = "SetNull"
    )]
    FinancialAccount,
    #[sea_orm(
        belongs_to = "counterparty::Entity",
        from = "Column::CounterpartyId",
        to = "counterparty::Column::Id",
        on_delete = "SetNull"
    )]
    Counterparty,
    #[sea_orm(
        belongs_to = "category::Entity",
        from = "Column::CategoryId",
        to = "category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<counterparty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counterparty.def()
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the row counts as trusted fact for reporting and expansion.
    pub fn is_trusted(&self) -> bool {
        self.validated && !self.rejected
    }

    /// Whether the row still sits in the client-side pending-review queue.
    pub fn is_pending_review(&self) -> bool {
        self.created_by_side == CreatedBySide::ClientSide && !self.validated && !self.rejected
    }
}
