use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{company, financial_account};

/// Direction of a ledger posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum MovementType {
    #[sea_orm(string_value = "Credit")]
    Credit,
    #[sea_orm(string_value = "Debit")]
    Debit,
}

/// What produced the posting. Settlement postings carry the originating
/// transaction id in `reference_id`; manual adjustments carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ReferenceType {
    #[sea_orm(string_value = "AccountPayment")]
    AccountPayment,
    #[sea_orm(string_value = "AccountReceipt")]
    AccountReceipt,
    #[sea_orm(string_value = "ManualAdjustment")]
    ManualAdjustment,
}

/// One ledger posting against a cash/bank account.
///
/// For every settled transaction there is at most one posting with a
/// settlement reference type and `reference_id` equal to the transaction id;
/// reversal removes exactly that set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub company_id: i32,
    pub financial_account_id: i32,

    /// Posted amount. Always strictly positive; direction is `movement_type`.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,

    pub movement_type: MovementType,
    pub description: String,

    pub reference_type: ReferenceType,
    pub reference_id: Option<i32>,

    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
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
        on_delete = "Cascade"
    )]
    FinancialAccount,
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<financial_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
