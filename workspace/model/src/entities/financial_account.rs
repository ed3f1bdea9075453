use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

use super::company;

/// A cash/bank account money is paid from or received into.
/// Its balance is derived from cash movements, never stored.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    /// Free-form kind label (checking, savings, cash, ...).
    pub account_type: Option<String>,
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
    #[sea_orm(has_many = "super::cash_movement::Entity")]
    CashMovement,
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::cash_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashMovement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
