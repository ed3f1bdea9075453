use sea_orm::entity::prelude::*;

/// A tenant. All financial data is scoped to one company.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::financial_transaction::Entity")]
    FinancialTransaction,
    #[sea_orm(has_many = "super::cash_movement::Entity")]
    CashMovement,
    #[sea_orm(has_many = "super::financial_account::Entity")]
    FinancialAccount,
}

impl Related<super::financial_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialTransaction.def()
    }
}

impl Related<super::financial_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
