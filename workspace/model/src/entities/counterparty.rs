use sea_orm::entity::prelude::*;

use super::company;

/// Role a counterparty plays towards the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum CounterpartyKind {
    #[sea_orm(string_value = "Client")]
    Client,
    #[sea_orm(string_value = "Supplier")]
    Supplier,
    #[sea_orm(string_value = "Both")]
    Both,
}

/// A client or supplier a transaction is owed to/by.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "counterparties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub kind: CounterpartyKind,
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
    #[sea_orm(has_many = "super::financial_transaction::Entity")]
    FinancialTransaction,
}

impl Related<super::financial_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
