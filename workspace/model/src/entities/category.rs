use sea_orm::entity::prelude::*;

use super::company;

/// Reporting grouping for transactions.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: i32,
    pub name: String,
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
