//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the financial back-office ledger here:
//! the unified payable/receivable transaction, the cash-movement ledger,
//! and the supporting tenant/account/counterparty/category tables.

pub mod cash_movement;
pub mod category;
pub mod company;
pub mod counterparty;
pub mod financial_account;
pub mod financial_transaction;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::cash_movement::Entity as CashMovement;
    pub use super::category::Entity as Category;
    pub use super::company::Entity as Company;
    pub use super::counterparty::Entity as Counterparty;
    pub use super::financial_account::Entity as FinancialAccount;
    pub use super::financial_transaction::Entity as FinancialTransaction;
}
