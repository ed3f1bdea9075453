pub mod accounts;
pub mod cash_movements;
pub mod categories;
pub mod companies;
pub mod counterparties;
pub mod health;
pub mod series;
pub mod settlements;
pub mod transactions;
pub mod validation;
