//! Core engine of the transaction ledger: creation with trust defaulting,
//! recurrence expansion, settlement and reversal against the cash ledger,
//! the dual-control validation workflow, series mutation, and the read
//! contracts the HTTP layer serves.

pub mod balance;
pub mod create;
pub mod error;
pub mod mutation;
pub mod query;
pub mod recurrence;
pub mod reversal;
pub mod series;
pub mod settlement;
pub mod summary;
pub mod validation;

#[cfg(test)]
pub mod testing;

pub use balance::{account_balance, adjust_account_balance, list_cash_movements};
pub use create::{create_transaction, require_company, NewTransaction};
pub use error::{LedgerError, Outcome, Warning};
pub use mutation::{delete_transaction, update_transaction, TransactionUpdate};
pub use query::{
    get_transaction, list_transactions, TransactionFilter, TransactionPage, TransactionView,
};
pub use recurrence::{generate_series, MONTHLY_HORIZON, WEEKLY_HORIZON};
pub use reversal::reverse_settlement;
pub use series::{delete_series, update_series, SeriesDeletion, SeriesScope, SeriesUpdate};
pub use settlement::{settle, Settlement};
pub use summary::transaction_summary;
pub use validation::{ensure_client_editable, reject_transaction, validate_transaction};
