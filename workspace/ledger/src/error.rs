use thiserror::Error;

/// Error types for the ledger engine.
///
/// Every variant except `Database` is rejected before any mutation; nothing
/// leaves an operation half-applied. The sanctioned partial-failure windows
/// (settlement posting, series expansion) surface as [`Warning`]s instead.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Malformed or missing input; rejected before touching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The transaction/series does not exist under the given company/type.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation would break a ledger invariant (double settlement,
    /// reversing a pending row, validating a rejected record, ...).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Error from the database operations.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// A secondary effect that failed after the primary mutation was committed.
///
/// The primary effect (payment confirmed, template validated) is the source
/// of truth the user already saw; these are reported, never rolled back.
#[derive(Error, Debug)]
pub enum Warning {
    /// Settlement flipped the row to paid but the ledger posting failed.
    /// The missing line can be reconciled later.
    #[error("transaction {transaction_id} is settled but its ledger posting failed: {reason}")]
    LedgerPostingFailed { transaction_id: i32, reason: String },

    /// The template was created/validated but series expansion failed.
    #[error("series expansion for template {template_id} failed: {reason}")]
    SeriesGenerationFailed { template_id: i32, reason: String },

    /// Reversal reset the row to pending but could not delete its postings.
    #[error("reversal of transaction {transaction_id} left ledger entries behind: {reason}")]
    DanglingLedgerEntries { transaction_id: i32, reason: String },
}

/// Result of an operation together with any partial-failure warnings, so
/// callers and tests can assert on the warning channel.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }
}

/// Type alias for Result with LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;
