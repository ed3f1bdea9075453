//! Transport-layer types shared between the ledger engine and the HTTP layer.
//! The summary shapes are produced by `ledger::summary` and serialized
//! verbatim by the backend handlers.

pub mod summary;

pub use summary::{BucketTotals, DueBucket, PaymentMethodTotals, TransactionSummary};
