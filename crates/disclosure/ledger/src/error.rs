use thiserror::Error;

/// Result type for ledger platform operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures reported by the ledger platform.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("mvcc read conflict on key {0}")]
    MvccConflict(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("endorsement policy error: {0}")]
    Policy(String),

    #[error("identity error: {0}")]
    Identity(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
