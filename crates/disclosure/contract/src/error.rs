//! Error types for contract operations

use disclosure_ledger::LedgerError;
use disclosure_types::{OrgId, RecordId, RecordState};
use thiserror::Error;

/// Result type alias for contract operations
pub type ContractResult<T> = Result<T, ContractError>;

/// Errors returned by contract operations. None are retried by the contract.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("organization {org} is not authorized to {operation}")]
    Unauthorized { org: OrgId, operation: &'static str },

    #[error("record {id} is {actual}, expected {expected}")]
    InvalidState {
        id: RecordId,
        actual: RecordState,
        expected: RecordState,
    },

    #[error("record {0} is OFFICIAL and immutable")]
    Immutable(RecordId),

    #[error("organization {org} is not eligible to vote: {reason}")]
    Ineligible { org: OrgId, reason: &'static str },

    #[error("organization {org} already voted on record {id}")]
    AlreadyVoted { id: RecordId, org: OrgId },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("ledger failure during {step}: {source}")]
    Ledger {
        step: &'static str,
        #[source]
        source: LedgerError,
    },

    #[error("encoding failure during {step}: {source}")]
    Codec {
        step: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat classification of [`ContractError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Unauthorized,
    InvalidState,
    Immutable,
    Ineligible,
    AlreadyVoted,
    InvalidArgument,
    Config,
    Ledger,
    Codec,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::Immutable(_) => ErrorKind::Immutable,
            Self::Ineligible { .. } => ErrorKind::Ineligible,
            Self::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Config(_) => ErrorKind::Config,
            Self::Ledger { .. } => ErrorKind::Ledger,
            Self::Codec { .. } => ErrorKind::Codec,
        }
    }

    /// Attach the failing step to a platform error
    pub(crate) fn ledger(step: &'static str) -> impl FnOnce(LedgerError) -> Self {
        move |source| Self::Ledger { step, source }
    }
}
