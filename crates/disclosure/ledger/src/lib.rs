//! Ledger platform seams for the disclosure contract.
//!
//! The contract never talks to a concrete ledger. It sees:
//! - [`ChaincodeStub`]: keyed document reads/writes, rich queries, the
//!   transaction timestamp, and per-key endorsement (validation) parameters
//! - [`ClientIdentity`]: the organization of the invoking client
//! - [`PolicyCompiler`]: compilation of an endorsement policy into the
//!   platform's artifact bytes
//!
//! [`memory::MemoryLedger`] is a deterministic reference implementation of
//! these seams. It buffers each transaction's writes and applies them
//! atomically on commit after an MVCC read-version check, which is enough to
//! exercise the contract end to end. It is not a production store.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod compiler;
mod error;
pub mod memory;
mod selector;
mod traits;

pub use compiler::JsonPolicyCompiler;
pub use error::{LedgerError, LedgerResult};
pub use memory::{LedgerSnapshot, LedgerTransaction, MemoryLedger, SnapshotEntry};
pub use selector::Selector;
pub use traits::{
    ChaincodeStub, ClientIdentity, PolicyCompiler, QueryEntry, QueryIterator, TransactionContext,
};
