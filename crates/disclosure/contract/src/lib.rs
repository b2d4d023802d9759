//! Disclosure Contract
//!
//! Multi-party approval workflow for disclosure records on a shared ledger.
//!
//! # Components
//!
//! - [`OrgRegistry`]: the org directory document (registration, label
//!   resolution, snapshots)
//! - [`EndorsementPolicyBuilder`]: turns an org set into the endorsement
//!   policy artifact attached to a record key
//! - [`lifecycle`]: pure transition functions for submit, government
//!   verification, and voting, including the frozen approval threshold
//! - [`query`]: read-only projection of records by lifecycle state
//! - [`DisclosureContract`]: the exposed operations, each of which reads
//!   everything it needs, computes the transition, compiles the policy, and
//!   only then stages its writes
//!
//! The contract keeps no state between invocations. Committing (or
//! discarding) the staged writes belongs to the caller's transaction.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod codec;
mod config;
mod contract;
mod directory;
mod error;
pub mod lifecycle;
mod policy;
pub mod query;

pub use config::{ContractConfig, DEFAULT_APPROVAL_PERCENT, DEFAULT_GOVERNMENT_ORG, DEFAULT_ORG_DIRECTORY_KEY};
pub use contract::DisclosureContract;
pub use directory::OrgRegistry;
pub use error::{ContractError, ContractResult, ErrorKind};
pub use lifecycle::{required_approvals, LifecycleRules, Transition};
pub use policy::{CompiledPolicy, EndorsementPolicyBuilder};
