//! Disclosure Ledger Domain Types
//!
//! This crate defines the documents that live on the shared ledger for the
//! disclosure approval workflow, and the artifacts exchanged with the
//! ledger platform.
//!
//! # Key Concepts
//!
//! - **Record**: one disclosure case. Moves forward-only through
//!   `SUBMITTED -> GOV_VERIFIED -> OFFICIAL`; `OFFICIAL` is terminal.
//! - **Org Directory**: the singleton mapping from organization id to a
//!   display label. Labels are for display; identity is always the org id.
//! - **Endorsement Policy**: the set of organizations allowed to endorse the
//!   next write to a record key.
//!
//! # Architecture
//!
//! This is a pure types crate. All documents implement `Clone`, `Debug`,
//! `Serialize`, `Deserialize`, and serialize to the camelCase JSON layout
//! stored on the ledger. IDs use the newtype pattern and implement `Display`
//! and `new()`.

#![deny(unsafe_code)]

mod org;
mod policy;
mod record;

pub use org::*;
pub use policy::*;
pub use record::*;

/// Ledger-agreed transaction time
pub type Timestamp = chrono::DateTime<chrono::Utc>;
