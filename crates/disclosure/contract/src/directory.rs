//! Org Directory: the singleton organization registry document
//!
//! The directory is re-read from the ledger on every use so that each
//! invocation sees the latest committed registrations. It only ever grows.

use crate::codec::{decode, encode};
use crate::{ContractError, ContractResult};
use disclosure_ledger::ChaincodeStub;
use disclosure_types::{OrgDirectory, OrgId, OrgLabel};
use tracing::{info, warn};

/// Handle onto the directory document stored under a reserved key
#[derive(Debug, Clone)]
pub struct OrgRegistry {
    key: String,
    government: OrgId,
}

impl OrgRegistry {
    pub fn new(key: impl Into<String>, government: OrgId) -> Self {
        Self {
            key: key.into(),
            government,
        }
    }

    /// Ledger key of the directory document
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn government(&self) -> &OrgId {
        &self.government
    }

    /// Current directory; empty if nothing was ever registered
    pub fn snapshot<S: ChaincodeStub + ?Sized>(&self, stub: &S) -> ContractResult<OrgDirectory> {
        let bytes = stub
            .get_state(&self.key)
            .map_err(ContractError::ledger("read org directory"))?;
        match bytes {
            Some(bytes) => decode("decode org directory", &bytes),
            None => Ok(OrgDirectory::new()),
        }
    }

    /// Registered label of `org`, or the id itself when unregistered
    pub fn resolve_label<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        org: &OrgId,
    ) -> ContractResult<OrgLabel> {
        Ok(self.snapshot(stub)?.resolve_label(org))
    }

    /// Register `new_org` under `display_name`. Only the government may
    /// register, and an id can be registered once.
    pub fn register<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &mut S,
        caller: &OrgId,
        new_org: OrgId,
        display_name: &str,
    ) -> ContractResult<OrgDirectory> {
        let directory = self.snapshot(&*stub)?;
        let directory = self.plan_registration(directory, caller, new_org.clone(), display_name)?;

        let bytes = encode("encode org directory", &directory)?;
        stub.put_state(&self.key, bytes)
            .map_err(ContractError::ledger("write org directory"))?;

        info!(
            org = %new_org,
            label = display_name,
            registered = directory.len(),
            "Organization registered"
        );
        Ok(directory)
    }

    /// The directory that results from a registration, without touching the
    /// ledger
    pub fn plan_registration(
        &self,
        mut directory: OrgDirectory,
        caller: &OrgId,
        new_org: OrgId,
        display_name: &str,
    ) -> ContractResult<OrgDirectory> {
        if caller != &self.government {
            warn!(caller = %caller, "Non-government organization attempted registration");
            return Err(ContractError::Unauthorized {
                org: caller.clone(),
                operation: "register organizations",
            });
        }
        if display_name.trim().is_empty() {
            return Err(ContractError::InvalidArgument(
                "display name cannot be empty".to_string(),
            ));
        }
        if new_org.is_empty() || new_org.as_str() == self.key {
            return Err(ContractError::InvalidArgument(format!(
                "invalid organization id: {:?}",
                new_org.as_str()
            )));
        }

        let org = new_org.clone();
        if !directory.insert(new_org, OrgLabel::new(display_name)) {
            return Err(ContractError::AlreadyExists(format!("organization {}", org)));
        }
        Ok(directory)
    }
}
