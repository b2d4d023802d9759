//! Organization identity and the org directory document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Membership-service identifier of an organization (e.g. `Bank1MSP`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrgId(pub String);

impl OrgId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrgId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Human-readable display name of an organization
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrgLabel(pub String);

impl OrgLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fallback label for an organization missing from the directory
    pub fn from_org_id(org: &OrgId) -> Self {
        Self(org.0.clone())
    }
}

impl std::fmt::Display for OrgLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The singleton directory of registered organizations.
///
/// Keys are unique org ids. Labels are not required to be unique, so nothing
/// that decides identity (eligibility, double voting, endorsement) may
/// compare labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgDirectory {
    #[serde(default)]
    pub orgs: BTreeMap<OrgId, OrgLabel>,
}

impl OrgDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, org: &OrgId) -> Option<&OrgLabel> {
        self.orgs.get(org)
    }

    /// Registered label for `org`, or the raw id when unregistered
    pub fn resolve_label(&self, org: &OrgId) -> OrgLabel {
        self.orgs
            .get(org)
            .cloned()
            .unwrap_or_else(|| OrgLabel::from_org_id(org))
    }

    /// Insert a new entry. Returns `false` and leaves the directory untouched
    /// if the id is already registered.
    pub fn insert(&mut self, org: OrgId, label: OrgLabel) -> bool {
        if self.orgs.contains_key(&org) {
            return false;
        }
        self.orgs.insert(org, label);
        true
    }

    /// Number of registered organizations that may vote on a record
    /// submitted by `submitter`
    pub fn eligible_voter_count(&self, government: &OrgId, submitter: &OrgId) -> u32 {
        self.orgs
            .keys()
            .filter(|org| *org != government && *org != submitter)
            .count() as u32
    }

    pub fn len(&self) -> usize {
        self.orgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }
}
