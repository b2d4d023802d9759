//! Endorsement policies attached to ledger keys

use crate::OrgId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Role a principal must hold to satisfy an endorsement policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalRole {
    #[default]
    Peer,
}

/// The organizations whose endorsement is required for the next write to a
/// key. How the set is combined (all-of, any-of) is decided by the ledger
/// platform, not here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementPolicy {
    pub role: PrincipalRole,
    pub orgs: BTreeSet<OrgId>,
}

impl EndorsementPolicy {
    pub fn new(role: PrincipalRole) -> Self {
        Self {
            role,
            orgs: BTreeSet::new(),
        }
    }

    /// Peer policy over a single organization
    pub fn single(org: OrgId) -> Self {
        Self::new(PrincipalRole::Peer).with_org(org)
    }

    /// Peer policy over every organization yielded by `orgs`
    pub fn for_orgs(orgs: impl IntoIterator<Item = OrgId>) -> Self {
        let mut policy = Self::new(PrincipalRole::Peer);
        policy.add_orgs(orgs);
        policy
    }

    pub fn with_org(mut self, org: OrgId) -> Self {
        self.orgs.insert(org);
        self
    }

    pub fn add_orgs(&mut self, orgs: impl IntoIterator<Item = OrgId>) {
        self.orgs.extend(orgs);
    }

    pub fn contains(&self, org: &OrgId) -> bool {
        self.orgs.contains(org)
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orgs.len()
    }
}
