//! Endorsement Policy Builder
//!
//! Collects the organizations that must endorse the next write to a record
//! key and hands them to the platform's policy compiler. The builder does
//! not decide how the set is combined; the platform does.

use crate::{ContractError, ContractResult};
use disclosure_ledger::{ChaincodeStub, PolicyCompiler};
use disclosure_types::{EndorsementPolicy, OrgId, PrincipalRole};

/// A policy together with the artifact the platform compiled it into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPolicy {
    pub policy: EndorsementPolicy,
    pub artifact: Vec<u8>,
}

impl CompiledPolicy {
    /// Stage the artifact as the key-level endorsement policy of `key`
    pub fn apply<S: ChaincodeStub + ?Sized>(&self, stub: &mut S, key: &str) -> ContractResult<()> {
        stub.set_state_validation_parameter(key, self.artifact.clone())
            .map_err(ContractError::ledger("set endorsement policy"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EndorsementPolicyBuilder {
    policy: EndorsementPolicy,
}

impl EndorsementPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing org set
    pub fn from_policy(policy: EndorsementPolicy) -> Self {
        Self { policy }
    }

    pub fn add_orgs(mut self, role: PrincipalRole, orgs: impl IntoIterator<Item = OrgId>) -> Self {
        self.policy.role = role;
        self.policy.add_orgs(orgs);
        self
    }

    /// Compile the collected org set. Any compiler failure aborts the caller's
    /// transition before it has staged a write.
    pub fn build(self, compiler: &dyn PolicyCompiler) -> ContractResult<CompiledPolicy> {
        let artifact = compiler
            .compile(&self.policy)
            .map_err(ContractError::ledger("compile endorsement policy"))?;
        Ok(CompiledPolicy {
            policy: self.policy,
            artifact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use disclosure_ledger::JsonPolicyCompiler;

    #[test]
    fn test_build_collects_orgs() {
        let compiled = EndorsementPolicyBuilder::new()
            .add_orgs(PrincipalRole::Peer, vec![OrgId::new("Bank3MSP")])
            .add_orgs(PrincipalRole::Peer, vec![OrgId::new("Bank1MSP"), OrgId::new("Bank3MSP")])
            .build(&JsonPolicyCompiler)
            .unwrap();
        assert_eq!(compiled.policy.len(), 2);
        assert_eq!(JsonPolicyCompiler::decode(&compiled.artifact).unwrap(), compiled.policy);
    }

    #[test]
    fn test_compiler_failure_is_reported_with_step() {
        let err = EndorsementPolicyBuilder::new()
            .build(&JsonPolicyCompiler)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ledger);
        assert!(err.to_string().contains("compile endorsement policy"));
    }
}
