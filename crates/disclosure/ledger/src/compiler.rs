use crate::{LedgerError, LedgerResult, PolicyCompiler};
use disclosure_types::EndorsementPolicy;

/// Reference policy compiler emitting the policy as canonical JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPolicyCompiler;

impl JsonPolicyCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Parse an artifact produced by [`JsonPolicyCompiler::compile`]
    pub fn decode(bytes: &[u8]) -> LedgerResult<EndorsementPolicy> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::Policy(e.to_string()))
    }
}

impl PolicyCompiler for JsonPolicyCompiler {
    fn compile(&self, policy: &EndorsementPolicy) -> LedgerResult<Vec<u8>> {
        if policy.is_empty() {
            return Err(LedgerError::Policy(
                "endorsement policy requires at least one organization".to_string(),
            ));
        }
        serde_json::to_vec(policy).map_err(|e| LedgerError::Policy(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disclosure_types::OrgId;

    #[test]
    fn test_compile_and_decode() {
        let policy = EndorsementPolicy::for_orgs(vec![OrgId::new("Bank2MSP"), OrgId::new("Bank1MSP")]);
        let bytes = JsonPolicyCompiler.compile(&policy).unwrap();
        assert_eq!(
            String::from_utf8(bytes.clone()).unwrap(),
            r#"{"role":"peer","orgs":["Bank1MSP","Bank2MSP"]}"#
        );
        assert_eq!(JsonPolicyCompiler::decode(&bytes).unwrap(), policy);
    }

    #[test]
    fn test_empty_policy_rejected() {
        let err = JsonPolicyCompiler.compile(&EndorsementPolicy::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Policy(_)));
    }
}
