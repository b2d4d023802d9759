//! Contract configuration

use crate::{ContractError, ContractResult};
use disclosure_types::OrgId;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_GOVERNMENT_ORG: &str = "OrgGovMSP";
pub const DEFAULT_ORG_DIRECTORY_KEY: &str = "ORG_DIRECTORY";
pub const DEFAULT_APPROVAL_PERCENT: u8 = 51;

/// Network-wide parameters every validator must agree on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Organization acting as the government verifier
    pub government_org: OrgId,

    /// Reserved ledger key holding the org directory document
    pub org_directory_key: String,

    /// Share of eligible banks (in percent, rounded up) whose votes make a
    /// record official
    pub approval_threshold_percent: u8,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            government_org: OrgId::new(DEFAULT_GOVERNMENT_ORG),
            org_directory_key: DEFAULT_ORG_DIRECTORY_KEY.to_string(),
            approval_threshold_percent: DEFAULT_APPROVAL_PERCENT,
        }
    }
}

impl ContractConfig {
    pub fn with_government_org(mut self, org: impl Into<String>) -> Self {
        self.government_org = OrgId::new(org);
        self
    }

    pub fn with_approval_threshold_percent(mut self, percent: u8) -> Self {
        self.approval_threshold_percent = percent;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> ContractResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ContractError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, falling back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> ContractResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ContractError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> ContractResult<()> {
        if self.government_org.is_empty() {
            return Err(ContractError::Config(
                "government_org must not be empty".to_string(),
            ));
        }
        if self.org_directory_key.is_empty() {
            return Err(ContractError::Config(
                "org_directory_key must not be empty".to_string(),
            ));
        }
        if !(1..=100).contains(&self.approval_threshold_percent) {
            return Err(ContractError::Config(format!(
                "approval_threshold_percent must be within 1..=100, got {}",
                self.approval_threshold_percent
            )));
        }
        Ok(())
    }
}
