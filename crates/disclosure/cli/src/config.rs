//! CLI configuration

use anyhow::{Context, Result};
use disclosure_contract::ContractConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// Network parameters handed to the contract
    pub contract: ContractConfig,

    /// Ledger snapshot file
    pub ledger_path: Option<PathBuf>,

    /// Default log filter
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => match Self::default_config_path() {
                Some(p) => p,
                None => return Ok(CliConfig::default()),
            },
        };

        if !config_path.exists() {
            return Ok(CliConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let config: CliConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", config_path.display()))?;
        config.contract.validate()?;
        Ok(config)
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("disclosure").join("config.toml"))
    }
}
