// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use stardust_claims::{indexer::DEFAULT_PAGE_SIZE, model::ProtocolParameters};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at '{0}': {1}")]
    FileRead(String, std::io::Error),
    #[error("toml deserialization failed: {0}")]
    TomlDeserialization(toml::de::Error),
    #[error("claim page size must be at least 1")]
    ZeroPageSize,
}

/// Configuration of the claim queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimConfig {
    pub page_size: usize,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Configuration of the claims tool.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsConfig {
    pub protocol: ProtocolParameters,
    pub claim: ClaimConfig,
}

impl ClaimsConfig {
    /// Reads the config from the file located at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = fs::read_to_string(&path)
            .map_err(|e| ConfigError::FileRead(path.as_ref().display().to_string(), e))
            .and_then(|contents| toml::from_str::<Self>(&contents).map_err(ConfigError::TomlDeserialization))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that deserialization cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.claim.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_file_conformity() -> Result<(), ConfigError> {
        let config = ClaimsConfig::from_file(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/bin/stardust-claims/config.template.toml"
        ))?;
        assert_eq!(config, ClaimsConfig::default());

        Ok(())
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut config = ClaimsConfig::default();
        config.claim.page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroPageSize)));
    }
}
