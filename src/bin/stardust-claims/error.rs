// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Claims(#[from] stardust_claims::Error),
    #[error("failed to read outputs at '{0}': {1}")]
    OutputsRead(String, std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
