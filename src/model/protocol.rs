// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module that contains protocol types.

use serde::{Deserialize, Serialize};

use crate::model::stringify;

/// Parameters relevant to byte cost calculations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentStructure {
    /// The cost of a single virtual byte.
    pub v_byte_cost: u32,
    /// The weight of a data byte.
    pub v_byte_factor_data: u8,
    /// The weight of a key byte.
    pub v_byte_factor_key: u8,
}

impl RentStructure {
    /// The default cost of a virtual byte.
    pub const DEFAULT_BYTE_COST: u32 = 100;
    /// The default weight of data bytes.
    pub const DEFAULT_BYTE_FACTOR_DATA: u8 = 1;
    /// The default weight of key bytes.
    pub const DEFAULT_BYTE_FACTOR_KEY: u8 = 10;
}

impl Default for RentStructure {
    fn default() -> Self {
        Self {
            v_byte_cost: Self::DEFAULT_BYTE_COST,
            v_byte_factor_data: Self::DEFAULT_BYTE_FACTOR_DATA,
            v_byte_factor_key: Self::DEFAULT_BYTE_FACTOR_KEY,
        }
    }
}

/// Protocol parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ProtocolParameters {
    pub version: u8,
    pub network_name: String,
    pub bech32_hrp: String,
    pub rent_structure: RentStructure,
    #[serde(with = "stringify")]
    pub token_supply: u64,
}

impl ProtocolParameters {
    /// The protocol version these types are defined for.
    pub const DEFAULT_VERSION: u8 = 2;
    /// The name of the public test network.
    pub const DEFAULT_NETWORK_NAME: &'static str = "testnet";
    /// The human-readable part of addresses on the public test network.
    pub const DEFAULT_BECH32_HRP: &'static str = "rms";
    /// The total supply of base tokens on the public test network.
    pub const DEFAULT_TOKEN_SUPPLY: u64 = 1_813_620_509_061_365;
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            version: Self::DEFAULT_VERSION,
            network_name: Self::DEFAULT_NETWORK_NAME.to_string(),
            bech32_hrp: Self::DEFAULT_BECH32_HRP.to_string(),
            rent_structure: Default::default(),
            token_supply: Self::DEFAULT_TOKEN_SUPPLY,
        }
    }
}
