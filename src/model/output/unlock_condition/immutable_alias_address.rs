// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`ImmutableAliasAddressUnlockCondition`].

use serde::{Deserialize, Serialize};

use crate::{
    model::{utxo::Address, Pack},
    Error,
};

/// Defines the permanent alias address that owns this output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ImmutableAliasAddressUnlockConditionDto")]
pub struct ImmutableAliasAddressUnlockCondition {
    /// The associated address of this [`ImmutableAliasAddressUnlockCondition`]. Always an alias address.
    pub address: Address,
}

impl ImmutableAliasAddressUnlockCondition {
    /// The kind byte of the unlock condition.
    pub const KIND: u8 = 6;

    /// Creates the unlock condition, which only accepts alias addresses.
    pub fn new(address: Address) -> Result<Self, Error> {
        if !address.is_alias() {
            return Err(Error::InvalidUnlockConditionSet(format!(
                "immutable alias address unlock condition requires an alias address, got {address}"
            )));
        }
        Ok(Self { address })
    }
}

#[derive(Deserialize)]
struct ImmutableAliasAddressUnlockConditionDto {
    address: Address,
}

impl TryFrom<ImmutableAliasAddressUnlockConditionDto> for ImmutableAliasAddressUnlockCondition {
    type Error = Error;

    fn try_from(value: ImmutableAliasAddressUnlockConditionDto) -> Result<Self, Self::Error> {
        Self::new(value.address)
    }
}

impl Pack for ImmutableAliasAddressUnlockCondition {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::KIND.pack(buf);
        self.address.pack(buf);
    }
}
