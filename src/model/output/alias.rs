// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`AliasOutput`].

use serde::{Deserialize, Serialize};

use super::{
    feature::Features,
    native_token::NativeTokens,
    unlock_condition::{GovernorAddressUnlockCondition, StateControllerAddressUnlockCondition, UnlockConditions},
    TokenAmount,
};
use crate::model::{
    util::{impl_id, Pack},
    utxo::{AliasAddress, Address},
};

impl_id!(
    /// Uniquely identifies an alias.
    AliasId,
    32
);

impl From<AliasId> for Address {
    fn from(value: AliasId) -> Self {
        Self::Alias(AliasAddress(value))
    }
}

/// Represents an alias in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasOutput {
    /// The output amount.
    pub amount: TokenAmount,
    /// The list of [`NativeToken`](super::NativeToken)s.
    pub native_tokens: NativeTokens,
    /// The associated id of the alias.
    pub alias_id: AliasId,
    /// The current state index.
    pub state_index: u32,
    /// The metadata corresponding to the current state.
    #[serde(with = "serde_bytes")]
    pub state_metadata: Box<[u8]>,
    /// A counter that denotes the number of foundries created by this alias account.
    pub foundry_counter: u32,
    /// The state controller address unlock condition.
    pub state_controller_address_unlock_condition: StateControllerAddressUnlockCondition,
    /// The governer address unlock condition.
    pub governor_address_unlock_condition: GovernorAddressUnlockCondition,
    /// The corresponding list of [`Feature`](super::Feature)s.
    pub features: Features,
    /// The corresponding list of immutable [`Feature`](super::Feature)s.
    pub immutable_features: Features,
}

impl AliasOutput {
    /// A `&str` representation of the type.
    pub const KIND: &'static str = "alias";
    /// The type byte of a packed alias output.
    pub const TYPE: u8 = 4;

    /// Collects the unlock conditions into a set.
    pub fn unlock_conditions(&self) -> UnlockConditions {
        UnlockConditions::from_sorted([
            Some(self.state_controller_address_unlock_condition.into()),
            Some(self.governor_address_unlock_condition.into()),
        ])
    }
}

impl Pack for AliasOutput {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::TYPE.pack(buf);
        self.amount.0.pack(buf);
        self.native_tokens.pack(buf);
        self.alias_id.pack(buf);
        self.state_index.pack(buf);
        (self.state_metadata.len() as u16).pack(buf);
        buf.extend_from_slice(&self.state_metadata);
        self.foundry_counter.pack(buf);
        self.unlock_conditions().pack(buf);
        self.features.pack(buf);
        self.immutable_features.pack(buf);
    }
}

#[cfg(test)]
mod test {
    use mongodb::bson::from_bson;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{utxo::Ed25519Address, SerializeToBson};

    #[test]
    fn alias_output_bson() {
        let controller = Address::from(Ed25519Address([1; 32]));
        let output = AliasOutput {
            amount: TokenAmount(1_000_000),
            native_tokens: Default::default(),
            alias_id: AliasId([2; 32]),
            state_index: 1,
            state_metadata: Box::new([1, 2, 3]),
            foundry_counter: 1,
            state_controller_address_unlock_condition: StateControllerAddressUnlockCondition { address: controller },
            governor_address_unlock_condition: GovernorAddressUnlockCondition { address: controller },
            features: Default::default(),
            immutable_features: Default::default(),
        };
        assert_eq!(output.unlock_conditions().len(), 2);
        let bson = output.to_bson();
        assert_eq!(output, from_bson::<AliasOutput>(bson).unwrap());
        assert_eq!(Address::from(output.alias_id), Address::Alias(AliasAddress(AliasId([2; 32]))));
    }
}
