// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`NftOutput`].

use crypto::hashes::{blake2b::Blake2b256, Digest};
use serde::{Deserialize, Serialize};

use super::{
    feature::Features,
    native_token::NativeTokens,
    unlock_condition::{
        AddressUnlockCondition, ExpirationUnlockCondition, StorageDepositReturnUnlockCondition,
        TimelockUnlockCondition, UnlockConditions,
    },
    OutputId, TokenAmount,
};
use crate::model::{
    util::{impl_id, Pack},
    utxo::{Address, NftAddress},
};

impl_id!(
    /// Uniquely identifies an NFT.
    NftId,
    32
);

impl NftId {
    /// The id carried by an NFT output that has just been minted.
    pub const NULL: Self = Self([0; Self::LENGTH]);

    /// Whether this is the [`NULL`](Self::NULL) id.
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// The id of the NFT minted by the output with the given id.
    pub fn from_output_id(output_id: &OutputId) -> Self {
        Self(Blake2b256::digest(output_id.pack_to_vec()).into())
    }

    /// Resolves the [`NULL`](Self::NULL) id of a freshly minted NFT to its actual id.
    pub fn or_from_output_id(self, output_id: &OutputId) -> Self {
        if self.is_null() {
            Self::from_output_id(output_id)
        } else {
            self
        }
    }
}

impl From<NftId> for Address {
    fn from(value: NftId) -> Self {
        Self::Nft(NftAddress(value))
    }
}

/// Represents an NFT in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftOutput {
    /// The output amount.
    pub amount: TokenAmount,
    /// The list of [`NativeToken`](super::NativeToken)s.
    pub native_tokens: NativeTokens,
    /// The associated id of the NFT.
    pub nft_id: NftId,
    /// The address unlock condition.
    pub address_unlock_condition: AddressUnlockCondition,
    /// The storage deposit return unlock condition (SDRUC).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub storage_deposit_return_unlock_condition: Option<StorageDepositReturnUnlockCondition>,
    /// The timelock unlock condition.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timelock_unlock_condition: Option<TimelockUnlockCondition>,
    /// The expiration unlock condition.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expiration_unlock_condition: Option<ExpirationUnlockCondition>,
    /// The corresponding list of [`Feature`](super::Feature)s.
    pub features: Features,
    /// The corresponding list of immutable [`Feature`](super::Feature)s.
    pub immutable_features: Features,
}

impl NftOutput {
    /// A `&str` representation of the type.
    pub const KIND: &'static str = "nft";
    /// The type byte of a packed NFT output.
    pub const TYPE: u8 = 6;

    /// Collects the unlock conditions into a set.
    pub fn unlock_conditions(&self) -> UnlockConditions {
        UnlockConditions::from_sorted([
            Some(self.address_unlock_condition.into()),
            self.storage_deposit_return_unlock_condition.map(Into::into),
            self.timelock_unlock_condition.map(Into::into),
            self.expiration_unlock_condition.map(Into::into),
        ])
    }
}

impl Pack for NftOutput {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::TYPE.pack(buf);
        self.amount.0.pack(buf);
        self.native_tokens.pack(buf);
        self.nft_id.pack(buf);
        self.unlock_conditions().pack(buf);
        self.features.pack(buf);
        self.immutable_features.pack(buf);
    }
}
