// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`BasicOutput`].

use serde::{Deserialize, Serialize};

use super::{
    feature::Features,
    native_token::NativeTokens,
    resolve_amount,
    unlock_condition::{
        AddressUnlockCondition, ExpirationUnlockCondition, OwnerUnlockConditions,
        StorageDepositReturnUnlockCondition, TimelockUnlockCondition, UnlockConditions,
    },
    Feature, TokenAmount,
};
use crate::{
    model::{protocol::ProtocolParameters, tangle::MilestoneTimestamp, utxo::Address, Pack},
    Error,
};

/// Represents a basic output in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicOutput {
    /// The output amount.
    pub amount: TokenAmount,
    /// The list of [`NativeToken`](super::NativeToken)s.
    pub native_tokens: NativeTokens,
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
    /// The corresponding list of [`Feature`]s.
    pub features: Features,
}

impl BasicOutput {
    /// A `&str` representation of the type.
    pub const KIND: &'static str = "basic";
    /// The type byte of a packed basic output.
    pub const TYPE: u8 = 3;

    const ALLOWED_FEATURES: [u8; 3] = [Feature::SENDER_KIND, Feature::METADATA_KIND, Feature::TAG_KIND];

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

impl Pack for BasicOutput {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::TYPE.pack(buf);
        self.amount.0.pack(buf);
        self.native_tokens.pack(buf);
        self.unlock_conditions().pack(buf);
        self.features.pack(buf);
    }
}

/// Builds a [`BasicOutput`] that satisfies the protocol rules.
#[derive(Clone, Debug)]
#[must_use]
pub struct BasicOutputBuilder {
    amount: Option<u64>,
    native_tokens: NativeTokens,
    unlock_conditions: Vec<super::UnlockCondition>,
    features: Features,
}

impl BasicOutputBuilder {
    /// Starts a builder for an output owned by `address`.
    pub fn new(address: Address) -> Self {
        Self {
            amount: None,
            native_tokens: Default::default(),
            unlock_conditions: vec![AddressUnlockCondition { address }.into()],
            features: Default::default(),
        }
    }

    /// Starts a builder from a full list of unlock conditions.
    pub fn from_unlock_conditions(unlock_conditions: impl IntoIterator<Item = super::UnlockCondition>) -> Self {
        Self {
            amount: None,
            native_tokens: Default::default(),
            unlock_conditions: unlock_conditions.into_iter().collect(),
            features: Default::default(),
        }
    }

    /// Sets the amount. Without it, the minimum storage deposit is used.
    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the native tokens.
    pub fn with_native_tokens(mut self, native_tokens: NativeTokens) -> Self {
        self.native_tokens = native_tokens;
        self
    }

    /// Requires `amount` to be returned to `return_address` when the output is claimed.
    pub fn with_storage_deposit_return(mut self, return_address: Address, amount: u64) -> Self {
        self.unlock_conditions
            .push(StorageDepositReturnUnlockCondition { return_address, amount }.into());
        self
    }

    /// Locks the output until `timestamp`.
    pub fn with_timelock(mut self, timestamp: MilestoneTimestamp) -> Self {
        self.unlock_conditions.push(TimelockUnlockCondition { timestamp }.into());
        self
    }

    /// Hands control to `return_address` at `timestamp`.
    pub fn with_expiration(mut self, return_address: Address, timestamp: MilestoneTimestamp) -> Self {
        self.unlock_conditions.push(
            ExpirationUnlockCondition {
                return_address,
                timestamp,
            }
            .into(),
        );
        self
    }

    /// Sets the features.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Validates the output against the protocol parameters.
    pub fn finish(self, params: &ProtocolParameters) -> Result<BasicOutput, Error> {
        let conditions = UnlockConditions::new(self.unlock_conditions)?;
        let conditions = OwnerUnlockConditions::try_from_set(&conditions, BasicOutput::KIND)?;
        self.features
            .check_allowed("basic output feature", &BasicOutput::ALLOWED_FEATURES)?;
        let mut output = BasicOutput {
            amount: TokenAmount(0),
            native_tokens: self.native_tokens,
            address_unlock_condition: conditions.address,
            storage_deposit_return_unlock_condition: conditions.storage_deposit_return,
            timelock_unlock_condition: conditions.timelock,
            expiration_unlock_condition: conditions.expiration,
            features: self.features,
        };
        output.amount = resolve_amount(self.amount, &output, params)?;
        if let Some(sdruc) = output.storage_deposit_return_unlock_condition {
            if sdruc.amount > output.amount.0 {
                return Err(Error::InvalidUnlockConditionSet(format!(
                    "storage deposit return of {} exceeds the output amount of {}",
                    sdruc.amount, output.amount
                )));
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use mongodb::bson::from_bson;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        output::unlock_condition::ImmutableAliasAddressUnlockCondition,
        utxo::{AliasAddress, AliasId, Ed25519Address},
        SerializeToBson,
    };

    fn owner() -> Address {
        Ed25519Address([1; 32]).into()
    }

    #[test]
    fn computes_minimum_deposit() {
        let params = ProtocolParameters::default();
        let output = BasicOutputBuilder::new(owner()).finish(&params).unwrap();
        assert_eq!(output.amount, TokenAmount(42_600));

        let with_expiration = BasicOutputBuilder::new(owner())
            .with_expiration(Ed25519Address([2; 32]).into(), 1000.into())
            .finish(&params)
            .unwrap();
        assert!(with_expiration.amount > output.amount);
    }

    #[test]
    fn rejects_too_little_or_too_much() {
        let params = ProtocolParameters::default();
        assert!(matches!(
            BasicOutputBuilder::new(owner()).with_amount(1).finish(&params),
            Err(Error::InsufficientStorageDeposit {
                amount: 1,
                required: 42_600
            })
        ));
        assert!(matches!(
            BasicOutputBuilder::new(owner())
                .with_amount(params.token_supply + 1)
                .finish(&params),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_foreign_unlock_conditions() {
        let alias = Address::from(AliasAddress(AliasId([5; 32])));
        let result = BasicOutputBuilder::from_unlock_conditions([
            AddressUnlockCondition { address: owner() }.into(),
            ImmutableAliasAddressUnlockCondition::new(alias).unwrap().into(),
        ])
        .finish(&ProtocolParameters::default());
        assert!(matches!(result, Err(Error::InvalidUnlockConditionSet(_))));
        assert!(matches!(
            BasicOutputBuilder::from_unlock_conditions(Vec::new()).finish(&ProtocolParameters::default()),
            Err(Error::InvalidUnlockConditionSet(_))
        ));
    }

    #[test]
    fn basic_output_bson() {
        let output = BasicOutputBuilder::new(owner())
            .with_storage_deposit_return(Ed25519Address([2; 32]).into(), 42_600)
            .with_amount(100_000)
            .finish(&ProtocolParameters::default())
            .unwrap();
        let bson = output.to_bson();
        let doc = bson.as_document().unwrap();
        assert!(doc.contains_key("storage_deposit_return_unlock_condition"));
        assert!(!doc.contains_key("timelock_unlock_condition"));
        assert_eq!(output, from_bson::<BasicOutput>(bson).unwrap());
    }
}
