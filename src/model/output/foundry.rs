// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the foundry output.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{
    feature::{Feature, Features},
    native_token::{NativeTokens, TokenId, TokenScheme},
    resolve_amount,
    unlock_condition::{ImmutableAliasAddressUnlockCondition, UnlockCondition, UnlockConditions},
    Output, TokenAmount,
};
use crate::{
    model::{
        protocol::ProtocolParameters,
        util::{impl_id, Pack},
        utxo::Address,
    },
    Error,
};

impl_id!(
    /// The id of a foundry: the controlling alias address, the serial number and the token scheme kind.
    FoundryId,
    38
);

impl FoundryId {
    /// Derives the id from its parts.
    pub fn build(alias_address: &Address, serial_number: u32, token_scheme_kind: u8) -> Self {
        let mut bytes = Vec::with_capacity(Self::LENGTH);
        alias_address.pack(&mut bytes);
        serial_number.pack(&mut bytes);
        token_scheme_kind.pack(&mut bytes);
        let mut id = [0; Self::LENGTH];
        id.copy_from_slice(&bytes);
        Self(id)
    }
}

impl From<FoundryId> for TokenId {
    fn from(value: FoundryId) -> Self {
        Self(value.0)
    }
}

/// Represents a foundry in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundryOutput {
    /// The output amount.
    pub amount: TokenAmount,
    /// The list of [`NativeToken`](super::NativeToken)s.
    pub native_tokens: NativeTokens,
    /// The associated id of the foundry.
    pub foundry_id: FoundryId,
    /// The serial number of the foundry.
    pub serial_number: u32,
    /// The [`TokenScheme`] of the underlying token.
    pub token_scheme: TokenScheme,
    /// The immutable alias address unlock condition.
    pub immutable_alias_address_unlock_condition: ImmutableAliasAddressUnlockCondition,
    /// The corresponding list of [`Feature`]s.
    pub features: Features,
    /// The corresponding list of immutable [`Feature`]s.
    pub immutable_features: Features,
}

impl FoundryOutput {
    /// A `&str` representation of the type.
    pub const KIND: &'static str = "foundry";
    /// The type byte of a packed foundry output.
    pub const TYPE: u8 = 5;

    const ALLOWED_FEATURES: [u8; 1] = [Feature::METADATA_KIND];

    /// The id of the native token controlled by this foundry.
    pub fn token_id(&self) -> TokenId {
        self.foundry_id.into()
    }

    /// Collects the unlock conditions into a set.
    pub fn unlock_conditions(&self) -> UnlockConditions {
        UnlockConditions::from_sorted([Some(self.immutable_alias_address_unlock_condition.into())])
    }
}

impl Pack for FoundryOutput {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::TYPE.pack(buf);
        self.amount.0.pack(buf);
        self.native_tokens.pack(buf);
        self.serial_number.pack(buf);
        self.token_scheme.pack(buf);
        self.unlock_conditions().pack(buf);
        self.features.pack(buf);
        self.immutable_features.pack(buf);
    }
}

/// Builds a [`FoundryOutput`], reporting the first protocol rule it violates.
#[derive(Clone, Debug)]
#[must_use]
pub struct FoundryOutputBuilder {
    amount: Option<u64>,
    serial_number: u32,
    token_scheme: TokenScheme,
    unlock_conditions: Vec<UnlockCondition>,
    native_tokens: NativeTokens,
    features: Features,
    immutable_features: Features,
}

impl FoundryOutputBuilder {
    /// Starts a builder. The serial number is taken as given; its uniqueness within the alias is up to the ledger.
    pub fn new(
        serial_number: u32,
        token_scheme: TokenScheme,
        unlock_conditions: impl IntoIterator<Item = UnlockCondition>,
    ) -> Self {
        Self {
            amount: None,
            serial_number,
            token_scheme,
            unlock_conditions: unlock_conditions.into_iter().collect(),
            native_tokens: Default::default(),
            features: Default::default(),
            immutable_features: Default::default(),
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

    /// Sets the features.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Sets the immutable features.
    pub fn with_immutable_features(mut self, immutable_features: Features) -> Self {
        self.immutable_features = immutable_features;
        self
    }

    /// Validates the foundry in order: serial number, token scheme, unlock conditions, features and amount.
    pub fn finish(self, params: &ProtocolParameters) -> Result<FoundryOutput, Error> {
        if self.serial_number == 0 {
            return Err(Error::InvalidSerialNumber(self.serial_number));
        }
        self.token_scheme.validate()?;
        let immutable_alias_address_unlock_condition = match self.unlock_conditions.as_slice() {
            [UnlockCondition::ImmutableAliasAddress(condition)] => *condition,
            other => {
                return Err(Error::InvalidUnlockConditionSet(format!(
                    "foundry outputs require exactly one immutable alias address unlock condition, got [{}]",
                    other.iter().map(UnlockCondition::kind_name).collect::<Vec<_>>().join(", ")
                )));
            }
        };
        self.features
            .check_allowed("foundry feature", &FoundryOutput::ALLOWED_FEATURES)?;
        self.immutable_features
            .check_allowed("foundry immutable feature", &FoundryOutput::ALLOWED_FEATURES)?;
        let mut output = FoundryOutput {
            amount: TokenAmount(0),
            native_tokens: self.native_tokens,
            foundry_id: FoundryId::build(
                &immutable_alias_address_unlock_condition.address,
                self.serial_number,
                self.token_scheme.kind(),
            ),
            serial_number: self.serial_number,
            token_scheme: self.token_scheme,
            immutable_alias_address_unlock_condition,
            features: self.features,
            immutable_features: self.immutable_features,
        };
        output.amount = resolve_amount(self.amount, &output, params)?;
        Ok(output)
    }
}

/// Builds a foundry output that holds the minimum storage deposit.
#[instrument(skip(token_scheme, unlock_conditions, params), err)]
pub fn build_foundry_output(
    serial_number: u32,
    token_scheme: TokenScheme,
    unlock_conditions: impl IntoIterator<Item = UnlockCondition>,
    params: &ProtocolParameters,
) -> Result<Output, Error> {
    let output = FoundryOutputBuilder::new(serial_number, token_scheme, unlock_conditions).finish(params)?;
    debug!(foundry_id = %output.foundry_id, amount = %output.amount, "built foundry output");
    Ok(output.into())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        output::{native_token::SimpleTokenScheme, unlock_condition::AddressUnlockCondition},
        utxo::{AliasAddress, AliasId, Ed25519Address},
    };

    fn alias() -> Address {
        AliasAddress(AliasId([7; 32])).into()
    }

    fn scheme(minted: u64, melted: u64, maximum_supply: u64) -> TokenScheme {
        SimpleTokenScheme {
            minted_tokens: minted.into(),
            melted_tokens: melted.into(),
            maximum_supply: maximum_supply.into(),
        }
        .into()
    }

    fn immutable_alias() -> UnlockCondition {
        ImmutableAliasAddressUnlockCondition::new(alias()).unwrap().into()
    }

    #[test]
    fn builds_minimal_foundry() {
        let output = FoundryOutputBuilder::new(1, scheme(0, 0, 1_000), [immutable_alias()])
            .finish(&ProtocolParameters::default())
            .unwrap();
        assert_eq!(output.packed_len(), 148);
        assert_eq!(output.amount, TokenAmount(52_800));
        assert_eq!(&output.token_id().0[..33], alias().pack_to_vec().as_slice());
        assert_eq!(&output.token_id().0[33..37], &1u32.to_le_bytes());
        assert_eq!(output.token_id().0[37], SimpleTokenScheme::KIND);
    }

    #[test]
    fn validation_order() {
        let params = ProtocolParameters::default();
        let address = UnlockCondition::from(AddressUnlockCondition {
            address: Ed25519Address([1; 32]).into(),
        });
        // Every rule is broken, the serial number is reported first.
        assert!(matches!(
            FoundryOutputBuilder::new(0, scheme(10, 0, 5), [address]).finish(&params),
            Err(Error::InvalidSerialNumber(0))
        ));
        assert!(matches!(
            FoundryOutputBuilder::new(1, scheme(10, 0, 5), [address]).finish(&params),
            Err(Error::TokenSchemeInvariantViolation { .. })
        ));
        assert!(matches!(
            FoundryOutputBuilder::new(1, scheme(0, 0, 5), [address]).finish(&params),
            Err(Error::InvalidUnlockConditionSet(_))
        ));
        assert!(matches!(
            FoundryOutputBuilder::new(1, scheme(0, 0, 5), [immutable_alias(), address]).finish(&params),
            Err(Error::InvalidUnlockConditionSet(_))
        ));
        assert!(matches!(
            FoundryOutputBuilder::new(1, scheme(0, 0, 5), [immutable_alias()])
                .with_amount(100)
                .finish(&params),
            Err(Error::InsufficientStorageDeposit { .. })
        ));
    }

    #[test]
    fn rejects_disallowed_features() {
        let result = FoundryOutputBuilder::new(1, scheme(0, 0, 5), [immutable_alias()])
            .with_features(
                Features::new([Feature::Tag {
                    data: b"tag".to_vec().into_boxed_slice(),
                }])
                .unwrap(),
            )
            .finish(&ProtocolParameters::default());
        assert!(matches!(result, Err(Error::InvalidFeature(_))));
    }

    #[test]
    fn immutable_alias_requires_alias_address() {
        assert!(ImmutableAliasAddressUnlockCondition::new(Ed25519Address([1; 32]).into()).is_err());
    }
}
