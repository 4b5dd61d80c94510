// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Output`] types.

pub mod feature;
pub mod native_token;
pub mod unlock_condition;

// The different output types
pub mod alias;
pub mod basic;
pub mod foundry;
pub mod nft;

use std::{fmt, str::FromStr};

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

pub use self::{
    alias::{AliasId, AliasOutput},
    basic::{BasicOutput, BasicOutputBuilder},
    feature::{Feature, Features},
    foundry::{FoundryId, FoundryOutput, FoundryOutputBuilder},
    native_token::{NativeToken, NativeTokens, SimpleTokenScheme, TokenId, TokenScheme},
    nft::{NftId, NftOutput},
    unlock_condition::{UnlockCondition, UnlockConditions},
};
use crate::{
    model::{
        block::{BlockId, TransactionId},
        protocol::{ProtocolParameters, RentStructure},
        stringify,
        tangle::MilestoneIndexTimestamp,
        utxo::Address,
        Pack,
    },
    Error,
};

/// An amount of base tokens.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sum,
    derive_more::Display,
)]
pub struct TokenAmount(#[serde(with = "stringify")] pub u64);

impl From<TokenAmount> for Bson {
    fn from(value: TokenAmount) -> Self {
        // Amounts are stored as strings, so this has to match the serde representation.
        Bson::String(value.0.to_string())
    }
}

/// The index of an output within a transaction.
pub type OutputIndex = u16;

/// An id which uniquely identifies an output. It is computed from the corresponding [`TransactionId`], as well as
/// the [`OutputIndex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputId {
    /// The transaction id part of the [`OutputId`].
    pub transaction_id: TransactionId,
    /// The output index part of the [`OutputId`].
    pub index: OutputIndex,
}

impl OutputId {
    /// The number of bytes of a packed output id.
    pub const LENGTH: usize = TransactionId::LENGTH + std::mem::size_of::<OutputIndex>();

    /// Creates an output id.
    pub fn new(transaction_id: TransactionId, index: OutputIndex) -> Self {
        Self { transaction_id, index }
    }

    /// Converts the [`OutputId`] to its `0x`-prefixed hex representation.
    pub fn to_hex(&self) -> String {
        prefix_hex::encode(self.pack_to_vec())
    }
}

impl Pack for OutputId {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.transaction_id.pack(buf);
        self.index.pack(buf);
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for OutputId {
    type Err = prefix_hex::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; Self::LENGTH] = prefix_hex::decode(s)?;
        let mut transaction_id = [0; TransactionId::LENGTH];
        transaction_id.copy_from_slice(&bytes[..TransactionId::LENGTH]);
        Ok(Self {
            transaction_id: TransactionId(transaction_id),
            index: u16::from_le_bytes([bytes[TransactionId::LENGTH], bytes[TransactionId::LENGTH + 1]]),
        })
    }
}

impl From<OutputId> for Bson {
    fn from(val: OutputId) -> Self {
        // Unwrap: Cannot fail as type is well defined
        mongodb::bson::to_bson(&val).unwrap()
    }
}

/// The kind of an [`Output`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum OutputKind {
    #[display(fmt = "basic")]
    Basic,
    #[display(fmt = "alias")]
    Alias,
    #[display(fmt = "foundry")]
    Foundry,
    #[display(fmt = "nft")]
    Nft,
}

impl OutputKind {
    /// The type byte that starts the packed output.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Basic => BasicOutput::TYPE,
            Self::Alias => AliasOutput::TYPE,
            Self::Foundry => FoundryOutput::TYPE,
            Self::Nft => NftOutput::TYPE,
        }
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "basic" => Self::Basic,
            "alias" => Self::Alias,
            "foundry" => Self::Foundry,
            "nft" => Self::Nft,
            _ => return Err(format!("unknown output kind `{s}`")),
        })
    }
}

/// Represents the different output types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(rename_all = "snake_case", tag = "kind")]
#[allow(missing_docs)]
pub enum Output {
    Basic(BasicOutput),
    Alias(AliasOutput),
    Foundry(FoundryOutput),
    Nft(NftOutput),
}

impl Output {
    /// Returns the [`Address`] that is in control of the output.
    ///
    /// For alias outputs this is the state controller, for foundries the controlling alias.
    pub fn owning_address(&self) -> &Address {
        match self {
            Self::Basic(BasicOutput {
                address_unlock_condition,
                ..
            }) => &address_unlock_condition.address,
            Self::Alias(AliasOutput {
                state_controller_address_unlock_condition,
                ..
            }) => &state_controller_address_unlock_condition.address,
            Self::Foundry(FoundryOutput {
                immutable_alias_address_unlock_condition,
                ..
            }) => &immutable_alias_address_unlock_condition.address,
            Self::Nft(NftOutput {
                address_unlock_condition,
                ..
            }) => &address_unlock_condition.address,
        }
    }

    /// Returns the amount of base tokens held by the output.
    pub fn amount(&self) -> TokenAmount {
        match self {
            Self::Basic(BasicOutput { amount, .. }) => *amount,
            Self::Alias(AliasOutput { amount, .. }) => *amount,
            Self::Foundry(FoundryOutput { amount, .. }) => *amount,
            Self::Nft(NftOutput { amount, .. }) => *amount,
        }
    }

    /// Returns the kind of the output.
    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Basic(_) => OutputKind::Basic,
            Self::Alias(_) => OutputKind::Alias,
            Self::Foundry(_) => OutputKind::Foundry,
            Self::Nft(_) => OutputKind::Nft,
        }
    }

    /// Returns the native tokens held by the output.
    pub fn native_tokens(&self) -> &NativeTokens {
        match self {
            Self::Basic(BasicOutput { native_tokens, .. }) => native_tokens,
            Self::Alias(AliasOutput { native_tokens, .. }) => native_tokens,
            Self::Foundry(FoundryOutput { native_tokens, .. }) => native_tokens,
            Self::Nft(NftOutput { native_tokens, .. }) => native_tokens,
        }
    }

    /// Returns the features of the output.
    pub fn features(&self) -> &Features {
        match self {
            Self::Basic(BasicOutput { features, .. }) => features,
            Self::Alias(AliasOutput { features, .. }) => features,
            Self::Foundry(FoundryOutput { features, .. }) => features,
            Self::Nft(NftOutput { features, .. }) => features,
        }
    }

    /// Collects the unlock conditions of the output into a set.
    pub fn unlock_conditions(&self) -> UnlockConditions {
        match self {
            Self::Basic(o) => o.unlock_conditions(),
            Self::Alias(o) => o.unlock_conditions(),
            Self::Foundry(o) => o.unlock_conditions(),
            Self::Nft(o) => o.unlock_conditions(),
        }
    }

    /// Returns `true` if the owning address can unlock the output without any further conditions.
    pub fn is_trivial_unlock(&self) -> bool {
        match self {
            Self::Basic(BasicOutput {
                storage_deposit_return_unlock_condition,
                timelock_unlock_condition,
                expiration_unlock_condition,
                ..
            })
            | Self::Nft(NftOutput {
                storage_deposit_return_unlock_condition,
                timelock_unlock_condition,
                expiration_unlock_condition,
                ..
            }) => {
                storage_deposit_return_unlock_condition.is_none()
                    && timelock_unlock_condition.is_none()
                    && expiration_unlock_condition.is_none()
            }
            Self::Alias(_) | Self::Foundry(_) => true,
        }
    }

    /// Computes the number of key and data bytes the output is charged for.
    pub fn rent_structure(&self) -> RentStructureBytes {
        RentStructureBytes::compute(self)
    }

    /// The minimum amount of base tokens the output has to hold under the given rent structure.
    pub fn min_deposit(&self, rent_structure: &RentStructure) -> u64 {
        self.rent_structure().cost(rent_structure)
    }
}

impl Pack for Output {
    fn pack(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Basic(o) => o.pack(buf),
            Self::Alias(o) => o.pack(buf),
            Self::Foundry(o) => o.pack(buf),
            Self::Nft(o) => o.pack(buf),
        }
    }
}

/// An unspent output according to the ledger.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct LedgerOutput {
    pub output_id: OutputId,
    pub block_id: BlockId,
    pub booked: MilestoneIndexTimestamp,
    pub output: Output,
}

#[allow(missing_docs)]
impl LedgerOutput {
    pub fn output_id(&self) -> OutputId {
        self.output_id
    }

    pub fn amount(&self) -> TokenAmount {
        self.output.amount()
    }

    pub fn owning_address(&self) -> &Address {
        self.output.owning_address()
    }
}

/// The different number of bytes that are used for computing the rent cost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentStructureBytes {
    /// The number of key bytes in an output.
    pub num_key_bytes: u64,
    /// The number of data bytes in an output.
    pub num_data_bytes: u64,
}

impl RentStructureBytes {
    /// Block id, booked milestone index and booked milestone timestamp stored alongside every output.
    const METADATA_BYTES: usize = BlockId::LENGTH + 2 * std::mem::size_of::<u32>();

    /// Counts the bytes of an output. The output id is the key, the packed output and its metadata are the data.
    pub fn compute(output: &impl Pack) -> Self {
        RentStructureBytes {
            num_key_bytes: OutputId::LENGTH as u64,
            num_data_bytes: (output.packed_len() + Self::METADATA_BYTES) as u64,
        }
    }

    /// Weighs the bytes with the rent structure.
    pub fn cost(&self, rent_structure: &RentStructure) -> u64 {
        rent_structure.v_byte_cost as u64
            * (self.num_key_bytes * rent_structure.v_byte_factor_key as u64
                + self.num_data_bytes * rent_structure.v_byte_factor_data as u64)
    }
}

/// Uses the minimum deposit of `output` when no amount is given, and checks the amount against the protocol bounds
/// otherwise.
pub(crate) fn resolve_amount(
    amount: Option<u64>,
    output: &impl Pack,
    params: &ProtocolParameters,
) -> Result<TokenAmount, Error> {
    let required = RentStructureBytes::compute(output).cost(&params.rent_structure);
    let amount = amount.unwrap_or(required);
    if amount > params.token_supply {
        return Err(Error::InvalidAmount(amount));
    }
    if amount < required {
        return Err(Error::InsufficientStorageDeposit { amount, required });
    }
    Ok(TokenAmount(amount))
}

#[cfg(test)]
mod test {
    use mongodb::bson::from_bson;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{utxo::Ed25519Address, SerializeToBson};

    fn simple_basic_output() -> Output {
        BasicOutputBuilder::new(Ed25519Address([1; 32]).into())
            .with_amount(1_000_000)
            .finish(&Default::default())
            .unwrap()
            .into()
    }

    #[test]
    fn output_id_hex() {
        let output_id = OutputId::new(TransactionId([9; 32]), 258);
        let hex = output_id.to_hex();
        assert!(hex.ends_with("0201"));
        assert_eq!(hex.parse::<OutputId>().unwrap(), output_id);
        assert_eq!(output_id.packed_len(), OutputId::LENGTH);
    }

    #[test]
    fn simple_basic_output_min_deposit() {
        let output = simple_basic_output();
        assert_eq!(output.packed_len(), 46);
        assert_eq!(
            output.rent_structure(),
            RentStructureBytes {
                num_key_bytes: 34,
                num_data_bytes: 86,
            }
        );
        assert_eq!(output.min_deposit(&Default::default()), 42_600);
        assert!(output.is_trivial_unlock());
    }

    #[test]
    fn output_bson() {
        let output = simple_basic_output();
        let bson = output.to_bson();
        let doc = bson.as_document().unwrap();
        assert_eq!(doc.get_str("kind").unwrap(), "basic");
        assert_eq!(doc.get_str("amount").unwrap(), "1000000");
        assert_eq!(output, from_bson::<Output>(bson).unwrap());
    }

    #[test]
    fn output_json() {
        let output = simple_basic_output();
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(output, serde_json::from_str::<Output>(&json).unwrap());
        assert_eq!(output.kind(), OutputKind::Basic);
        assert_eq!(output.kind().to_string(), "basic");
    }
}
