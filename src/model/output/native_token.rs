// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing native token and token scheme types.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{
    model::{pack::pack_u8_prefixed, u256_hex, util::impl_id, Pack},
    Error,
};

impl_id!(
    /// The identifier of a native token. Equal to the id of the foundry that controls its supply.
    TokenId,
    38
);

/// A native token amount held by an output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeToken {
    /// The corresponding token id.
    pub token_id: TokenId,
    /// The amount of native tokens.
    #[serde(with = "u256_hex")]
    pub amount: U256,
}

impl Pack for NativeToken {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.token_id.pack(buf);
        self.amount.pack(buf);
    }
}

/// The native tokens of an output, sorted by token id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NativeToken>", into = "Vec<NativeToken>")]
pub struct NativeTokens(Vec<NativeToken>);

impl NativeTokens {
    /// The maximum number of distinct native tokens an output can hold.
    pub const COUNT_MAX: usize = 64;

    /// Validates a list of native tokens: ids must be unique, amounts nonzero and there are at most
    /// [`NativeTokens::COUNT_MAX`] of them.
    pub fn new(tokens: impl IntoIterator<Item = NativeToken>) -> Result<Self, Error> {
        let mut tokens = tokens.into_iter().collect::<Vec<_>>();
        if tokens.len() > Self::COUNT_MAX {
            return Err(Error::NativeTokenCount(tokens.len()));
        }
        tokens.sort_by_key(|t| t.token_id);
        for pair in tokens.windows(2) {
            if pair[0].token_id == pair[1].token_id {
                return Err(Error::DuplicateNativeToken(pair[0].token_id));
            }
        }
        if let Some(token) = tokens.iter().find(|t| t.amount.is_zero()) {
            return Err(Error::ZeroNativeTokenAmount(token.token_id));
        }
        Ok(Self(tokens))
    }

    /// Adds up the native tokens of several outputs.
    pub fn sum<'a>(all: impl IntoIterator<Item = &'a NativeTokens>) -> Result<Self, Error> {
        let mut totals = std::collections::BTreeMap::<TokenId, U256>::new();
        for token in all.into_iter().flat_map(|tokens| tokens.iter()) {
            let total = totals.entry(token.token_id).or_default();
            *total = total
                .checked_add(token.amount)
                .ok_or(Error::NativeTokenOverflow(token.token_id))?;
        }
        Self::new(
            totals
                .into_iter()
                .map(|(token_id, amount)| NativeToken { token_id, amount }),
        )
    }

    /// Iterates over the native tokens in token id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &NativeToken> {
        self.0.iter()
    }

    /// Returns the amount held of a given token.
    pub fn get(&self, token_id: &TokenId) -> Option<U256> {
        self.0.iter().find(|t| &t.token_id == token_id).map(|t| t.amount)
    }

    /// The number of distinct native tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no native tokens.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<NativeToken>> for NativeTokens {
    type Error = Error;

    fn try_from(value: Vec<NativeToken>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NativeTokens> for Vec<NativeToken> {
    fn from(value: NativeTokens) -> Self {
        value.0
    }
}

impl Pack for NativeTokens {
    fn pack(&self, buf: &mut Vec<u8>) {
        pack_u8_prefixed(self.0.iter(), buf);
    }
}

/// The simple token scheme: tokens are minted and melted within a fixed maximum supply.
///
/// The fields are public so that any state can be expressed; [`SimpleTokenScheme::validate`] checks the invariants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTokenScheme {
    /// Amount of tokens minted.
    #[serde(with = "u256_hex")]
    pub minted_tokens: U256,
    /// Amount of tokens melted.
    #[serde(with = "u256_hex")]
    pub melted_tokens: U256,
    /// Maximum supply of the token.
    #[serde(with = "u256_hex")]
    pub maximum_supply: U256,
}

impl SimpleTokenScheme {
    /// The kind byte of the token scheme.
    pub const KIND: u8 = 0;

    /// Creates a scheme and checks its invariants.
    pub fn new(minted_tokens: U256, melted_tokens: U256, maximum_supply: U256) -> Result<Self, Error> {
        let scheme = Self {
            minted_tokens,
            melted_tokens,
            maximum_supply,
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Checks that `melted <= minted`, that `minted - melted <= maximum_supply` and that the maximum supply is not
    /// zero.
    pub fn validate(&self) -> Result<(), Error> {
        match self.circulating_supply() {
            Some(circulating) if circulating <= self.maximum_supply && !self.maximum_supply.is_zero() => Ok(()),
            _ => Err(Error::TokenSchemeInvariantViolation {
                minted: self.minted_tokens,
                melted: self.melted_tokens,
                maximum_supply: self.maximum_supply,
            }),
        }
    }

    /// The amount of tokens in circulation, or `None` if more tokens were melted than minted.
    pub fn circulating_supply(&self) -> Option<U256> {
        self.minted_tokens.checked_sub(self.melted_tokens)
    }
}

/// The token scheme of a foundry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TokenScheme {
    /// The simple token scheme.
    Simple(SimpleTokenScheme),
}

impl TokenScheme {
    /// Returns the kind byte of the token scheme.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Simple(_) => SimpleTokenScheme::KIND,
        }
    }

    /// Checks the invariants of the scheme.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Self::Simple(scheme) => scheme.validate(),
        }
    }
}

impl Pack for TokenScheme {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.kind().pack(buf);
        match self {
            Self::Simple(scheme) => {
                scheme.minted_tokens.pack(buf);
                scheme.melted_tokens.pack(buf);
                scheme.maximum_supply.pack(buf);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn token(id: u8, amount: u64) -> NativeToken {
        NativeToken {
            token_id: TokenId([id; 38]),
            amount: amount.into(),
        }
    }

    #[test]
    fn native_tokens_are_sorted_and_unique() {
        let tokens = NativeTokens::new([token(2, 5), token(1, 7)]).unwrap();
        assert_eq!(tokens.iter().next().unwrap().token_id, TokenId([1; 38]));
        assert!(matches!(
            NativeTokens::new([token(1, 5), token(1, 7)]),
            Err(Error::DuplicateNativeToken(_))
        ));
        assert!(matches!(
            NativeTokens::new([token(1, 0)]),
            Err(Error::ZeroNativeTokenAmount(_))
        ));
        assert!(matches!(
            NativeTokens::new((0..65).map(|i| token(i, 1))),
            Err(Error::NativeTokenCount(65))
        ));
    }

    #[test]
    fn native_tokens_sum() {
        let a = NativeTokens::new([token(1, 5), token(2, 1)]).unwrap();
        let b = NativeTokens::new([token(1, 7)]).unwrap();
        let total = NativeTokens::sum([&a, &b]).unwrap();
        assert_eq!(total.get(&TokenId([1; 38])), Some(12.into()));
        assert_eq!(total.len(), 2);
    }

    #[test]
    fn token_scheme_invariants() {
        assert!(SimpleTokenScheme::new(0.into(), 0.into(), 100.into()).is_ok());
        assert!(SimpleTokenScheme::new(150.into(), 50.into(), 100.into()).is_ok());
        assert!(matches!(
            SimpleTokenScheme::new(151.into(), 50.into(), 100.into()),
            Err(Error::TokenSchemeInvariantViolation { .. })
        ));
        assert!(SimpleTokenScheme::new(5.into(), 6.into(), 100.into()).is_err());
        assert!(SimpleTokenScheme::new(0.into(), 0.into(), 0.into()).is_err());
    }

    #[test]
    fn token_scheme_json() {
        let scheme = TokenScheme::from(SimpleTokenScheme::new(10.into(), 0.into(), 100.into()).unwrap());
        let json = serde_json::to_value(scheme).unwrap();
        assert_eq!(json["kind"], "simple");
        assert_eq!(
            json["maximum_supply"],
            "0x0000000000000000000000000000000000000000000000000000000000000064"
        );
        assert_eq!(scheme.packed_len(), 1 + 3 * 32);
    }
}
