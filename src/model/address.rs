// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Address`] types.

use std::fmt;

use bech32::{FromBase32, ToBase32, Variant};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::{
    model::{
        output::{AliasId, NftId},
        util::{impl_id, Pack},
    },
    Error,
};

impl_id!(
    /// A regular Ed25519 address, the BLAKE2b-256 hash of the public key.
    Ed25519Address,
    32
);

/// An address of an alias.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasAddress(pub AliasId);

/// An address of an NFT.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NftAddress(pub NftId);

/// The different [`Address`] types supported by the network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Address {
    /// An Ed25519 address.
    Ed25519(Ed25519Address),
    /// An alias address.
    Alias(AliasAddress),
    /// An NFT address.
    Nft(NftAddress),
}

impl Address {
    /// The kind byte of an Ed25519 address.
    pub const ED25519_KIND: u8 = 0;
    /// The kind byte of an alias address.
    pub const ALIAS_KIND: u8 = 8;
    /// The kind byte of an NFT address.
    pub const NFT_KIND: u8 = 16;
    /// The number of bytes of a packed address.
    pub const PACKED_LENGTH: usize = 33;

    /// Returns the kind byte of the address.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Ed25519(_) => Self::ED25519_KIND,
            Self::Alias(_) => Self::ALIAS_KIND,
            Self::Nft(_) => Self::NFT_KIND,
        }
    }

    /// Returns `true` if this is an [`AliasAddress`].
    pub fn is_alias(&self) -> bool {
        matches!(self, Self::Alias(_))
    }

    fn hash_bytes(&self) -> &[u8; 32] {
        match self {
            Self::Ed25519(Ed25519Address(bytes)) => bytes,
            Self::Alias(AliasAddress(AliasId(bytes))) => bytes,
            Self::Nft(NftAddress(NftId(bytes))) => bytes,
        }
    }

    /// Decodes a bech32 string, requiring the human-readable part to equal `expected_hrp`.
    pub fn try_from_bech32(bech32: &str, expected_hrp: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidAddress(bech32.to_string());
        if bech32.is_empty() {
            return Err(invalid());
        }
        let (hrp, data, variant) = bech32::decode(bech32).map_err(|_| invalid())?;
        if hrp != expected_hrp || variant != Variant::Bech32 {
            return Err(invalid());
        }
        let bytes = Vec::<u8>::from_base32(&data).map_err(|_| invalid())?;
        Self::try_from_bytes(&bytes).ok_or_else(invalid)
    }

    /// Encodes the address as bech32 with the given human-readable part.
    pub fn to_bech32(&self, hrp: &str) -> String {
        // Unwrap: The payload is always 33 bytes, so only an invalid HRP could fail, which would be a programming
        // error in the protocol parameters.
        bech32::encode(hrp, self.pack_to_vec().to_base32(), Variant::Bech32).unwrap()
    }

    fn try_from_bytes(bytes: &[u8]) -> Option<Self> {
        let (kind, hash) = bytes.split_first()?;
        let hash: [u8; 32] = hash.try_into().ok()?;
        Some(match *kind {
            Self::ED25519_KIND => Self::Ed25519(Ed25519Address(hash)),
            Self::ALIAS_KIND => Self::Alias(AliasAddress(AliasId(hash))),
            Self::NFT_KIND => Self::Nft(NftAddress(NftId(hash))),
            _ => return None,
        })
    }
}

impl Pack for Address {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.kind().pack(buf);
        self.hash_bytes().pack(buf);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519(a) => write!(f, "ed25519:{a}"),
            Self::Alias(a) => write!(f, "alias:{}", a.0),
            Self::Nft(a) => write!(f, "nft:{}", a.0),
        }
    }
}

impl From<Ed25519Address> for Address {
    fn from(value: Ed25519Address) -> Self {
        Self::Ed25519(value)
    }
}

impl From<AliasAddress> for Address {
    fn from(value: AliasAddress) -> Self {
        Self::Alias(value)
    }
}

impl From<NftAddress> for Address {
    fn from(value: NftAddress) -> Self {
        Self::Nft(value)
    }
}

impl From<Address> for Bson {
    fn from(val: Address) -> Self {
        // Unwrap: Cannot fail as type is well defined
        mongodb::bson::to_bson(&val).unwrap()
    }
}

#[cfg(test)]
mod test {
    use mongodb::bson::from_bson;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::SerializeToBson;

    #[test]
    fn bech32_round_trip() {
        let address = Address::Ed25519(Ed25519Address([7; 32]));
        let bech32 = address.to_bech32("rms");
        assert!(bech32.starts_with("rms1"));
        assert_eq!(Address::try_from_bech32(&bech32, "rms").unwrap(), address);
    }

    #[test]
    fn rejects_wrong_prefix_and_garbage() {
        let bech32 = Address::Alias(AliasAddress(AliasId([1; 32]))).to_bech32("smr");
        assert!(matches!(
            Address::try_from_bech32(&bech32, "rms"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(Address::try_from_bech32("", "rms"), Err(Error::InvalidAddress(_))));
        assert!(matches!(
            Address::try_from_bech32("rms1notanaddress", "rms"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn address_bson() {
        let address = Address::Nft(NftAddress(NftId([3; 32])));
        let bson = address.to_bson();
        assert_eq!(Bson::from(address), bson);
        assert_eq!(address, from_bson::<Address>(bson).unwrap());
    }
}
