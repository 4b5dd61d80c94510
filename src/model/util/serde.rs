// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Serde helpers shared by the model types.

/// A Serde helper module for converting values to [`String`].
pub mod stringify {
    use std::{fmt::Display, marker::PhantomData, str::FromStr};

    use serde::{de::Visitor, Deserializer, Serializer};

    /// Deserialize T using [`FromStr`]
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        struct Helper<S>(PhantomData<S>);

        impl<'de, S> Visitor<'de> for Helper<S>
        where
            S: FromStr,
            <S as FromStr>::Err: Display,
        {
            type Value = S;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "a string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse::<Self::Value>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(Helper(PhantomData))
    }

    /// Serialize T using [`Display`]
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(&value)
    }
}

/// Serializes fixed-size byte arrays as `0x`-prefixed hex strings.
pub mod prefix_hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialize the bytes as a `0x`-prefixed hex string.
    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&prefix_hex::encode(*bytes))
    }

    /// Deserialize the bytes from a `0x`-prefixed hex string.
    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = prefix_hex::decode::<Vec<u8>>(&s).map_err(de::Error::custom)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| de::Error::custom(format!("expected {} bytes, found {}", N, len)))
    }
}

/// Serializes [`U256`](primitive_types::U256) values as fixed-width, big-endian, `0x`-prefixed hex strings.
///
/// The fixed width makes the lexical order of the strings equal to the numeric order of the values, which is what
/// range filters over stored documents rely on.
pub mod u256_hex {
    use primitive_types::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Encodes the value as a 64-character hex string.
    pub fn encode(value: &U256) -> String {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        prefix_hex::encode(bytes)
    }

    /// Decodes a hex string of at most 32 bytes.
    pub fn decode(s: &str) -> Result<U256, String> {
        let bytes = prefix_hex::decode::<Vec<u8>>(s).map_err(|e| e.to_string())?;
        if bytes.len() > 32 {
            return Err(format!("`{s}` exceeds 256 bits"));
        }
        Ok(U256::from_big_endian(&bytes))
    }

    /// Serialize the value.
    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&encode(value))
    }

    /// Deserialize the value.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        decode(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use primitive_types::U256;
    use pretty_assertions::assert_eq;

    use super::u256_hex;
    use crate::model::{block::BlockId, output::FoundryId};

    #[test]
    fn u256_hex_is_order_preserving() {
        let small = u256_hex::encode(&U256::from(255));
        let large = u256_hex::encode(&U256::from(256));
        assert_eq!(small.len(), 66);
        assert!(small < large);
        assert_eq!(u256_hex::decode(&large).unwrap(), U256::from(256));
        assert_eq!(u256_hex::decode("0x0100").unwrap(), U256::from(256));
    }

    #[test]
    fn prefix_hex_bytes_checks_length() {
        let block_id = BlockId([7; 32]);
        let json = serde_json::to_string(&block_id).unwrap();
        assert_eq!(serde_json::from_str::<BlockId>(&json).unwrap(), block_id);
        assert!(serde_json::from_str::<BlockId>("\"0x0707\"").is_err());

        let foundry_id = FoundryId([9; 38]);
        let json = serde_json::to_string(&foundry_id).unwrap();
        assert_eq!(serde_json::from_str::<FoundryId>(&json).unwrap(), foundry_id);
    }
}
