// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Model utilities

pub mod pack;
pub mod serde;

pub use self::{pack::Pack, serde::*};

/// Defines a fixed-length identifier that is represented as `0x`-prefixed hex.
macro_rules! impl_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(#[serde(with = "crate::model::util::prefix_hex_bytes")] pub [u8; $len]);

        impl $name {
            /// The number of bytes of the id.
            pub const LENGTH: usize = $len;

            /// Converts the id to its `0x`-prefixed hex representation.
            pub fn to_hex(&self) -> String {
                prefix_hex::encode(self.0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = prefix_hex::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(prefix_hex::decode(s)?))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl crate::model::util::Pack for $name {
            fn pack(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.0);
            }
        }

        impl From<$name> for ::mongodb::bson::Bson {
            fn from(val: $name) -> Self {
                ::mongodb::bson::Bson::String(val.to_hex())
            }
        }
    };
}
pub(crate) use impl_id;
