// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module that contains the types.

pub mod address;
pub mod block;
pub mod output;
pub mod protocol;
pub mod tangle;
pub mod util;

pub use self::{protocol::*, util::*};

pub mod utxo {
    //! A logical grouping of UTXO types for convenience.
    pub use super::{
        address::*,
        output::{unlock_condition::*, *},
    };
}

use ::serde::Serialize;
use mongodb::bson::Bson;

/// Helper trait for serializable types
pub trait SerializeToBson: Serialize {
    /// Serializes values to Bson infallibly
    fn to_bson(&self) -> Bson {
        // Unwrap: Cannot fail as the model types only contain BSON-representable data
        mongodb::bson::to_bson(self).unwrap()
    }
}
impl<T: Serialize> SerializeToBson for T {}
