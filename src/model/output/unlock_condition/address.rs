// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`AddressUnlockCondition`].

use serde::{Deserialize, Serialize};

use crate::model::{utxo::Address, Pack};

/// Defines the Address that owns an output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressUnlockCondition {
    /// The associated address of this [`AddressUnlockCondition`].
    pub address: Address,
}

impl AddressUnlockCondition {
    /// The kind byte of the unlock condition.
    pub const KIND: u8 = 0;
}

impl From<Address> for AddressUnlockCondition {
    fn from(address: Address) -> Self {
        Self { address }
    }
}

impl Pack for AddressUnlockCondition {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::KIND.pack(buf);
        self.address.pack(buf);
    }
}
