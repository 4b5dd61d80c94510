// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`GovernorAddressUnlockCondition`].

use serde::{Deserialize, Serialize};

use crate::model::{utxo::Address, Pack};

/// Defines the Governor Address that owns an alias output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorAddressUnlockCondition {
    /// The associated address of this [`GovernorAddressUnlockCondition`].
    pub address: Address,
}

impl GovernorAddressUnlockCondition {
    /// The kind byte of the unlock condition.
    pub const KIND: u8 = 5;
}

impl Pack for GovernorAddressUnlockCondition {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::KIND.pack(buf);
        self.address.pack(buf);
    }
}
