// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`StateControllerAddressUnlockCondition`].

use serde::{Deserialize, Serialize};

use crate::model::{utxo::Address, Pack};

/// Defines the State Controller Address that owns an alias output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateControllerAddressUnlockCondition {
    /// The associated address of this [`StateControllerAddressUnlockCondition`].
    pub address: Address,
}

impl StateControllerAddressUnlockCondition {
    /// The kind byte of the unlock condition.
    pub const KIND: u8 = 4;
}

impl Pack for StateControllerAddressUnlockCondition {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::KIND.pack(buf);
        self.address.pack(buf);
    }
}
