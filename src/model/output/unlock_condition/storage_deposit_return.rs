// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`StorageDepositReturnUnlockCondition`].

use serde::{Deserialize, Serialize};

use crate::model::{stringify, utxo::Address, Pack};

/// Defines the amount of tokens used as storage deposit that have to be returned to the return address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDepositReturnUnlockCondition {
    /// The address to which funds will be returned once the storage deposit is unlocked.
    pub return_address: Address,
    /// The amount held in storage.
    #[serde(with = "stringify")]
    pub amount: u64,
}

impl StorageDepositReturnUnlockCondition {
    /// The kind byte of the unlock condition.
    pub const KIND: u8 = 1;
}

impl Pack for StorageDepositReturnUnlockCondition {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::KIND.pack(buf);
        self.return_address.pack(buf);
        self.amount.pack(buf);
    }
}
