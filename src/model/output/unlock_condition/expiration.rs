// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`ExpirationUnlockCondition`].

use serde::{Deserialize, Serialize};

use crate::model::{tangle::MilestoneTimestamp, utxo::Address, Pack};

/// Defines a unix time until which only the owner can unlock the output. After that only the return address can.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationUnlockCondition {
    /// The address that controls the output once it expired.
    pub return_address: Address,
    /// The timestamp from which on the output is expired.
    pub timestamp: MilestoneTimestamp,
}

impl ExpirationUnlockCondition {
    /// The kind byte of the unlock condition.
    pub const KIND: u8 = 3;

    /// Returns `true` once `now` reached the expiration time.
    pub fn is_expired(&self, now: MilestoneTimestamp) -> bool {
        now >= self.timestamp
    }
}

impl Pack for ExpirationUnlockCondition {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::KIND.pack(buf);
        self.return_address.pack(buf);
        self.timestamp.0.pack(buf);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::utxo::Ed25519Address;

    #[test]
    fn expiration_boundary_is_inclusive() {
        let condition = ExpirationUnlockCondition {
            return_address: Ed25519Address([1; 32]).into(),
            timestamp: 1000.into(),
        };
        assert!(!condition.is_expired(999.into()));
        assert!(condition.is_expired(1000.into()));
        assert_eq!(condition.packed_len(), 1 + 33 + 4);
    }
}
