// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`TimelockUnlockCondition`].

use serde::{Deserialize, Serialize};

use crate::model::{tangle::MilestoneTimestamp, Pack};

/// Defines a unix timestamp until which the output can not be unlocked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockUnlockCondition {
    /// The timestamp before which the output is locked.
    pub timestamp: MilestoneTimestamp,
}

impl TimelockUnlockCondition {
    /// The kind byte of the unlock condition.
    pub const KIND: u8 = 2;

    /// Returns `true` while `now` is before the timelock.
    pub fn is_timelocked(&self, now: MilestoneTimestamp) -> bool {
        now < self.timestamp
    }
}

impl Pack for TimelockUnlockCondition {
    fn pack(&self, buf: &mut Vec<u8>) {
        Self::KIND.pack(buf);
        self.timestamp.0.pack(buf);
    }
}
