// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing milestone index and time types.

use std::{fmt, num::ParseIntError, str::FromStr};

use derive_more::{Add, Deref, DerefMut, Sub};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The index of a milestone.
#[derive(
    Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize, Add, Sub, Deref, DerefMut,
)]
#[serde(transparent)]
pub struct MilestoneIndex(pub u32);

impl fmt::Display for MilestoneIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for MilestoneIndex {
    fn from(value: u32) -> Self {
        MilestoneIndex(value)
    }
}

impl From<MilestoneIndex> for Bson {
    fn from(value: MilestoneIndex) -> Self {
        Bson::from(value.0)
    }
}

impl FromStr for MilestoneIndex {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(u32::from_str(s)?.into())
    }
}

/// A Unix timestamp in seconds, as carried by milestones and by time-based unlock conditions.
#[derive(
    Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize, Add, Sub, Deref, DerefMut,
)]
#[serde(transparent)]
pub struct MilestoneTimestamp(pub u32);

impl MilestoneTimestamp {
    /// The current wall-clock time, saturating at the bounds of the `u32` range.
    pub fn now() -> Self {
        let secs = OffsetDateTime::now_utc().unix_timestamp();
        Self(secs.clamp(0, u32::MAX as i64) as u32)
    }

    /// The number of seconds from `self` until `later`, or zero if `later` is not after `self`.
    pub fn seconds_until(&self, later: MilestoneTimestamp) -> u32 {
        later.0.saturating_sub(self.0)
    }
}

impl fmt::Display for MilestoneTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for MilestoneTimestamp {
    fn from(value: u32) -> Self {
        MilestoneTimestamp(value)
    }
}

impl From<MilestoneTimestamp> for Bson {
    fn from(value: MilestoneTimestamp) -> Self {
        Bson::from(value.0)
    }
}

impl FromStr for MilestoneTimestamp {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(u32::from_str(s)?.into())
    }
}

impl TryFrom<MilestoneTimestamp> for OffsetDateTime {
    type Error = time::error::ComponentRange;

    fn try_from(value: MilestoneTimestamp) -> Result<Self, Self::Error> {
        OffsetDateTime::from_unix_timestamp(value.0 as i64)
    }
}

/// [`MilestoneIndex`] and [`MilestoneTimestamp`] pair.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash, Ord, PartialOrd)]
#[allow(missing_docs)]
pub struct MilestoneIndexTimestamp {
    pub milestone_index: MilestoneIndex,
    pub milestone_timestamp: MilestoneTimestamp,
}

impl From<MilestoneIndexTimestamp> for Bson {
    fn from(value: MilestoneIndexTimestamp) -> Self {
        // Unwrap: Cannot fail as type is well defined
        mongodb::bson::to_bson(&value).unwrap()
    }
}
