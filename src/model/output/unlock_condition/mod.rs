// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing unlock condition types.

pub mod address;
pub mod expiration;
pub mod governor_address;
pub mod immutable_alias_address;
pub mod state_controller_address;
pub mod storage_deposit_return;
pub mod timelock;

use serde::{Deserialize, Serialize};

pub use self::{
    address::AddressUnlockCondition, expiration::ExpirationUnlockCondition,
    governor_address::GovernorAddressUnlockCondition, immutable_alias_address::ImmutableAliasAddressUnlockCondition,
    state_controller_address::StateControllerAddressUnlockCondition,
    storage_deposit_return::StorageDepositReturnUnlockCondition, timelock::TimelockUnlockCondition,
};
use crate::{
    model::{pack::pack_u8_prefixed, Pack},
    Error,
};

/// A predicate that must hold for an output to be unlocked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(rename_all = "snake_case", tag = "kind")]
#[allow(missing_docs)]
pub enum UnlockCondition {
    Address(AddressUnlockCondition),
    StorageDepositReturn(StorageDepositReturnUnlockCondition),
    Timelock(TimelockUnlockCondition),
    Expiration(ExpirationUnlockCondition),
    StateControllerAddress(StateControllerAddressUnlockCondition),
    GovernorAddress(GovernorAddressUnlockCondition),
    ImmutableAliasAddress(ImmutableAliasAddressUnlockCondition),
}

impl UnlockCondition {
    /// Returns the kind byte of the unlock condition.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Address(_) => AddressUnlockCondition::KIND,
            Self::StorageDepositReturn(_) => StorageDepositReturnUnlockCondition::KIND,
            Self::Timelock(_) => TimelockUnlockCondition::KIND,
            Self::Expiration(_) => ExpirationUnlockCondition::KIND,
            Self::StateControllerAddress(_) => StateControllerAddressUnlockCondition::KIND,
            Self::GovernorAddress(_) => GovernorAddressUnlockCondition::KIND,
            Self::ImmutableAliasAddress(_) => ImmutableAliasAddressUnlockCondition::KIND,
        }
    }

    /// Returns the name used for the unlock condition in documents and messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::StorageDepositReturn(_) => "storage_deposit_return",
            Self::Timelock(_) => "timelock",
            Self::Expiration(_) => "expiration",
            Self::StateControllerAddress(_) => "state_controller_address",
            Self::GovernorAddress(_) => "governor_address",
            Self::ImmutableAliasAddress(_) => "immutable_alias_address",
        }
    }
}

impl Pack for UnlockCondition {
    fn pack(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Address(c) => c.pack(buf),
            Self::StorageDepositReturn(c) => c.pack(buf),
            Self::Timelock(c) => c.pack(buf),
            Self::Expiration(c) => c.pack(buf),
            Self::StateControllerAddress(c) => c.pack(buf),
            Self::GovernorAddress(c) => c.pack(buf),
            Self::ImmutableAliasAddress(c) => c.pack(buf),
        }
    }
}

/// A set of [`UnlockCondition`]s, sorted by kind, in which every kind appears at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<UnlockCondition>", into = "Vec<UnlockCondition>")]
pub struct UnlockConditions(Vec<UnlockCondition>);

impl UnlockConditions {
    /// Validates a list of unlock conditions.
    ///
    /// Fails on duplicate kinds, on an expiration without a companion address unlock condition and on a storage
    /// deposit return of zero.
    pub fn new(conditions: impl IntoIterator<Item = UnlockCondition>) -> Result<Self, Error> {
        let mut conditions = conditions.into_iter().collect::<Vec<_>>();
        conditions.sort_by_key(UnlockCondition::kind);
        for pair in conditions.windows(2) {
            if pair[0].kind() == pair[1].kind() {
                return Err(Error::DuplicateUnlockCondition(pair[0].kind_name()));
            }
        }
        let conditions = Self(conditions);
        if conditions.expiration().is_some() && conditions.address().is_none() {
            return Err(Error::InvalidUnlockConditionSet(
                "expiration unlock condition requires an address unlock condition".to_string(),
            ));
        }
        if let Some(sdruc) = conditions.storage_deposit_return() {
            if sdruc.amount == 0 {
                return Err(Error::InvalidUnlockConditionSet(
                    "storage deposit return amount must not be zero".to_string(),
                ));
            }
        }
        Ok(conditions)
    }

    /// Builds the set from conditions that are already sorted and unique.
    pub(crate) fn from_sorted(conditions: impl IntoIterator<Item = Option<UnlockCondition>>) -> Self {
        Self(conditions.into_iter().flatten().collect())
    }

    /// Iterates over the unlock conditions in kind order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &UnlockCondition> {
        self.0.iter()
    }

    /// The number of unlock conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the address unlock condition, if any.
    pub fn address(&self) -> Option<&AddressUnlockCondition> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::Address(c) => Some(c),
            _ => None,
        })
    }

    /// Returns the storage deposit return unlock condition, if any.
    pub fn storage_deposit_return(&self) -> Option<&StorageDepositReturnUnlockCondition> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::StorageDepositReturn(c) => Some(c),
            _ => None,
        })
    }

    /// Returns the timelock unlock condition, if any.
    pub fn timelock(&self) -> Option<&TimelockUnlockCondition> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::Timelock(c) => Some(c),
            _ => None,
        })
    }

    /// Returns the expiration unlock condition, if any.
    pub fn expiration(&self) -> Option<&ExpirationUnlockCondition> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::Expiration(c) => Some(c),
            _ => None,
        })
    }

    /// Returns the state controller address unlock condition, if any.
    pub fn state_controller_address(&self) -> Option<&StateControllerAddressUnlockCondition> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::StateControllerAddress(c) => Some(c),
            _ => None,
        })
    }

    /// Returns the governor address unlock condition, if any.
    pub fn governor_address(&self) -> Option<&GovernorAddressUnlockCondition> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::GovernorAddress(c) => Some(c),
            _ => None,
        })
    }

    /// Returns the immutable alias address unlock condition, if any.
    pub fn immutable_alias_address(&self) -> Option<&ImmutableAliasAddressUnlockCondition> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::ImmutableAliasAddress(c) => Some(c),
            _ => None,
        })
    }

    /// Fails if the set contains a kind outside of `allowed`.
    pub(crate) fn check_allowed(&self, output_kind: &str, allowed: &[u8]) -> Result<(), Error> {
        if let Some(c) = self.0.iter().find(|c| !allowed.contains(&c.kind())) {
            return Err(Error::InvalidUnlockConditionSet(format!(
                "`{}` unlock condition is not allowed on {output_kind} outputs",
                c.kind_name()
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<UnlockCondition>> for UnlockConditions {
    type Error = Error;

    fn try_from(value: Vec<UnlockCondition>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnlockConditions> for Vec<UnlockCondition> {
    fn from(value: UnlockConditions) -> Self {
        value.0
    }
}

impl Pack for UnlockConditions {
    fn pack(&self, buf: &mut Vec<u8>) {
        pack_u8_prefixed(self.0.iter(), buf);
    }
}

/// The unlock conditions of outputs owned by a single address, that is basic and NFT outputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct OwnerUnlockConditions {
    pub(crate) address: AddressUnlockCondition,
    pub(crate) storage_deposit_return: Option<StorageDepositReturnUnlockCondition>,
    pub(crate) timelock: Option<TimelockUnlockCondition>,
    pub(crate) expiration: Option<ExpirationUnlockCondition>,
}

impl OwnerUnlockConditions {
    const ALLOWED: [u8; 4] = [
        AddressUnlockCondition::KIND,
        StorageDepositReturnUnlockCondition::KIND,
        TimelockUnlockCondition::KIND,
        ExpirationUnlockCondition::KIND,
    ];

    pub(crate) fn try_from_set(conditions: &UnlockConditions, output_kind: &str) -> Result<Self, Error> {
        conditions.check_allowed(output_kind, &Self::ALLOWED)?;
        let address = *conditions.address().ok_or_else(|| {
            Error::InvalidUnlockConditionSet(format!("{output_kind} outputs require an address unlock condition"))
        })?;
        Ok(Self {
            address,
            storage_deposit_return: conditions.storage_deposit_return().copied(),
            timelock: conditions.timelock().copied(),
            expiration: conditions.expiration().copied(),
        })
    }
}
