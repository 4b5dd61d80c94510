// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Evaluation of unlock conditions and classification of outputs for claiming.
//!
//! All functions take the current ledger time as an argument and keep no state, so the same inputs always produce
//! the same classification.

mod transaction;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use self::transaction::{ClaimTransactionDraft, ReturnObligation};
use crate::model::{
    output::{LedgerOutput, OutputId, UnlockConditions},
    tangle::MilestoneTimestamp,
    utxo::Address,
};

/// Why an output cannot be claimed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum UnclaimableReason {
    /// The output is controlled by a different address.
    WrongAddress,
    /// The claim transaction does not pay back the storage deposit return.
    MissingReturnPayment {
        /// The address that has to be paid.
        return_address: Address,
        /// The amount owed to it.
        amount: u64,
    },
}

/// The claim state of an output for a given address at a given time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ClaimClassification {
    /// The address can unlock the output now.
    Claimable,
    /// The output is timelocked until the given time.
    NotYetClaimable {
        /// The end of the timelock.
        unlock_time: MilestoneTimestamp,
    },
    /// The output expired and is controlled by the return address.
    Expired {
        /// The address in control of the output.
        return_address: Address,
    },
    /// The address cannot unlock the output.
    Unclaimable {
        /// The reason.
        #[serde(flatten)]
        reason: UnclaimableReason,
    },
}

impl ClaimClassification {
    /// Returns `true` if `claimant` may use the output as a claim input.
    pub fn is_eligible(&self, claimant: &Address) -> bool {
        match self {
            Self::Claimable => true,
            Self::Expired { return_address } => return_address == claimant,
            Self::NotYetClaimable { .. } | Self::Unclaimable { .. } => false,
        }
    }
}

/// Evaluates a set of unlock conditions for `claimant` at time `now`.
///
/// An expired output belongs to its return address whatever the other conditions say. Otherwise a running timelock
/// blocks everybody, and finally the owning address decides. Alias and foundry outputs are owned by their state
/// controller and their alias respectively.
pub fn evaluate(conditions: &UnlockConditions, claimant: &Address, now: MilestoneTimestamp) -> ClaimClassification {
    if let Some(expiration) = conditions.expiration() {
        if expiration.is_expired(now) {
            return ClaimClassification::Expired {
                return_address: expiration.return_address,
            };
        }
    }
    if let Some(timelock) = conditions.timelock() {
        if timelock.is_timelocked(now) {
            return ClaimClassification::NotYetClaimable {
                unlock_time: timelock.timestamp,
            };
        }
    }
    let owner = conditions
        .address()
        .map(|c| &c.address)
        .or_else(|| conditions.state_controller_address().map(|c| &c.address))
        .or_else(|| conditions.immutable_alias_address().map(|c| &c.address));
    if owner == Some(claimant) {
        ClaimClassification::Claimable
    } else {
        ClaimClassification::Unclaimable {
            reason: UnclaimableReason::WrongAddress,
        }
    }
}

/// Classifies every output for `claimant` at time `now`.
#[instrument(skip(outputs), fields(claimant = %claimant, now = %now))]
pub fn classify_outputs<'a>(
    claimant: &Address,
    outputs: impl IntoIterator<Item = &'a LedgerOutput>,
    now: MilestoneTimestamp,
) -> BTreeMap<OutputId, ClaimClassification> {
    outputs
        .into_iter()
        .map(|ledger_output| {
            let classification = evaluate(&ledger_output.output.unlock_conditions(), claimant, now);
            debug!(output_id = %ledger_output.output_id, ?classification);
            (ledger_output.output_id, classification)
        })
        .collect()
}

/// An output that can be consumed by a claim transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimInput {
    /// The output to consume.
    pub output: LedgerOutput,
    /// Either [`ClaimClassification::Claimable`] or an [`ClaimClassification::Expired`] to the claimant.
    pub classification: ClaimClassification,
    /// The storage deposit that the claim transaction has to return, if any.
    pub return_obligation: Option<ReturnObligation>,
}

impl ClaimInput {
    fn new(output: LedgerOutput, classification: ClaimClassification) -> Self {
        // The owner pays back the storage deposit, the return address does not owe it to itself.
        let return_obligation = match classification {
            ClaimClassification::Claimable => output
                .output
                .unlock_conditions()
                .storage_deposit_return()
                .map(|sdruc| ReturnObligation {
                    output_id: output.output_id,
                    return_address: sdruc.return_address,
                    amount: sdruc.amount,
                }),
            _ => None,
        };
        Self {
            output,
            classification,
            return_obligation,
        }
    }
}

/// The outcome of scanning candidate outputs for a claimant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimScan {
    /// The outputs the claimant may consume.
    pub eligible: Vec<ClaimInput>,
    /// The other outputs and why they were left out.
    pub excluded: BTreeMap<OutputId, ClaimClassification>,
}

impl ClaimScan {
    /// Splits `outputs` into eligible claim inputs and excluded outputs.
    #[instrument(skip(outputs), fields(claimant = %claimant, now = %now))]
    pub fn new(claimant: &Address, outputs: impl IntoIterator<Item = LedgerOutput>, now: MilestoneTimestamp) -> Self {
        let mut scan = Self::default();
        for output in outputs {
            let classification = evaluate(&output.output.unlock_conditions(), claimant, now);
            if classification.is_eligible(claimant) {
                scan.eligible.push(ClaimInput::new(output, classification));
            } else {
                scan.excluded.insert(output.output_id, classification);
            }
        }
        debug!(eligible = scan.eligible.len(), excluded = scan.excluded.len(), "scanned outputs");
        scan
    }

    /// The ids of the eligible outputs.
    pub fn eligible_ids(&self) -> impl Iterator<Item = OutputId> + '_ {
        self.eligible.iter().map(|input| input.output.output_id)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        output::unlock_condition::{
            AddressUnlockCondition, ExpirationUnlockCondition, StateControllerAddressUnlockCondition,
            TimelockUnlockCondition, UnlockCondition,
        },
        utxo::Ed25519Address,
    };

    fn address(byte: u8) -> Address {
        Ed25519Address([byte; 32]).into()
    }

    fn conditions(conditions: impl IntoIterator<Item = UnlockCondition>) -> UnlockConditions {
        UnlockConditions::new(conditions).unwrap()
    }

    fn owned_by(byte: u8) -> UnlockCondition {
        AddressUnlockCondition { address: address(byte) }.into()
    }

    fn expires(byte: u8, timestamp: u32) -> UnlockCondition {
        ExpirationUnlockCondition {
            return_address: address(byte),
            timestamp: timestamp.into(),
        }
        .into()
    }

    fn timelock(timestamp: u32) -> UnlockCondition {
        TimelockUnlockCondition {
            timestamp: timestamp.into(),
        }
        .into()
    }

    #[test]
    fn ownership_decides_without_time_conditions() {
        let set = conditions([owned_by(1)]);
        assert_eq!(evaluate(&set, &address(1), 0.into()), ClaimClassification::Claimable);
        assert_eq!(
            evaluate(&set, &address(2), 0.into()),
            ClaimClassification::Unclaimable {
                reason: UnclaimableReason::WrongAddress
            }
        );
    }

    #[test]
    fn expiration_dominates() {
        let set = conditions([owned_by(1), expires(2, 1000), timelock(2000)]);
        assert_eq!(
            evaluate(&set, &address(1), 500.into()),
            ClaimClassification::NotYetClaimable {
                unlock_time: 2000.into()
            }
        );
        for now in [1000, 1500, 2500] {
            assert_eq!(
                evaluate(&set, &address(1), now.into()),
                ClaimClassification::Expired {
                    return_address: address(2)
                }
            );
        }
    }

    #[test]
    fn owner_claims_before_expiration() {
        let set = conditions([owned_by(1), expires(2, 1000)]);
        assert_eq!(evaluate(&set, &address(1), 500.into()), ClaimClassification::Claimable);
        assert_eq!(
            evaluate(&set, &address(2), 500.into()),
            ClaimClassification::Unclaimable {
                reason: UnclaimableReason::WrongAddress
            }
        );
        assert_eq!(
            evaluate(&set, &address(1), 1000.into()),
            ClaimClassification::Expired {
                return_address: address(2)
            }
        );
    }

    #[test]
    fn timelock_blocks_owner() {
        let set = conditions([owned_by(1), timelock(1000)]);
        assert_eq!(
            evaluate(&set, &address(1), 999.into()),
            ClaimClassification::NotYetClaimable {
                unlock_time: 1000.into()
            }
        );
        assert_eq!(evaluate(&set, &address(1), 1000.into()), ClaimClassification::Claimable);
    }

    #[test]
    fn alias_is_owned_by_state_controller() {
        let set = UnlockConditions::from_sorted([Some(
            StateControllerAddressUnlockCondition { address: address(3) }.into(),
        )]);
        assert_eq!(evaluate(&set, &address(3), 0.into()), ClaimClassification::Claimable);
    }

    #[test]
    fn eligibility() {
        let claimant = address(1);
        assert!(ClaimClassification::Claimable.is_eligible(&claimant));
        assert!(ClaimClassification::Expired {
            return_address: claimant
        }
        .is_eligible(&claimant));
        assert!(!ClaimClassification::Expired {
            return_address: address(2)
        }
        .is_eligible(&claimant));
        assert!(!ClaimClassification::NotYetClaimable {
            unlock_time: 5.into()
        }
        .is_eligible(&claimant));
    }

    #[test]
    fn classification_json() {
        let json = serde_json::to_value(ClaimClassification::Unclaimable {
            reason: UnclaimableReason::WrongAddress,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "status": "unclaimable", "reason": "wrong_address" }));
    }
}
