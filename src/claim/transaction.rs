// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ClaimClassification, ClaimInput, UnclaimableReason};
use crate::{
    model::{
        output::{
            resolve_amount, unlock_condition::AddressUnlockCondition, BasicOutputBuilder, NativeTokens, NftOutput,
            Output, OutputId,
        },
        protocol::ProtocolParameters,
        utxo::Address,
    },
    Error,
};

/// An amount of base tokens that a claim transaction has to send back to the depositor of an output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnObligation {
    /// The output carrying the storage deposit return unlock condition.
    pub output_id: OutputId,
    /// The address to pay.
    pub return_address: Address,
    /// The amount to pay.
    pub amount: u64,
}

/// The unsigned content of a transaction that claims outputs for a single address.
///
/// Storage deposit returns are paid with one basic output per return address. NFTs are moved to the claimant with
/// their minimum deposit, everything else ends up in a single basic output owned by the claimant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimTransactionDraft {
    /// The consumed outputs.
    pub inputs: Vec<ClaimInput>,
    /// The created outputs.
    pub outputs: Vec<Output>,
}

impl ClaimTransactionDraft {
    /// Builds the draft for `claimant`.
    ///
    /// Alias and foundry outputs change owner through state transitions, not claims, so they are left out.
    pub fn build(
        claimant: &Address,
        inputs: impl IntoIterator<Item = ClaimInput>,
        params: &ProtocolParameters,
    ) -> Result<Self, Error> {
        let inputs = inputs
            .into_iter()
            .filter(|input| match input.output.output {
                Output::Basic(_) | Output::Nft(_) => true,
                Output::Alias(_) | Output::Foundry(_) => {
                    debug!(output_id = %input.output.output_id, "skipping {} output", input.output.output.kind());
                    false
                }
            })
            .collect::<Vec<_>>();

        let total = checked_sum(inputs.iter().map(|input| input.output.amount().0))?;
        let mut outputs = Vec::<Output>::new();

        let mut returns = BTreeMap::<Address, u64>::new();
        for obligation in inputs.iter().filter_map(|input| input.return_obligation) {
            let owed = returns.entry(obligation.return_address).or_default();
            *owed = owed.checked_add(obligation.amount).ok_or(Error::InvalidAmount(obligation.amount))?;
        }
        for (return_address, amount) in returns {
            outputs.push(
                BasicOutputBuilder::new(return_address)
                    .with_amount(amount)
                    .finish(params)?
                    .into(),
            );
        }

        for input in inputs.iter() {
            if let Output::Nft(nft) = &input.output.output {
                let mut moved = NftOutput {
                    amount: Default::default(),
                    native_tokens: Default::default(),
                    nft_id: nft.nft_id.or_from_output_id(&input.output.output_id),
                    address_unlock_condition: AddressUnlockCondition { address: *claimant },
                    storage_deposit_return_unlock_condition: None,
                    timelock_unlock_condition: None,
                    expiration_unlock_condition: None,
                    features: nft.features.clone(),
                    immutable_features: nft.immutable_features.clone(),
                };
                moved.amount = resolve_amount(None, &moved, params)?;
                outputs.push(moved.into());
            }
        }

        let spent = checked_sum(outputs.iter().map(|output| output.amount().0))?;
        let remainder = total
            .checked_sub(spent)
            .ok_or(Error::InsufficientStorageDeposit {
                amount: total,
                required: spent,
            })?;
        let native_tokens = NativeTokens::sum(inputs.iter().map(|input| input.output.output.native_tokens()))?;
        if remainder > 0 || !native_tokens.is_empty() {
            outputs.push(
                BasicOutputBuilder::new(*claimant)
                    .with_amount(remainder)
                    .with_native_tokens(native_tokens)
                    .finish(params)?
                    .into(),
            );
        }

        debug!(inputs = inputs.len(), outputs = outputs.len(), "built claim transaction draft");
        Ok(Self { inputs, outputs })
    }

    /// The storage deposit returns owed by the inputs.
    pub fn obligations(&self) -> impl Iterator<Item = &ReturnObligation> + '_ {
        self.inputs.iter().filter_map(|input| input.return_obligation.as_ref())
    }

    /// The obligations that the outputs do not pay.
    ///
    /// Only basic outputs that the return address can unlock without conditions count as payment. If the outputs to
    /// an address fall short, every obligation towards that address is unpaid.
    pub fn unpaid_returns(&self) -> Vec<ReturnObligation> {
        let mut owed = BTreeMap::<Address, u64>::new();
        for obligation in self.obligations() {
            let sum = owed.entry(obligation.return_address).or_default();
            *sum = sum.saturating_add(obligation.amount);
        }
        let mut paid = BTreeMap::<Address, u64>::new();
        for output in self.outputs.iter() {
            if matches!(output, Output::Basic(_)) && output.is_trivial_unlock() {
                let sum = paid.entry(*output.owning_address()).or_default();
                *sum = sum.saturating_add(output.amount().0);
            }
        }
        self.obligations()
            .filter(|obligation| {
                paid.get(&obligation.return_address).copied().unwrap_or_default() < owed[&obligation.return_address]
            })
            .copied()
            .collect()
    }

    /// Fails with the first unpaid storage deposit return.
    pub fn check_returns(&self) -> Result<(), Error> {
        match self.unpaid_returns().into_iter().next() {
            Some(obligation) => Err(Error::MissingReturnPayment {
                output_id: obligation.output_id,
                return_address: obligation.return_address,
                amount: obligation.amount,
            }),
            None => Ok(()),
        }
    }

    /// The final classification of every input: inputs whose return is unpaid become unclaimable.
    pub fn settle(&self) -> BTreeMap<OutputId, ClaimClassification> {
        let unpaid = self
            .unpaid_returns()
            .into_iter()
            .map(|obligation| (obligation.output_id, obligation))
            .collect::<BTreeMap<_, _>>();
        self.inputs
            .iter()
            .map(|input| {
                let output_id = input.output.output_id;
                let classification = match unpaid.get(&output_id) {
                    Some(obligation) => {
                        warn!(
                            %output_id,
                            return_address = %obligation.return_address,
                            amount = obligation.amount,
                            "storage deposit return is not paid"
                        );
                        ClaimClassification::Unclaimable {
                            reason: UnclaimableReason::MissingReturnPayment {
                                return_address: obligation.return_address,
                                amount: obligation.amount,
                            },
                        }
                    }
                    None => input.classification,
                };
                (output_id, classification)
            })
            .collect()
    }
}

fn checked_sum(amounts: impl IntoIterator<Item = u64>) -> Result<u64, Error> {
    amounts
        .into_iter()
        .try_fold(0u64, |sum, amount| sum.checked_add(amount).ok_or(Error::InvalidAmount(amount)))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        claim::ClaimScan,
        model::{
            block::{BlockId, TransactionId},
            output::{Features, LedgerOutput, NftId},
            tangle::MilestoneIndexTimestamp,
            utxo::Ed25519Address,
        },
    };

    fn address(byte: u8) -> Address {
        Ed25519Address([byte; 32]).into()
    }

    fn ledger_output(index: u16, output: impl Into<Output>) -> LedgerOutput {
        LedgerOutput {
            output_id: OutputId::new(TransactionId([1; 32]), index),
            block_id: BlockId([2; 32]),
            booked: MilestoneIndexTimestamp::default(),
            output: output.into(),
        }
    }

    fn scan(outputs: Vec<LedgerOutput>) -> ClaimScan {
        ClaimScan::new(&address(1), outputs, 1000.into())
    }

    #[test]
    fn pays_back_storage_deposit() {
        let params = ProtocolParameters::default();
        let with_return = BasicOutputBuilder::new(address(1))
            .with_amount(100_000)
            .with_storage_deposit_return(address(2), 42_600)
            .with_expiration(address(2), 2000.into())
            .finish(&params)
            .unwrap();
        let scan = scan(vec![ledger_output(0, with_return)]);
        assert_eq!(scan.eligible.len(), 1);

        let draft = ClaimTransactionDraft::build(&address(1), scan.eligible, &params).unwrap();
        assert_eq!(draft.outputs.len(), 2);
        assert_eq!(draft.outputs[0].owning_address(), &address(2));
        assert_eq!(draft.outputs[0].amount().0, 42_600);
        assert_eq!(draft.outputs[1].owning_address(), &address(1));
        assert_eq!(draft.outputs[1].amount().0, 57_400);
        assert!(draft.unpaid_returns().is_empty());
        assert!(draft.check_returns().is_ok());
    }

    #[test]
    fn expired_output_owes_nothing() {
        let params = ProtocolParameters::default();
        let expired = BasicOutputBuilder::new(address(2))
            .with_amount(100_000)
            .with_storage_deposit_return(address(1), 42_600)
            .with_expiration(address(1), 500.into())
            .finish(&params)
            .unwrap();
        let scan = scan(vec![ledger_output(0, expired)]);
        assert_eq!(
            scan.eligible[0].classification,
            ClaimClassification::Expired {
                return_address: address(1)
            }
        );
        assert_eq!(scan.eligible[0].return_obligation, None);

        let draft = ClaimTransactionDraft::build(&address(1), scan.eligible, &params).unwrap();
        assert_eq!(draft.outputs.len(), 1);
        assert_eq!(draft.outputs[0].amount().0, 100_000);
    }

    #[test]
    fn unpaid_return_downgrades_input() {
        let params = ProtocolParameters::default();
        let with_return = BasicOutputBuilder::new(address(1))
            .with_amount(100_000)
            .with_storage_deposit_return(address(2), 42_600)
            .finish(&params)
            .unwrap();
        let output_id = OutputId::new(TransactionId([1; 32]), 0);
        let mut draft =
            ClaimTransactionDraft::build(&address(1), scan(vec![ledger_output(0, with_return)]).eligible, &params)
                .unwrap();
        draft.outputs.remove(0);

        assert_eq!(
            draft.unpaid_returns(),
            vec![ReturnObligation {
                output_id,
                return_address: address(2),
                amount: 42_600
            }]
        );
        assert!(matches!(
            draft.check_returns(),
            Err(Error::MissingReturnPayment { amount: 42_600, .. })
        ));
        assert_eq!(
            draft.settle()[&output_id],
            ClaimClassification::Unclaimable {
                reason: UnclaimableReason::MissingReturnPayment {
                    return_address: address(2),
                    amount: 42_600
                }
            }
        );
    }

    #[test]
    fn moves_nft_to_claimant() {
        let params = ProtocolParameters::default();
        let nft = NftOutput {
            amount: 200_000.into(),
            native_tokens: Default::default(),
            nft_id: NftId([7; 32]),
            address_unlock_condition: AddressUnlockCondition { address: address(1) },
            storage_deposit_return_unlock_condition: None,
            timelock_unlock_condition: None,
            expiration_unlock_condition: None,
            features: Features::default(),
            immutable_features: Features::default(),
        };
        let draft =
            ClaimTransactionDraft::build(&address(1), scan(vec![ledger_output(0, nft)]).eligible, &params).unwrap();
        assert_eq!(draft.outputs.len(), 2);
        let Output::Nft(moved) = &draft.outputs[0] else {
            panic!("expected an NFT output");
        };
        assert_eq!(moved.nft_id, NftId([7; 32]));
        assert_eq!(
            draft.outputs.iter().map(|output| output.amount().0).sum::<u64>(),
            200_000
        );
    }

    #[test]
    fn moves_freshly_minted_nft_with_derived_id() {
        let params = ProtocolParameters::default();
        let nft = NftOutput {
            amount: 200_000.into(),
            native_tokens: Default::default(),
            nft_id: NftId::NULL,
            address_unlock_condition: AddressUnlockCondition { address: address(1) },
            storage_deposit_return_unlock_condition: None,
            timelock_unlock_condition: None,
            expiration_unlock_condition: None,
            features: Features::default(),
            immutable_features: Features::default(),
        };
        let output_id = OutputId::new(TransactionId([1; 32]), 0);
        let draft =
            ClaimTransactionDraft::build(&address(1), scan(vec![ledger_output(0, nft)]).eligible, &params).unwrap();
        let Output::Nft(moved) = &draft.outputs[0] else {
            panic!("expected an NFT output");
        };
        assert_ne!(moved.nft_id, NftId::NULL);
        assert_eq!(moved.nft_id, NftId::from_output_id(&output_id));
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        let params = ProtocolParameters::default();
        let large = |index| {
            let mut output = BasicOutputBuilder::new(address(1)).finish(&params).unwrap();
            output.amount = (u64::MAX - 1).into();
            ledger_output(index, output)
        };
        let scan = scan(vec![large(0), large(1)]);
        assert_eq!(scan.eligible.len(), 2);
        assert!(matches!(
            ClaimTransactionDraft::build(&address(1), scan.eligible, &params),
            Err(Error::InvalidAmount(_))
        ));
    }
}
