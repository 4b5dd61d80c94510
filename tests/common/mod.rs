// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{convert::Infallible, sync::Mutex};

use async_trait::async_trait;
use stardust_claims::{
    claim::ClaimTransactionDraft,
    client::{BlockBroadcaster, SecretManager, SignedClaim},
    model::{
        block::{BlockId, TransactionId},
        output::{LedgerOutput, Output, OutputId},
        tangle::MilestoneIndexTimestamp,
        utxo::{Address, Ed25519Address},
    },
};

#[allow(unused)]
pub fn address(byte: u8) -> Address {
    Ed25519Address([byte; 32]).into()
}

#[allow(unused)]
pub fn output_id(transaction: u8, index: u16) -> OutputId {
    OutputId::new(TransactionId([transaction; 32]), index)
}

#[allow(unused)]
pub fn ledger_output(output_id: OutputId, milestone: u32, output: impl Into<Output>) -> LedgerOutput {
    LedgerOutput {
        output_id,
        block_id: BlockId([0xbb; 32]),
        booked: MilestoneIndexTimestamp {
            milestone_index: milestone.into(),
            milestone_timestamp: (milestone * 10).into(),
        },
        output: output.into(),
    }
}

/// Signs every draft with an empty signature.
#[allow(unused)]
pub struct TestSecretManager;

#[async_trait]
impl SecretManager for TestSecretManager {
    type Error = Infallible;

    async fn sign(&self, draft: &ClaimTransactionDraft) -> Result<SignedClaim, Self::Error> {
        Ok(SignedClaim {
            inputs: draft.inputs.iter().map(|input| input.output.output_id).collect(),
            payload: Box::new([]),
        })
    }
}

/// Records submitted transactions.
#[allow(unused)]
#[derive(Default)]
pub struct RecordingBroadcaster {
    pub submitted: Mutex<Vec<SignedClaim>>,
}

#[async_trait]
impl BlockBroadcaster for RecordingBroadcaster {
    type Error = Infallible;

    async fn submit(&self, transaction: SignedClaim) -> Result<BlockId, Self::Error> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(transaction);
        Ok(BlockId([submitted.len() as u8; 32]))
    }
}
