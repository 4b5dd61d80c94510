// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The collaborators a claim depends on, and the flow that drives them.

mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

pub use self::memory::{InMemoryError, InMemoryLedger};
use crate::{
    claim::{ClaimScan, ClaimTransactionDraft},
    indexer::{OutputIdsResponse, QueryParameter},
    model::{
        block::BlockId,
        output::{LedgerOutput, OutputId, OutputKind},
        protocol::ProtocolParameters,
        tangle::MilestoneTimestamp,
        utxo::Address,
    },
    Error,
};

/// Finds output ids matching a filter.
#[async_trait]
pub trait Indexer {
    /// The error type of the indexer.
    type Error: 'static + std::error::Error + Send + Sync;

    /// Returns one page of matching output ids, newest first.
    async fn find_output_ids(&self, query: &QueryParameter) -> Result<OutputIdsResponse, Self::Error>;
}

/// Reads outputs from the ledger.
#[async_trait]
pub trait LedgerReader {
    /// The error type of the reader.
    type Error: 'static + std::error::Error + Send + Sync;

    /// Returns the outputs in the order of `output_ids`.
    async fn get_outputs(&self, output_ids: &[OutputId]) -> Result<Vec<LedgerOutput>, Self::Error>;
}

/// A claim transaction together with its unlocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedClaim {
    /// The inputs of the transaction.
    pub inputs: Vec<OutputId>,
    /// The signed transaction payload, opaque to this crate.
    #[serde(with = "serde_bytes")]
    pub payload: Box<[u8]>,
}

/// Signs claim transactions for the addresses it holds keys for.
#[async_trait]
pub trait SecretManager {
    /// The error type of the secret manager.
    type Error: 'static + std::error::Error + Send + Sync;

    /// Signs the draft.
    async fn sign(&self, draft: &ClaimTransactionDraft) -> Result<SignedClaim, Self::Error>;
}

/// Submits blocks to the network.
#[async_trait]
pub trait BlockBroadcaster {
    /// The error type of the broadcaster.
    type Error: 'static + std::error::Error + Send + Sync;

    /// Wraps the transaction in a block and submits it.
    async fn submit(&self, transaction: SignedClaim) -> Result<BlockId, Self::Error>;
}

/// Finds and claims the outputs of an address.
pub struct Claimer<'a, I, L> {
    indexer: &'a I,
    ledger: &'a L,
    params: ProtocolParameters,
}

impl<'a, I: Indexer + Sync, L: LedgerReader + Sync> Claimer<'a, I, L> {
    /// Creates a claimer.
    pub fn new(indexer: &'a I, ledger: &'a L, params: ProtocolParameters) -> Self {
        Self {
            indexer,
            ledger,
            params,
        }
    }

    /// Collects the output ids of every page of `query`.
    pub async fn find_all_output_ids(&self, query: &QueryParameter) -> Result<Vec<OutputId>, Error> {
        let mut query = query.clone();
        let mut output_ids = Vec::new();
        loop {
            let page = self
                .indexer
                .find_output_ids(&query)
                .await
                .map_err(Error::collaborator)?;
            output_ids.extend(page.items);
            match page.cursor {
                Some(cursor) => query = query.with_cursor(Some(cursor.parse()?)),
                None => break,
            }
        }
        Ok(output_ids)
    }

    /// Fetches the basic and NFT outputs that `claimant` owns or gets back on expiration, and classifies them.
    #[instrument(skip(self), fields(claimant = %claimant, now = %now), err)]
    pub async fn scan(&self, claimant: &Address, now: MilestoneTimestamp) -> Result<ClaimScan, Error> {
        let queries = [OutputKind::Basic, OutputKind::Nft]
            .into_iter()
            .flat_map(|kind| {
                [
                    QueryParameter {
                        kind: Some(kind),
                        address: Some(*claimant),
                        ..Default::default()
                    },
                    QueryParameter {
                        kind: Some(kind),
                        expiration_return_address: Some(*claimant),
                        ..Default::default()
                    },
                ]
            })
            .collect::<Vec<_>>();
        let output_ids = try_join_all(queries.iter().map(|query| self.find_all_output_ids(query)))
            .await?
            .into_iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        debug!("found {} candidate outputs", output_ids.len());
        let outputs = self
            .ledger
            .get_outputs(&output_ids)
            .await
            .map_err(Error::collaborator)?;
        Ok(ClaimScan::new(claimant, outputs, now))
    }

    /// Claims every eligible output of `claimant` in a single transaction.
    ///
    /// Returns `None` if there is nothing to claim.
    #[instrument(skip(self, secret_manager, broadcaster), fields(claimant = %claimant, now = %now), err)]
    pub async fn claim<S, B>(
        &self,
        claimant: &Address,
        now: MilestoneTimestamp,
        secret_manager: &S,
        broadcaster: &B,
    ) -> Result<Option<BlockId>, Error>
    where
        S: SecretManager + Sync,
        B: BlockBroadcaster + Sync,
    {
        let scan = self.scan(claimant, now).await?;
        if scan.eligible.is_empty() {
            debug!("nothing to claim");
            return Ok(None);
        }
        let draft = ClaimTransactionDraft::build(claimant, scan.eligible, &self.params)?;
        draft.check_returns()?;
        let signed = secret_manager.sign(&draft).await.map_err(Error::collaborator)?;
        let block_id = broadcaster.submit(signed).await.map_err(Error::collaborator)?;
        info!("claimed {} outputs in block {block_id}", draft.inputs.len());
        Ok(Some(block_id))
    }
}
