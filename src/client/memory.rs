// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{cmp::Reverse, collections::BTreeMap};

use async_trait::async_trait;
use thiserror::Error;

use super::{Indexer, LedgerReader};
use crate::{
    indexer::{IndexedOutputsCursor, OutputIdsResponse, QueryParameter},
    model::{
        output::{LedgerOutput, OutputId},
        tangle::MilestoneIndex,
    },
};

/// A ledger held in memory that answers indexer queries and output requests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    ledger_index: MilestoneIndex,
    outputs: BTreeMap<OutputId, LedgerOutput>,
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum InMemoryError {
    #[error("output {0} is not in the ledger")]
    OutputNotFound(OutputId),
}

impl InMemoryLedger {
    /// Creates an empty ledger at `ledger_index`.
    pub fn new(ledger_index: impl Into<MilestoneIndex>) -> Self {
        Self {
            ledger_index: ledger_index.into(),
            outputs: Default::default(),
        }
    }

    /// Adds an unspent output.
    pub fn insert(&mut self, output: LedgerOutput) {
        self.outputs.insert(output.output_id, output);
    }

    /// Marks an output as spent.
    pub fn remove(&mut self, output_id: &OutputId) -> Option<LedgerOutput> {
        self.outputs.remove(output_id)
    }

    /// The number of unspent outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns `true` if there are no unspent outputs.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl Extend<LedgerOutput> for InMemoryLedger {
    fn extend<T: IntoIterator<Item = LedgerOutput>>(&mut self, iter: T) {
        for output in iter {
            self.insert(output);
        }
    }
}

#[async_trait]
impl Indexer for InMemoryLedger {
    type Error = InMemoryError;

    async fn find_output_ids(&self, query: &QueryParameter) -> Result<OutputIdsResponse, Self::Error> {
        let page_size = query.effective_page_size();
        let mut matches = self
            .outputs
            .values()
            .filter(|output| query.matches(output))
            .map(|output| (output.booked.milestone_index, output.output_id))
            .collect::<Vec<_>>();
        matches.sort_by_key(|&key| Reverse(key));
        let mut page = matches
            .into_iter()
            .skip_while(|&key| {
                query
                    .cursor
                    .map_or(false, |cursor| key > (cursor.milestone_index, cursor.output_id))
            })
            .take(page_size + 1)
            .collect::<Vec<_>>();
        let cursor = if page.len() > page_size {
            page.pop().map(|(milestone_index, output_id)| {
                IndexedOutputsCursor {
                    milestone_index,
                    output_id,
                    page_size,
                }
                .to_string()
            })
        } else {
            None
        };
        Ok(OutputIdsResponse {
            ledger_index: self.ledger_index,
            items: page.into_iter().map(|(_, output_id)| output_id).collect(),
            cursor,
        })
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    type Error = InMemoryError;

    async fn get_outputs(&self, output_ids: &[OutputId]) -> Result<Vec<LedgerOutput>, Self::Error> {
        output_ids
            .iter()
            .map(|output_id| {
                self.outputs
                    .get(output_id)
                    .cloned()
                    .ok_or(InMemoryError::OutputNotFound(*output_id))
            })
            .collect()
    }
}
