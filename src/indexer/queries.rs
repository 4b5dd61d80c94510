// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use mongodb::bson::{self, doc, Document};
use primitive_types::U256;

use crate::model::{output::OutputKind, tangle::MilestoneTimestamp, u256_hex, utxo::Address};

/// Defines how a query is appended to a list of `$and` queries.
pub(super) trait AppendToQuery {
    fn append_to(self, queries: &mut Vec<Document>);
}

pub(super) trait AppendQuery<Q> {
    fn append_query(&mut self, query: Q);
}

impl<Q: AppendToQuery> AppendQuery<Q> for Vec<Document> {
    fn append_query(&mut self, query: Q) {
        query.append_to(self)
    }
}

/// Queries for the output kind.
pub(super) struct KindQuery(pub(super) Option<OutputKind>);

impl AppendToQuery for KindQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(kind) = self.0 {
            queries.push(doc! { "output.kind": kind.to_string() });
        }
    }
}

/// Queries for the address that owns an output. Without a kind, every owning unlock condition is considered.
pub(super) struct OwnerQuery {
    pub(super) address: Option<Address>,
    pub(super) kind: Option<OutputKind>,
}

impl OwnerQuery {
    fn field(kind: OutputKind) -> &'static str {
        match kind {
            OutputKind::Basic | OutputKind::Nft => "output.address_unlock_condition.address",
            OutputKind::Alias => "output.state_controller_address_unlock_condition.address",
            OutputKind::Foundry => "output.immutable_alias_address_unlock_condition.address",
        }
    }
}

impl AppendToQuery for OwnerQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(address) = self.address {
            let by_kind = |kind| {
                let mut query = Document::new();
                query.insert(Self::field(kind), address);
                query
            };
            match self.kind {
                Some(kind) => queries.push(by_kind(kind)),
                None => queries.push(doc! {
                    "$or": [
                        by_kind(OutputKind::Basic),
                        by_kind(OutputKind::Alias),
                        by_kind(OutputKind::Foundry),
                    ]
                }),
            }
        }
    }
}

/// Queries for a feature of type `sender`.
pub(super) struct SenderQuery(pub(super) Option<Address>);

impl AppendToQuery for SenderQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(address) = self.0 {
            queries.push(doc! {
                "output.features": {
                    "$elemMatch": {
                        "kind": "sender",
                        "address": address
                    }
                }
            });
        }
    }
}

/// Queries for a feature of type `tag`.
pub(super) struct TagQuery(pub(super) Option<String>);

impl AppendToQuery for TagQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(tag) = self.0 {
            queries.push(doc! {
                "output.features": {
                    "$elemMatch": {
                        "kind": "tag",
                        // Unwrap: Cannot fail as bytes are always representable
                        "data": bson::to_bson(&serde_bytes::Bytes::new(tag.as_bytes())).unwrap()
                    }
                }
            });
        }
    }
}

/// Queries for native tokens.
pub(super) struct NativeTokensQuery {
    pub(super) has_native_tokens: Option<bool>,
    pub(super) min_native_token_count: Option<U256>,
    pub(super) max_native_token_count: Option<U256>,
}

impl AppendToQuery for NativeTokensQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(false) = self.has_native_tokens {
            queries.push(doc! {
                "output.native_tokens": { "$eq": [] }
            });
        } else {
            if matches!(self.has_native_tokens, Some(true))
                || self.min_native_token_count.is_some()
                || self.max_native_token_count.is_some()
            {
                queries.push(doc! {
                    "output.native_tokens": { "$ne": [] }
                });
            }
            if let Some(min_native_token_count) = self.min_native_token_count {
                queries.push(doc! {
                    "output.native_tokens": {
                        "$not": {
                            "$elemMatch": {
                                "amount": { "$lt": u256_hex::encode(&min_native_token_count) }
                            }
                        }
                    }
                });
            }
            if let Some(max_native_token_count) = self.max_native_token_count {
                queries.push(doc! {
                    "output.native_tokens": {
                        "$not": {
                            "$elemMatch": {
                                "amount": { "$gt": u256_hex::encode(&max_native_token_count) }
                            }
                        }
                    }
                });
            }
        }
    }
}

/// Queries for an unlock condition of type `storage_deposit_return`.
pub(super) struct StorageDepositReturnQuery {
    pub(super) has_storage_deposit_return: Option<bool>,
    pub(super) storage_deposit_return_address: Option<Address>,
}

impl AppendToQuery for StorageDepositReturnQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(has_storage_deposit_return) = self.has_storage_deposit_return {
            queries.push(doc! {
                "output.storage_deposit_return_unlock_condition": { "$exists": has_storage_deposit_return }
            });
        }
        if let Some(storage_deposit_return_address) = self.storage_deposit_return_address {
            queries.push(doc! {
                "output.storage_deposit_return_unlock_condition.return_address": storage_deposit_return_address
            });
        }
    }
}

/// Queries for an unlock condition of type `timelock`.
pub(super) struct TimelockQuery {
    pub(super) has_timelock: Option<bool>,
    pub(super) timelocked_before: Option<MilestoneTimestamp>,
    pub(super) timelocked_after: Option<MilestoneTimestamp>,
}

impl AppendToQuery for TimelockQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(has_timelock) = self.has_timelock {
            queries.push(doc! {
                "output.timelock_unlock_condition": { "$exists": has_timelock }
            });
        }
        if let Some(timelocked_before) = self.timelocked_before {
            queries.push(doc! {
                "output.timelock_unlock_condition.timestamp": { "$lt": timelocked_before }
            });
        }
        if let Some(timelocked_after) = self.timelocked_after {
            queries.push(doc! {
                "output.timelock_unlock_condition.timestamp": { "$gt": timelocked_after }
            });
        }
    }
}

/// Queries for an unlock condition of type `expiration`.
pub(super) struct ExpirationQuery {
    pub(super) has_expiration: Option<bool>,
    pub(super) expires_before: Option<MilestoneTimestamp>,
    pub(super) expires_after: Option<MilestoneTimestamp>,
    pub(super) expiration_return_address: Option<Address>,
}

impl AppendToQuery for ExpirationQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(has_expiration) = self.has_expiration {
            queries.push(doc! {
                "output.expiration_unlock_condition": { "$exists": has_expiration }
            });
        }
        if let Some(expires_before) = self.expires_before {
            queries.push(doc! {
                "output.expiration_unlock_condition.timestamp": { "$lt": expires_before }
            });
        }
        if let Some(expires_after) = self.expires_after {
            queries.push(doc! {
                "output.expiration_unlock_condition.timestamp": { "$gt": expires_after }
            });
        }
        if let Some(expiration_return_address) = self.expiration_return_address {
            queries.push(doc! {
                "output.expiration_unlock_condition.return_address": expiration_return_address
            });
        }
    }
}

/// Queries for created (booked) time.
pub(super) struct CreatedQuery {
    pub(super) created_before: Option<MilestoneTimestamp>,
    pub(super) created_after: Option<MilestoneTimestamp>,
}

impl AppendToQuery for CreatedQuery {
    fn append_to(self, queries: &mut Vec<Document>) {
        if let Some(created_before) = self.created_before {
            queries.push(doc! {
                "booked.milestone_timestamp": { "$lt": created_before }
            });
        }
        if let Some(created_after) = self.created_after {
            queries.push(doc! {
                "booked.milestone_timestamp": { "$gt": created_after }
            });
        }
    }
}
