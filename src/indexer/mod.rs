// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Filters for the output indexer.
//!
//! A [`QueryParameter`] is a conjunction of the constraints that are set; unset constraints match every output. The
//! same record renders to the canonical document filter and to the query string of the REST indexer, and
//! [`QueryParameter::matches`] evaluates it locally.

mod queries;

use std::{fmt, str::FromStr};

use mongodb::bson::{self, doc};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use self::queries::{
    AppendQuery, CreatedQuery, ExpirationQuery, KindQuery, NativeTokensQuery, OwnerQuery, SenderQuery,
    StorageDepositReturnQuery, TagQuery, TimelockQuery,
};
use crate::{
    model::{
        output::{LedgerOutput, OutputId, OutputKind},
        tangle::{MilestoneIndex, MilestoneTimestamp},
        utxo::Address,
    },
    Error,
};

/// The default number of output ids per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A position in the paged results of the indexer: the booked milestone and the output id to continue from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IndexedOutputsCursor {
    /// The booked milestone index of the next output.
    pub milestone_index: MilestoneIndex,
    /// The id of the next output.
    pub output_id: OutputId,
    /// The page size the cursor was created with.
    pub page_size: usize,
}

impl FromStr for IndexedOutputsCursor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split('.').collect();
        let invalid = || Error::InvalidCursor(s.to_string());
        Ok(match parts[..] {
            [ms, o, ps] => IndexedOutputsCursor {
                milestone_index: ms.parse().map_err(|_| invalid())?,
                output_id: o.parse().map_err(|_| invalid())?,
                page_size: match ps.parse().map_err(|_| invalid())? {
                    0 => return Err(Error::InvalidPageSize(0)),
                    page_size => page_size,
                },
            },
            _ => return Err(invalid()),
        })
    }
}

impl fmt::Display for IndexedOutputsCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.milestone_index,
            self.output_id.to_hex(),
            self.page_size
        )
    }
}

/// A filter for outputs, sent to the indexer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct QueryParameter {
    pub kind: Option<OutputKind>,
    pub address: Option<Address>,
    pub has_native_tokens: Option<bool>,
    pub min_native_token_count: Option<U256>,
    pub max_native_token_count: Option<U256>,
    pub has_storage_deposit_return: Option<bool>,
    pub storage_deposit_return_address: Option<Address>,
    pub has_timelock: Option<bool>,
    pub timelocked_before: Option<MilestoneTimestamp>,
    pub timelocked_after: Option<MilestoneTimestamp>,
    pub has_expiration: Option<bool>,
    pub expires_before: Option<MilestoneTimestamp>,
    pub expires_after: Option<MilestoneTimestamp>,
    pub expiration_return_address: Option<Address>,
    pub sender: Option<Address>,
    pub tag: Option<String>,
    pub created_before: Option<MilestoneTimestamp>,
    pub created_after: Option<MilestoneTimestamp>,
    pub page_size: Option<usize>,
    pub cursor: Option<IndexedOutputsCursor>,
}

impl QueryParameter {
    /// Starts a builder that validates bech32 addresses against `bech32_hrp`.
    pub fn builder(bech32_hrp: impl Into<String>) -> QueryParameterBuilder {
        QueryParameterBuilder {
            bech32_hrp: bech32_hrp.into(),
            query: Default::default(),
            error: None,
        }
    }

    /// The page size to use, falling back to the cursor's and then to [`DEFAULT_PAGE_SIZE`]. Never less than one.
    pub fn effective_page_size(&self) -> usize {
        self.page_size
            .or_else(|| self.cursor.map(|c| c.page_size))
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .max(1)
    }

    /// Returns the same filter positioned at `cursor`.
    pub fn with_cursor(&self, cursor: Option<IndexedOutputsCursor>) -> Self {
        Self {
            cursor,
            ..self.clone()
        }
    }

    /// Evaluates the filter against a ledger output.
    pub fn matches(&self, ledger_output: &LedgerOutput) -> bool {
        let output = &ledger_output.output;
        let conditions = output.unlock_conditions();
        let native_tokens = output.native_tokens();
        let features = output.features();
        let created = ledger_output.booked.milestone_timestamp;

        let wants_native_tokens = matches!(self.has_native_tokens, Some(true))
            || self.min_native_token_count.is_some()
            || self.max_native_token_count.is_some();
        let native_tokens_match = match self.has_native_tokens {
            Some(false) => native_tokens.is_empty(),
            _ => {
                (!wants_native_tokens || !native_tokens.is_empty())
                    && self
                        .min_native_token_count
                        .map_or(true, |min| native_tokens.iter().all(|t| t.amount >= min))
                    && self
                        .max_native_token_count
                        .map_or(true, |max| native_tokens.iter().all(|t| t.amount <= max))
            }
        };

        let sdruc = conditions.storage_deposit_return();
        let timelock = conditions.timelock();
        let expiration = conditions.expiration();

        self.kind.map_or(true, |kind| output.kind() == kind)
            && self.address.map_or(true, |a| output.owning_address() == &a)
            && native_tokens_match
            && self.has_storage_deposit_return.map_or(true, |has| sdruc.is_some() == has)
            && self
                .storage_deposit_return_address
                .map_or(true, |a| sdruc.map_or(false, |c| c.return_address == a))
            && self.has_timelock.map_or(true, |has| timelock.is_some() == has)
            && self
                .timelocked_before
                .map_or(true, |t| timelock.map_or(false, |c| c.timestamp < t))
            && self
                .timelocked_after
                .map_or(true, |t| timelock.map_or(false, |c| c.timestamp > t))
            && self.has_expiration.map_or(true, |has| expiration.is_some() == has)
            && self
                .expires_before
                .map_or(true, |t| expiration.map_or(false, |c| c.timestamp < t))
            && self
                .expires_after
                .map_or(true, |t| expiration.map_or(false, |c| c.timestamp > t))
            && self
                .expiration_return_address
                .map_or(true, |a| expiration.map_or(false, |c| c.return_address == a))
            && self.sender.map_or(true, |a| features.sender() == Some(&a))
            && self
                .tag
                .as_ref()
                .map_or(true, |tag| features.tag() == Some(tag.as_bytes()))
            && self.created_before.map_or(true, |t| created < t)
            && self.created_after.map_or(true, |t| created > t)
    }

    /// Renders the filter as the query string of the REST indexer, with addresses encoded for `bech32_hrp`.
    pub fn to_query_string(&self, bech32_hrp: &str) -> Result<String, Error> {
        let bech32 = |a: &Option<Address>| a.map(|a| a.to_bech32(bech32_hrp));
        let query = QueryParameterDto {
            address: bech32(&self.address),
            has_native_tokens: self.has_native_tokens,
            min_native_token_count: self.min_native_token_count.map(|c| c.to_string()),
            max_native_token_count: self.max_native_token_count.map(|c| c.to_string()),
            has_storage_deposit_return: self.has_storage_deposit_return,
            storage_deposit_return_address: bech32(&self.storage_deposit_return_address),
            has_timelock: self.has_timelock,
            timelocked_before: self.timelocked_before.map(|t| t.0),
            timelocked_after: self.timelocked_after.map(|t| t.0),
            has_expiration: self.has_expiration,
            expires_before: self.expires_before.map(|t| t.0),
            expires_after: self.expires_after.map(|t| t.0),
            expiration_return_address: bech32(&self.expiration_return_address),
            sender: bech32(&self.sender),
            tag: self.tag.clone(),
            created_before: self.created_before.map(|t| t.0),
            created_after: self.created_after.map(|t| t.0),
            page_size: self.page_size,
            cursor: self.cursor.map(|c| c.to_string()),
        };
        serde_urlencoded::to_string(query).map_err(Error::collaborator)
    }
}

impl From<&QueryParameter> for bson::Document {
    fn from(query: &QueryParameter) -> Self {
        let mut queries = Vec::<bson::Document>::new();
        queries.append_query(KindQuery(query.kind));
        queries.append_query(OwnerQuery {
            address: query.address,
            kind: query.kind,
        });
        queries.append_query(NativeTokensQuery {
            has_native_tokens: query.has_native_tokens,
            min_native_token_count: query.min_native_token_count,
            max_native_token_count: query.max_native_token_count,
        });
        queries.append_query(StorageDepositReturnQuery {
            has_storage_deposit_return: query.has_storage_deposit_return,
            storage_deposit_return_address: query.storage_deposit_return_address,
        });
        queries.append_query(TimelockQuery {
            has_timelock: query.has_timelock,
            timelocked_before: query.timelocked_before,
            timelocked_after: query.timelocked_after,
        });
        queries.append_query(ExpirationQuery {
            has_expiration: query.has_expiration,
            expires_before: query.expires_before,
            expires_after: query.expires_after,
            expiration_return_address: query.expiration_return_address,
        });
        queries.append_query(SenderQuery(query.sender));
        queries.append_query(TagQuery(query.tag.clone()));
        queries.append_query(CreatedQuery {
            created_before: query.created_before,
            created_after: query.created_after,
        });
        if queries.is_empty() {
            return Default::default();
        }
        doc! { "$and": queries }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryParameterDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_native_tokens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_native_token_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_native_token_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_storage_deposit_return: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_deposit_return_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_timelock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timelocked_before: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timelocked_after: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_expiration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_before: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_after: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_return_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_before: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_after: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<String>,
}

/// Builds a [`QueryParameter`] from user input. The first invalid input is reported by [`finish`](Self::finish).
#[derive(Debug)]
#[must_use]
pub struct QueryParameterBuilder {
    bech32_hrp: String,
    query: QueryParameter,
    error: Option<Error>,
}

macro_rules! flag_setters {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(mut self, value: bool) -> Self {
                self.query.$name = Some(value);
                self
            }
        )*
    };
}

macro_rules! timestamp_setters {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(mut self, value: impl Into<MilestoneTimestamp>) -> Self {
                self.query.$name = Some(value.into());
                self
            }
        )*
    };
}

impl QueryParameterBuilder {
    fn decode(&mut self, bech32: &str) -> Option<Address> {
        match Address::try_from_bech32(bech32, &self.bech32_hrp) {
            Ok(address) => Some(address),
            Err(e) => {
                self.error.get_or_insert(e);
                None
            }
        }
    }

    /// Only matches outputs of the given kind.
    pub fn kind(mut self, kind: OutputKind) -> Self {
        self.query.kind = Some(kind);
        self
    }

    /// Only matches outputs owned by the bech32 `address`.
    pub fn address(mut self, address: &str) -> Self {
        self.query.address = self.decode(address);
        self
    }

    /// Only matches outputs with a storage deposit return to the bech32 `address`.
    pub fn storage_deposit_return_address(mut self, address: &str) -> Self {
        self.query.storage_deposit_return_address = self.decode(address);
        self
    }

    /// Only matches outputs that expire to the bech32 `address`.
    pub fn expiration_return_address(mut self, address: &str) -> Self {
        self.query.expiration_return_address = self.decode(address);
        self
    }

    /// Only matches outputs with the bech32 `address` as sender.
    pub fn sender(mut self, address: &str) -> Self {
        self.query.sender = self.decode(address);
        self
    }

    flag_setters!(
        /// Filters on whether outputs hold native tokens.
        has_native_tokens,
        /// Filters on whether outputs carry a storage deposit return unlock condition.
        has_storage_deposit_return,
        /// Filters on whether outputs carry a timelock unlock condition.
        has_timelock,
        /// Filters on whether outputs carry an expiration unlock condition.
        has_expiration,
    );

    timestamp_setters!(
        /// Only matches outputs timelocked before the given time.
        timelocked_before,
        /// Only matches outputs timelocked after the given time.
        timelocked_after,
        /// Only matches outputs expiring before the given time.
        expires_before,
        /// Only matches outputs expiring after the given time.
        expires_after,
        /// Only matches outputs booked before the given time.
        created_before,
        /// Only matches outputs booked after the given time.
        created_after,
    );

    /// Only matches outputs whose native token amounts are all at least `min`.
    pub fn min_native_token_count(mut self, min: U256) -> Self {
        self.query.min_native_token_count = Some(min);
        self
    }

    /// Only matches outputs whose native token amounts are all at most `max`.
    pub fn max_native_token_count(mut self, max: U256) -> Self {
        self.query.max_native_token_count = Some(max);
        self
    }

    /// Only matches outputs with the given tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.query.tag = Some(tag.into());
        self
    }

    /// Sets the number of results per page, which has to be at least one.
    pub fn page_size(mut self, page_size: usize) -> Self {
        if page_size == 0 {
            self.error.get_or_insert(Error::InvalidPageSize(page_size));
        } else {
            self.query.page_size = Some(page_size);
        }
        self
    }

    /// Continues from a cursor returned by a previous page.
    pub fn cursor(mut self, cursor: &str) -> Self {
        match cursor.parse() {
            Ok(cursor) => self.query.cursor = Some(cursor),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Returns the filter, or the first invalid input.
    pub fn finish(self) -> Result<QueryParameter, Error> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.query),
        }
    }
}

/// Presence filters for the unlock conditions and native tokens of an output. `None` does not filter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct QueryFlags {
    pub has_native_tokens: Option<bool>,
    pub has_storage_deposit_return: Option<bool>,
    pub has_timelock: Option<bool>,
    pub has_expiration: Option<bool>,
}

/// Builds the filter for outputs owned by the bech32 `address`, which has to use the `bech32_hrp` prefix.
pub fn build_query(address: &str, bech32_hrp: &str, flags: QueryFlags) -> Result<QueryParameter, Error> {
    let mut query = QueryParameter::builder(bech32_hrp).address(address).finish()?;
    query.has_native_tokens = flags.has_native_tokens;
    query.has_storage_deposit_return = flags.has_storage_deposit_return;
    query.has_timelock = flags.has_timelock;
    query.has_expiration = flags.has_expiration;
    Ok(query)
}

/// A page of output ids returned by the indexer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputIdsResponse {
    /// The ledger index at which the query was answered.
    pub ledger_index: MilestoneIndex,
    /// The matching output ids.
    pub items: Vec<OutputId>,
    /// The cursor of the next page, if there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{block::TransactionId, utxo::Ed25519Address};

    fn bech32() -> String {
        Address::from(Ed25519Address([1; 32])).to_bech32("rms")
    }

    #[test]
    fn builder_reports_invalid_address() {
        assert!(matches!(
            QueryParameter::builder("rms").address("").finish(),
            Err(Error::InvalidAddress(_))
        ));
        let wrong_prefix = Address::from(Ed25519Address([1; 32])).to_bech32("smr");
        assert!(matches!(
            build_query(&wrong_prefix, "rms", QueryFlags::default()),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn unset_flags_are_omitted() {
        let query = build_query(&bech32(), "rms", QueryFlags::default()).unwrap();
        let document = bson::Document::from(&query);
        assert_eq!(document.get_array("$and").unwrap().len(), 1);
    }

    #[test]
    fn false_flags_require_absence() {
        let query = build_query(
            &bech32(),
            "rms",
            QueryFlags {
                has_storage_deposit_return: Some(false),
                has_timelock: Some(false),
                has_expiration: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        let document = bson::Document::from(&query);
        let queries = document.get_array("$and").unwrap();
        assert_eq!(queries.len(), 4);
        assert_eq!(
            queries[3].as_document().unwrap(),
            &doc! { "output.expiration_unlock_condition": { "$exists": false } }
        );
    }

    #[test]
    fn query_string() {
        let query = QueryParameter::builder("rms")
            .address(&bech32())
            .has_expiration(false)
            .has_storage_deposit_return(false)
            .has_timelock(false)
            .page_size(10)
            .finish()
            .unwrap();
        assert_eq!(
            query.to_query_string("rms").unwrap(),
            format!(
                "address={}&hasStorageDepositReturn=false&hasTimelock=false&hasExpiration=false&pageSize=10",
                bech32()
            )
        );
    }

    #[test]
    fn cursor_round_trip() {
        let cursor = IndexedOutputsCursor {
            milestone_index: 17.into(),
            output_id: OutputId::new(TransactionId([3; 32]), 1),
            page_size: 50,
        };
        let query = QueryParameter::builder("rms")
            .cursor(&cursor.to_string())
            .finish()
            .unwrap();
        assert_eq!(query.cursor, Some(cursor));
        assert_eq!(query.effective_page_size(), 50);
        assert!(matches!(
            QueryParameter::builder("rms").cursor("nonsense").finish(),
            Err(Error::InvalidCursor(_))
        ));
    }

    #[test]
    fn zero_page_size() {
        assert!(matches!(
            QueryParameter::builder("rms").page_size(0).finish(),
            Err(Error::InvalidPageSize(0))
        ));
        let cursor = format!("17.{}.0", OutputId::new(TransactionId([3; 32]), 1).to_hex());
        assert!(matches!(
            QueryParameter::builder("rms").cursor(&cursor).finish(),
            Err(Error::InvalidPageSize(0))
        ));
        let query = QueryParameter {
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(query.effective_page_size(), 1);
    }
}
