// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use primitive_types::U256;
use thiserror::Error;

use crate::model::{
    output::{native_token::TokenId, OutputId},
    utxo::Address,
};

/// The errors that can occur when constructing or validating ledger data.
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    #[error("invalid unlock condition set: {0}")]
    InvalidUnlockConditionSet(String),
    #[error("duplicate `{0}` unlock condition")]
    DuplicateUnlockCondition(&'static str),
    #[error("duplicate `{0}` feature")]
    DuplicateFeature(&'static str),
    #[error("invalid feature: {0}")]
    InvalidFeature(String),
    #[error(
        "token scheme invariant violated: minted {minted}, melted {melted}, maximum supply {maximum_supply}"
    )]
    TokenSchemeInvariantViolation {
        minted: U256,
        melted: U256,
        maximum_supply: U256,
    },
    #[error("missing return payment of {amount} to {return_address:?} for output {output_id}")]
    MissingReturnPayment {
        output_id: OutputId,
        return_address: Address,
        amount: u64,
    },
    #[error("insufficient storage deposit: {amount} < {required}")]
    InsufficientStorageDeposit { amount: u64, required: u64 },
    #[error("invalid amount: {0}")]
    InvalidAmount(u64),
    #[error("invalid foundry serial number: {0}")]
    InvalidSerialNumber(u32),
    #[error("invalid native token count: {0}")]
    NativeTokenCount(usize),
    #[error("native token {0} has a zero amount")]
    ZeroNativeTokenAmount(TokenId),
    #[error("duplicate native token {0}")]
    DuplicateNativeToken(TokenId),
    #[error("native token {0} amount overflows")]
    NativeTokenOverflow(TokenId),
    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),
    #[error("invalid cursor `{0}`")]
    InvalidCursor(String),
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] prefix_hex::Error),
    #[error("collaborator error: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an error returned by one of the external collaborators.
    pub fn collaborator(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Collaborator(Box::new(e))
    }
}
