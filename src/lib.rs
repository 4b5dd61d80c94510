// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Stardust output model, unlock condition evaluation and claim scanning.
//!
//! The crate is purely computational: every operation takes the current ledger time explicitly and retains no state
//! between calls. Network access, signing and block submission are consumed through the traits in [`client`].

pub mod claim;
pub mod client;
mod error;
pub mod indexer;
pub mod model;

pub use self::{
    claim::{classify_outputs, ClaimClassification, UnclaimableReason},
    error::Error,
    indexer::{build_query, QueryFlags, QueryParameter},
    model::output::foundry::build_foundry_output,
};
