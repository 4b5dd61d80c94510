// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the block and transaction identifiers.

use crate::model::util::impl_id;

impl_id!(
    /// Uniquely identifies a block.
    BlockId,
    32
);

impl_id!(
    /// Uniquely identifies a transaction.
    TransactionId,
    32
);

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn block_id_hex() {
        let block_id = BlockId([0xab; 32]);
        let hex = block_id.to_hex();
        assert_eq!(hex.len(), 66);
        assert_eq!(hex.parse::<BlockId>().unwrap(), block_id);
        assert_eq!(serde_json::to_string(&block_id).unwrap(), format!("\"{hex}\""));
    }
}
