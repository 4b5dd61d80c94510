// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The binary layout of ledger types, as used for storage deposit computations and on the wire.

use primitive_types::U256;

/// Writes a type in its protocol binary layout.
pub trait Pack {
    /// Appends the packed bytes to `buf`.
    fn pack(&self, buf: &mut Vec<u8>);

    /// The number of bytes of the packed representation.
    fn packed_len(&self) -> usize {
        self.pack_to_vec().len()
    }

    /// Packs into a fresh buffer.
    fn pack_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.pack(&mut buf);
        buf
    }
}

impl Pack for u8 {
    fn pack(&self, buf: &mut Vec<u8>) {
        buf.push(*self);
    }
}

impl Pack for u16 {
    fn pack(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl Pack for u32 {
    fn pack(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl Pack for u64 {
    fn pack(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl Pack for U256 {
    fn pack(&self, buf: &mut Vec<u8>) {
        let mut bytes = [0u8; 32];
        self.to_little_endian(&mut bytes);
        buf.extend_from_slice(&bytes);
    }
}

impl<const N: usize> Pack for [u8; N] {
    fn pack(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self);
    }
}

/// Packs a list prefixed by its `u8` length. All protocol lists are bounded well below 256 entries.
pub(crate) fn pack_u8_prefixed<'a, T: Pack + 'a>(items: impl ExactSizeIterator<Item = &'a T>, buf: &mut Vec<u8>) {
    (items.len() as u8).pack(buf);
    for item in items {
        item.pack(buf);
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn integers_are_little_endian() {
        assert_eq!(0x0102u16.pack_to_vec(), vec![0x02, 0x01]);
        assert_eq!(1u64.packed_len(), 8);
        assert_eq!(U256::from(1).pack_to_vec()[0], 1);
        assert_eq!(U256::MAX.packed_len(), 32);
    }
}
