// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

mod common;

use pretty_assertions::assert_eq;
use primitive_types::U256;
use stardust_claims::{
    build_foundry_output,
    model::{
        output::{
            unlock_condition::{AddressUnlockCondition, ImmutableAliasAddressUnlockCondition},
            FoundryId, Output, SimpleTokenScheme, TokenId, TokenScheme, UnlockCondition,
        },
        protocol::ProtocolParameters,
        utxo::{Address, AliasAddress, AliasId},
        Pack,
    },
    Error,
};

use self::common::address;

fn alias() -> Address {
    AliasAddress(AliasId([3; 32])).into()
}

fn scheme(minted: u64, melted: u64, maximum_supply: u64) -> TokenScheme {
    TokenScheme::Simple(SimpleTokenScheme {
        minted_tokens: U256::from(minted),
        melted_tokens: U256::from(melted),
        maximum_supply: U256::from(maximum_supply),
    })
}

fn controlled_by_alias() -> Vec<UnlockCondition> {
    vec![ImmutableAliasAddressUnlockCondition::new(alias()).unwrap().into()]
}

#[test]
fn test_build_foundry_output() {
    let params = ProtocolParameters::default();
    let output = build_foundry_output(1, scheme(0, 0, 1_000_000), controlled_by_alias(), &params).unwrap();

    let Output::Foundry(foundry) = &output else {
        panic!("expected a foundry output");
    };
    assert_eq!(output.owning_address(), &alias());
    assert_eq!(foundry.serial_number, 1);
    assert_eq!(foundry.foundry_id, FoundryId::build(&alias(), 1, SimpleTokenScheme::KIND));
    assert_eq!(foundry.token_id(), TokenId::from(foundry.foundry_id));
    assert_eq!(output.amount().0, output.min_deposit(&params.rent_structure));
    assert_eq!(output.packed_len(), 148);
}

#[test]
fn test_token_scheme_invariant() {
    let params = ProtocolParameters::default();
    // 600 - 100 = 500 circulating tokens exceed the maximum supply of 400.
    assert!(matches!(
        build_foundry_output(1, scheme(600, 100, 400), controlled_by_alias(), &params),
        Err(Error::TokenSchemeInvariantViolation { .. })
    ));
    assert!(build_foundry_output(1, scheme(600, 200, 400), controlled_by_alias(), &params).is_ok());
}

#[test]
fn test_address_unlock_condition_is_rejected() {
    let params = ProtocolParameters::default();
    let with_address = vec![AddressUnlockCondition { address: address(1) }.into()];
    assert!(matches!(
        build_foundry_output(1, scheme(0, 0, 10), with_address, &params),
        Err(Error::InvalidUnlockConditionSet(_))
    ));

    let mut both = controlled_by_alias();
    both.push(AddressUnlockCondition { address: address(1) }.into());
    assert!(matches!(
        build_foundry_output(1, scheme(0, 0, 10), both, &params),
        Err(Error::InvalidUnlockConditionSet(_))
    ));
}

#[test]
fn test_first_violation_is_reported() {
    let params = ProtocolParameters::default();
    // Serial number, then token scheme, then unlock conditions.
    assert!(matches!(
        build_foundry_output(0, scheme(5, 0, 1), Vec::new(), &params),
        Err(Error::InvalidSerialNumber(0))
    ));
    assert!(matches!(
        build_foundry_output(1, scheme(5, 0, 1), Vec::new(), &params),
        Err(Error::TokenSchemeInvariantViolation { .. })
    ));
    assert!(matches!(
        build_foundry_output(1, scheme(0, 0, 1), Vec::new(), &params),
        Err(Error::InvalidUnlockConditionSet(_))
    ));
}
