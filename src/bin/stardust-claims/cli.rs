// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use mongodb::bson::{Bson, Document};
use primitive_types::U256;
use stardust_claims::{
    build_foundry_output, build_query, classify_outputs,
    model::{
        output::{FoundryOutputBuilder, LedgerOutput, Output, SimpleTokenScheme, TokenScheme, UnlockCondition},
        tangle::MilestoneTimestamp,
        utxo::{Address, ImmutableAliasAddressUnlockCondition},
    },
    ClaimClassification, QueryFlags,
};

use crate::{
    config::{ClaimsConfig, ConfigError},
    error::Error,
};

/// Output queries, claim classification and foundry construction for Stardust ledgers.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct ClArgs {
    /// The location of the configuration file.
    #[arg(short, long, env = "CONFIG_PATH")]
    pub config: Option<String>,
    /// The human-readable part of bech32 addresses.
    #[arg(long = "protocol.bech32-hrp", env = "BECH32_HRP")]
    pub bech32_hrp: Option<String>,
    /// The number of output ids per indexer page.
    #[arg(long = "claim.page-size", env = "CLAIM_PAGE_SIZE")]
    pub page_size: Option<usize>,
    /// Subcommands.
    #[command(subcommand)]
    pub subcommand: Subcommands,
}

impl ClArgs {
    /// Get a config file with CLI args applied.
    pub fn get_config(&self) -> Result<ClaimsConfig, ConfigError> {
        let mut config = self
            .config
            .as_ref()
            .map(ClaimsConfig::from_file)
            .transpose()?
            .unwrap_or_default();

        if let Some(bech32_hrp) = &self.bech32_hrp {
            config.protocol.bech32_hrp = bech32_hrp.clone();
        }
        if let Some(page_size) = self.page_size {
            config.claim.page_size = page_size;
        }
        config.validate()?;

        Ok(config)
    }

    /// Runs the subcommand.
    pub async fn process_subcommand(&self, config: &ClaimsConfig) -> Result<(), Error> {
        match &self.subcommand {
            Subcommands::Query {
                address,
                has_native_tokens,
                has_storage_deposit_return,
                has_timelock,
                has_expiration,
            } => {
                let flags = QueryFlags {
                    has_native_tokens: *has_native_tokens,
                    has_storage_deposit_return: *has_storage_deposit_return,
                    has_timelock: *has_timelock,
                    has_expiration: *has_expiration,
                };
                let mut query = build_query(address, &config.protocol.bech32_hrp, flags)?;
                query.page_size = Some(config.claim.page_size);
                let filter = Bson::Document(Document::from(&query)).into_relaxed_extjson();
                println!("{}", serde_json::to_string_pretty(&filter)?);
                println!("{}", query.to_query_string(&config.protocol.bech32_hrp)?);
            }
            Subcommands::Classify { address, outputs, time } => {
                let claimant = Address::try_from_bech32(address, &config.protocol.bech32_hrp)?;
                let contents = tokio::fs::read_to_string(outputs)
                    .await
                    .map_err(|e| Error::OutputsRead(outputs.display().to_string(), e))?;
                let outputs = serde_json::from_str::<Vec<LedgerOutput>>(&contents)?;
                let now = time.map(MilestoneTimestamp::from).unwrap_or_else(MilestoneTimestamp::now);
                for (output_id, classification) in classify_outputs(&claimant, &outputs, now) {
                    let mut line = serde_json::json!({
                        "outputId": output_id.to_hex(),
                        "classification": classification,
                    });
                    if let ClaimClassification::NotYetClaimable { unlock_time } = classification {
                        let wait = Duration::from_secs(now.seconds_until(unlock_time) as u64);
                        line["claimableIn"] = humantime::format_duration(wait).to_string().into();
                    }
                    println!("{line}");
                }
            }
            Subcommands::Foundry {
                alias,
                serial,
                minted,
                melted,
                maximum_supply,
                amount,
            } => {
                let alias = Address::try_from_bech32(alias, &config.protocol.bech32_hrp)?;
                let token_scheme: TokenScheme = SimpleTokenScheme::new(*minted, *melted, *maximum_supply)?.into();
                let unlock_condition: UnlockCondition = ImmutableAliasAddressUnlockCondition::new(alias)?.into();
                let output: Output = match amount {
                    Some(amount) => FoundryOutputBuilder::new(*serial, token_scheme, [unlock_condition])
                        .with_amount(*amount)
                        .finish(&config.protocol)?
                        .into(),
                    None => build_foundry_output(*serial, token_scheme, [unlock_condition], &config.protocol)?,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Ok(())
    }
}

fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_dec_str(s).map_err(|e| format!("{e:?}"))
}

#[derive(Debug, Subcommand)]
pub enum Subcommands {
    /// Prints the indexer filter for the outputs owned by an address.
    Query {
        /// The bech32 address.
        #[arg(long)]
        address: String,
        #[arg(long)]
        has_native_tokens: Option<bool>,
        #[arg(long)]
        has_storage_deposit_return: Option<bool>,
        #[arg(long)]
        has_timelock: Option<bool>,
        #[arg(long)]
        has_expiration: Option<bool>,
    },
    /// Classifies the outputs in a JSON file for a claimant.
    Classify {
        /// The bech32 address of the claimant.
        #[arg(long)]
        address: String,
        /// A JSON file containing a list of ledger outputs.
        #[arg(long)]
        outputs: PathBuf,
        /// The ledger time as a Unix timestamp. Defaults to now.
        #[arg(long)]
        time: Option<u32>,
    },
    /// Builds a foundry output controlled by an alias.
    Foundry {
        /// The bech32 address of the controlling alias.
        #[arg(long)]
        alias: String,
        #[arg(long)]
        serial: u32,
        #[arg(long, value_parser = parse_u256, default_value = "0")]
        minted: U256,
        #[arg(long, value_parser = parse_u256, default_value = "0")]
        melted: U256,
        #[arg(long, value_parser = parse_u256)]
        maximum_supply: U256,
        /// The amount of base tokens. Defaults to the minimum storage deposit.
        #[arg(long)]
        amount: Option<u64>,
    },
}
