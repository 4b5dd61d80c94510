// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Command line access to output queries, claim classification and foundry construction.

mod cli;
mod config;
mod error;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use self::{cli::ClArgs, error::Error};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    set_up_logging();

    std::panic::set_hook(Box::new(|p| {
        error!("{}", p);
    }));

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Error> {
    let cl_args = ClArgs::parse();
    let config = cl_args.get_config()?;
    cl_args.process_subcommand(&config).await
}
