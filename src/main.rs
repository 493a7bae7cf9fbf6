use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod block;
mod cli;
mod config;
mod diff;
mod error;
mod layout;
mod naming;
mod regen;
mod report;
mod spec_table;
mod staging;
mod sync;
mod version;
mod workflow;

use cli::{Command, RootArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Sync(args) => workflow::run_sync(args),
        Command::Resolve(args) => workflow::run_resolve(args),
    }
}

/// Diagnostics go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
