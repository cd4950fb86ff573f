extern crate anyhow;
extern crate clap;
#[macro_use]
extern crate hufpack;
extern crate thiserror;
extern crate voxell_timer;
extern crate walkdir;

use std::process::ExitCode;

if_tracing! {
    use tracing_subscriber::{EnvFilter, fmt};
}

use crate::cli::{Cli, Command};
use clap::Parser;

mod cli;

fn main() -> ExitCode {
    if_tracing! {
        let subscriber = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if_tracing! {
                tracing::error!(target: "cli", error = %e, "command failed");
            }
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.settings.resolve()?;
    match cli.command {
        Command::Compress(args) => cli::compress::compress(args, &config),
        Command::Decompress(args) => cli::decompress::decompress(args, &config),
        Command::Test(args) => cli::test::test(args, &config),
        Command::Corpus(args) => cli::corpus::corpus(args, &config),
        Command::Inspect(args) => cli::inspect::inspect(args, &config),
        Command::Config { command } => cli::config::config(command, &config),
    }
}
