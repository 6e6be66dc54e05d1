mod config;
mod error;

use clap::Parser;
use config::{Cli, Commands};

mod cmd;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let debug = match &cli.command {
        Commands::Run(args) => args.logging_debug,
    };
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let result = match cli.command {
        Commands::Run(args) => cmd::run::run(args).await,
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
