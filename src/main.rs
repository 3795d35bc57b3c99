//! Promptscore CLI entry point.

use anyhow::Result;
use clap::Parser;

use promptscore::cli::commands::{analyze, extract, rules};
use promptscore::cli::{handle_error, Cli, Commands};
use promptscore::infrastructure::{ConfigLoader, LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(&err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::try_from(&config.logging)?)?;

    match cli.command {
        Commands::Analyze(args) => analyze::execute(args, &config, cli.json).await,
        Commands::Extract(args) => extract::execute(args, cli.json),
        Commands::Rules => rules::execute(cli.json),
    }
}
