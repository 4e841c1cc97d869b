mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{cover, territories};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Cover(args) => cover::run(&cli, args),
        Commands::Territories(args) => territories::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
