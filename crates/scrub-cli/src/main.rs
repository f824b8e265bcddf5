mod cli;
mod commands;
mod setup;

use anyhow::Result;
use clap::Parser;
use scrub_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let (mut config, path) = match &cli.config {
        Some(path) => (Config::load_from(path)?, path.clone()),
        None => (Config::load()?, Config::config_path()),
    };
    config.apply_env()?;

    match cli.command {
        cli::Commands::Serve { host, port } => commands::serve::handle(config, host, port).await,
        cli::Commands::Ticket {
            source,
            ticket_id,
            strategy,
            dry_run,
        } => commands::ticket::handle(&config, &source, &ticket_id, strategy, dry_run).await,
        cli::Commands::Text { text, strategy } => {
            commands::text::handle(&config, text, strategy).await
        }
        cli::Commands::Config => commands::config::handle(&config, &path),
    }
}
