use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scrub")]
#[command(about = "PII redaction for CRM support tickets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Redact a CRM ticket and write it back
    Ticket {
        /// CRM source (demo, zendesk, salesforce, intercom)
        source: String,

        ticket_id: String,

        /// mask, tokenize or hash (default from config)
        #[arg(long)]
        strategy: Option<String>,

        /// Print the redacted ticket without updating the CRM
        #[arg(long)]
        dry_run: bool,
    },

    /// Redact a piece of text
    Text {
        /// Text to redact; read from stdin when omitted
        text: Option<String>,

        #[arg(long)]
        strategy: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticket_command() {
        let cli = Cli::try_parse_from([
            "scrub",
            "ticket",
            "demo",
            "101",
            "--strategy",
            "hash",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Ticket {
                source,
                ticket_id,
                strategy,
                dry_run,
            } => {
                assert_eq!(source, "demo");
                assert_eq!(ticket_id, "101");
                assert_eq!(strategy.as_deref(), Some("hash"));
                assert!(dry_run);
            }
            _ => panic!("expected ticket command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["scrub", "serve", "--port", "9000", "--config", "/tmp/s.toml"])
            .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: Some(9000),
                host: None
            }
        ));
    }

    #[test]
    fn test_text_without_argument() {
        let cli = Cli::try_parse_from(["scrub", "text"]).unwrap();
        assert!(matches!(cli.command, Commands::Text { text: None, strategy: None }));
    }
}
