use anyhow::Result;
use scrub_config::Config;
use scrub_core::SourceId;

use crate::setup::{build_pipeline, strategy_or_default};

pub async fn handle(
    config: &Config,
    source: &str,
    ticket_id: &str,
    strategy: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let source: SourceId = source.parse()?;
    let strategy = strategy_or_default(strategy.as_deref(), config.redaction.strategy)?;
    let pipeline = build_pipeline(config)?;

    let redacted = if dry_run {
        pipeline.preview(source, ticket_id, Some(strategy)).await?
    } else {
        pipeline.run(source, ticket_id, Some(strategy)).await?
    };

    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}
