use anyhow::{Context, Result};
use scrub_config::Config;
use std::io::Read;

use crate::setup::{build_pipeline, strategy_or_default};

pub async fn handle(config: &Config, text: Option<String>, strategy: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf
        }
    };
    let strategy = strategy_or_default(strategy.as_deref(), config.redaction.strategy)?;
    let pipeline = build_pipeline(config)?;

    let redaction = pipeline.redactor().redact_text(&text, strategy).await?;

    println!("{}", serde_json::to_string_pretty(&redaction)?);
    Ok(())
}
