use anyhow::Result;
use scrub_config::Config;
use scrub_server::ScrubServer;
use std::sync::Arc;

use crate::setup::build_pipeline;

pub async fn handle(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let pipeline = Arc::new(build_pipeline(&config)?);

    println!(
        "Starting redaction server on {}:{}",
        config.server.host, config.server.port
    );
    ScrubServer::serve(pipeline, &config.server).await?;

    Ok(())
}
