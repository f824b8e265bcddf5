//! Wiring of configured components into a pipeline

use anyhow::{Context, Result};
use scrub_config::{Config, ConnectorConfig, ConnectorKind, DetectorConfig, DetectorKind};
use scrub_connectors::{
    ConnectorBackend, ConnectorRegistry, HttpConnector, HttpConnectorOptions, MemoryConnector,
};
use scrub_core::{PiiDetector, SourceId, Strategy};
use scrub_detect::{LlmDetector, LlmDetectorOptions, PatternDetector};
use scrub_engine::{RedactionPipeline, TicketRedactor};
use scrub_security::RedactionEngine;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub fn build_pipeline(config: &Config) -> Result<RedactionPipeline> {
    let detector = build_detector(&config.detector)?;
    let engine = RedactionEngine::with_overlap_policy(config.redaction.overlap);

    let mut redactor = TicketRedactor::new(detector, engine);
    if config.detector.timeout_secs > 0 {
        redactor = redactor.with_detect_timeout(Duration::from_secs(config.detector.timeout_secs));
    }

    let registry = build_registry(&config.connectors)?;
    info!(
        "Pipeline ready: {} detector, connectors [{}], default strategy {}",
        redactor.detector_name(),
        registry
            .sources()
            .iter()
            .map(SourceId::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        config.redaction.strategy
    );

    Ok(RedactionPipeline::new(
        registry,
        redactor,
        config.redaction.strategy,
    ))
}

pub fn build_detector(config: &DetectorConfig) -> Result<Arc<dyn PiiDetector>> {
    match config.kind {
        DetectorKind::Pattern => Ok(Arc::new(PatternDetector::new())),
        DetectorKind::Llm => {
            let api_key = std::env::var(&config.api_key_env).ok();
            if api_key.is_none() {
                warn!("{} is not set; calling {} without credentials", config.api_key_env, config.endpoint);
            }
            let detector = LlmDetector::new(LlmDetectorOptions {
                endpoint: config.endpoint.clone(),
                model: config.model.clone(),
                api_key,
                timeout: Duration::from_secs(config.timeout_secs.max(1)),
            })?;
            Ok(Arc::new(detector))
        }
    }
}

pub fn build_registry(connectors: &[ConnectorConfig]) -> Result<ConnectorRegistry> {
    let mut registry = ConnectorRegistry::new();

    for connector in connectors {
        let backend: Arc<dyn ConnectorBackend> = match connector.kind {
            ConnectorKind::Memory if connector.source == SourceId::Demo => {
                Arc::new(MemoryConnector::with_fixtures())
            }
            ConnectorKind::Memory => Arc::new(MemoryConnector::new(connector.source)),
            ConnectorKind::Http => {
                let base_url = connector.base_url.clone().with_context(|| {
                    format!("http connector for {} needs a base_url", connector.source)
                })?;
                let mut options = HttpConnectorOptions::new(base_url);
                options.token = connector
                    .token_env
                    .as_deref()
                    .and_then(|name| std::env::var(name).ok());
                options.timeout = Duration::from_secs(connector.timeout_secs.max(1));
                Arc::new(HttpConnector::new(connector.source, options)?)
            }
        };
        registry.register(backend)?;
    }

    Ok(registry)
}

/// Strategy from a command-line flag, falling back to the configured one
pub fn strategy_or_default(raw: Option<&str>, fallback: Strategy) -> Result<Strategy> {
    match raw {
        Some(raw) => Ok(raw.parse::<Strategy>()?),
        None => Ok(fallback),
    }
}
