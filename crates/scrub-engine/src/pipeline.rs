//! Fetch, redact, write back

use scrub_connectors::ConnectorRegistry;
use scrub_core::{RedactedTicket, Result, SourceId, Strategy};
use tracing::{Instrument, error, info, info_span};

use crate::aggregator::TicketRedactor;

pub struct RedactionPipeline {
    connectors: ConnectorRegistry,
    redactor: TicketRedactor,
    default_strategy: Strategy,
}

impl RedactionPipeline {
    pub fn new(
        connectors: ConnectorRegistry,
        redactor: TicketRedactor,
        default_strategy: Strategy,
    ) -> Self {
        Self {
            connectors,
            redactor,
            default_strategy,
        }
    }

    pub fn default_strategy(&self) -> Strategy {
        self.default_strategy
    }

    pub fn connectors(&self) -> &ConnectorRegistry {
        &self.connectors
    }

    pub fn redactor(&self) -> &TicketRedactor {
        &self.redactor
    }

    /// Fetch a ticket, redact it and write the result back to its CRM
    pub async fn run(
        &self,
        source: SourceId,
        ticket_id: &str,
        strategy: Option<Strategy>,
    ) -> Result<RedactedTicket> {
        self.execute(source, ticket_id, strategy, true).await
    }

    /// Same as [`run`](Self::run) without the write back
    pub async fn preview(
        &self,
        source: SourceId,
        ticket_id: &str,
        strategy: Option<Strategy>,
    ) -> Result<RedactedTicket> {
        self.execute(source, ticket_id, strategy, false).await
    }

    async fn execute(
        &self,
        source: SourceId,
        ticket_id: &str,
        strategy: Option<Strategy>,
        write_back: bool,
    ) -> Result<RedactedTicket> {
        let strategy = strategy.unwrap_or(self.default_strategy);
        let span = info_span!(
            "redact_ticket",
            request_id = %uuid::Uuid::new_v4(),
            source = %source,
            ticket_id = %ticket_id
        );

        async move {
            // 1. Fetch
            info!("Fetching ticket from {}", source);
            let ticket = self.connectors.fetch(source, ticket_id).await.map_err(|e| {
                error!("Fetch failed: {}", e);
                e
            })?;

            // 2. Detect and redact each interaction
            let redacted = self.redactor.process(&ticket, strategy).await;

            // 3. Write back
            if write_back {
                info!("Updating {} with redacted ticket", source);
                self.connectors.update(&redacted).await.map_err(|e| {
                    error!("Update failed: {}", e);
                    e
                })?;
            }

            Ok(redacted)
        }
        .instrument(span)
        .await
    }
}
