//! Generic JSON-over-HTTP CRM connector
//!
//! Expects `GET {base_url}/tickets/{id}` to return
//! `{"ticket_id": .., "interactions": [{"interaction_id": .., "body": ..}]}`
//! and accepts the redacted ticket on `PUT {base_url}/tickets/{id}/redaction`.

use async_trait::async_trait;
use scrub_core::{CoreError, Interaction, RedactedTicket, Result, SourceId, Ticket};
use serde::Deserialize;
use std::time::Duration;

use crate::connector::ConnectorBackend;

/// Options for building an [`HttpConnector`]
#[derive(Debug, Clone)]
pub struct HttpConnectorOptions {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpConnectorOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Deserialize)]
struct RemoteTicket {
    ticket_id: serde_json::Value,
    #[serde(default)]
    interactions: Vec<Interaction>,
}

pub struct HttpConnector {
    source: SourceId,
    base_url: reqwest::Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpConnector {
    pub fn new(source: SourceId, options: HttpConnectorOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("scrub/1.0 (pii redaction)")
            .timeout(options.timeout)
            .build()
            .map_err(|e| {
                CoreError::ConnectorFailure(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = reqwest::Url::parse(options.base_url.trim_end_matches('/')).map_err(|e| {
            CoreError::ConnectorFailure(format!("Invalid base_url {:?}: {}", options.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::ConnectorFailure(format!(
                "Invalid base_url {:?}: not a hierarchical URL",
                options.base_url
            )));
        }

        Ok(Self {
            source,
            base_url,
            token: options.token,
            client,
        })
    }

    /// `{base_url}/tickets/{ticket_id}[/{tail}]`, with the id encoded as one path segment
    fn ticket_url(&self, ticket_id: &str, tail: Option<&str>) -> Result<reqwest::Url> {
        if ticket_id.is_empty() || ticket_id == "." || ticket_id == ".." {
            return Err(CoreError::ConnectorFailure(format!(
                "invalid ticket id {:?}",
                ticket_id
            )));
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| self.failure("request", "base_url cannot carry a path"))?;
            segments.pop_if_empty().push("tickets").push(ticket_id);
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn failure(&self, action: &str, detail: impl std::fmt::Display) -> CoreError {
        CoreError::ConnectorFailure(format!("{} {} failed: {}", self.source, action, detail))
    }
}

#[async_trait]
impl ConnectorBackend for HttpConnector {
    fn source(&self) -> SourceId {
        self.source
    }

    async fn fetch(&self, ticket_id: &str) -> Result<Ticket> {
        let response = self
            .authorize(self.client.get(self.ticket_url(ticket_id, None)?))
            .send()
            .await
            .map_err(|e| self.failure("fetch", e))?;

        if !response.status().is_success() {
            return Err(self.failure(
                "fetch",
                format!("HTTP {} for ticket {}", response.status().as_u16(), ticket_id),
            ));
        }

        let remote: RemoteTicket = response
            .json()
            .await
            .map_err(|e| self.failure("fetch", e))?;

        // CRMs disagree on numeric vs string ids
        let remote_id = match remote.ticket_id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };

        Ok(Ticket {
            ticket_id: remote_id,
            source: self.source,
            interactions: remote.interactions,
        })
    }

    async fn update(&self, ticket: &RedactedTicket) -> Result<()> {
        let url = self.ticket_url(&ticket.ticket_id, Some("redaction"))?;
        let response = self
            .authorize(self.client.put(url).json(ticket))
            .send()
            .await
            .map_err(|e| self.failure("update", e))?;

        if !response.status().is_success() {
            return Err(self.failure(
                "update",
                format!(
                    "HTTP {} for ticket {}",
                    response.status().as_u16(),
                    ticket.ticket_id
                ),
            ));
        }

        tracing::info!("Pushed redacted ticket {} to {}", ticket.ticket_id, self.source);
        Ok(())
    }
}
