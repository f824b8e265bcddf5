//! Connector trait and typed registry

use async_trait::async_trait;
use scrub_core::{CoreError, RedactedTicket, Result, SourceId, Ticket};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait for reading tickets from and writing redactions back to one CRM
#[async_trait]
pub trait ConnectorBackend: Send + Sync {
    /// The CRM this backend talks to
    fn source(&self) -> SourceId;

    /// Fetch a ticket with its interactions, in conversation order
    async fn fetch(&self, ticket_id: &str) -> Result<Ticket>;

    /// Persist a redacted ticket
    async fn update(&self, ticket: &RedactedTicket) -> Result<()>;
}

/// Maps each source to the backend that serves it
#[derive(Default, Clone)]
pub struct ConnectorRegistry {
    backends: BTreeMap<SourceId, Arc<dyn ConnectorBackend>>,
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("sources", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend. A second backend for the same source is a conflict.
    pub fn register(&mut self, backend: Arc<dyn ConnectorBackend>) -> Result<()> {
        let source = backend.source();
        if self.backends.contains_key(&source) {
            return Err(CoreError::ConnectorFailure(format!(
                "connector conflict: source '{}' is already registered",
                source
            )));
        }

        tracing::debug!("Registered connector for {}", source);
        self.backends.insert(source, backend);
        Ok(())
    }

    pub fn with(mut self, backend: Arc<dyn ConnectorBackend>) -> Result<Self> {
        self.register(backend)?;
        Ok(self)
    }

    /// Registered sources in stable order
    pub fn sources(&self) -> Vec<SourceId> {
        self.backends.keys().copied().collect()
    }

    pub fn get(&self, source: SourceId) -> Result<Arc<dyn ConnectorBackend>> {
        self.backends.get(&source).cloned().ok_or_else(|| {
            let known: Vec<&str> = self.backends.keys().map(|s| s.as_str()).collect();
            CoreError::UnknownSource(format!("{} (known: {})", source, known.join(", ")))
        })
    }

    pub async fn fetch(&self, source: SourceId, ticket_id: &str) -> Result<Ticket> {
        self.get(source)?.fetch(ticket_id).await
    }

    pub async fn update(&self, ticket: &RedactedTicket) -> Result<()> {
        self.get(ticket.source)?.update(ticket).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryConnector;

    #[test]
    fn test_duplicate_registration_conflicts() {
        let mut registry = ConnectorRegistry::new();
        registry
            .register(Arc::new(MemoryConnector::new(SourceId::Demo)))
            .unwrap();

        let err = registry
            .register(Arc::new(MemoryConnector::new(SourceId::Demo)))
            .unwrap_err();
        assert!(matches!(err, CoreError::ConnectorFailure(msg) if msg.contains("demo")));
    }

    #[test]
    fn test_unknown_source_lists_known() {
        let registry = ConnectorRegistry::new()
            .with(Arc::new(MemoryConnector::new(SourceId::Demo)))
            .unwrap()
            .with(Arc::new(MemoryConnector::new(SourceId::Zendesk)))
            .unwrap();

        assert_eq!(registry.sources(), vec![SourceId::Demo, SourceId::Zendesk]);

        let err = registry.get(SourceId::Intercom).err().unwrap();
        match err {
            CoreError::UnknownSource(msg) => {
                assert!(msg.starts_with("intercom"));
                assert!(msg.contains("demo, zendesk"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_routes_by_source() {
        let registry = ConnectorRegistry::new()
            .with(Arc::new(MemoryConnector::with_fixtures()))
            .unwrap();

        let ticket = registry.fetch(SourceId::Demo, "101").await.unwrap();
        assert_eq!(ticket.source, SourceId::Demo);
        assert!(!ticket.interactions.is_empty());

        assert!(registry.fetch(SourceId::Zendesk, "101").await.is_err());
    }
}
