//! In-memory CRM used for demos and tests

use async_trait::async_trait;
use scrub_core::{CoreError, Interaction, RedactedTicket, Result, SourceId, Ticket};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::connector::ConnectorBackend;

pub struct MemoryConnector {
    source: SourceId,
    tickets: RwLock<HashMap<String, Ticket>>,
    redacted: RwLock<HashMap<String, RedactedTicket>>,
}

impl MemoryConnector {
    /// Empty store answering for `source`
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            tickets: RwLock::new(HashMap::new()),
            redacted: RwLock::new(HashMap::new()),
        }
    }

    /// Demo store seeded with sample tickets 101 to 105
    pub fn with_fixtures() -> Self {
        let tickets = fixtures()
            .into_iter()
            .map(|(id, bodies)| {
                let ticket = bodies.iter().enumerate().fold(
                    Ticket::new(id, SourceId::Demo),
                    |ticket, (n, body)| {
                        ticket.with_interaction(Interaction::new(format!("{}-{}", id, n + 1), *body))
                    },
                );
                (id.to_string(), ticket)
            })
            .collect();

        Self {
            source: SourceId::Demo,
            tickets: RwLock::new(tickets),
            redacted: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, ticket: Ticket) {
        self.tickets
            .write()
            .await
            .insert(ticket.ticket_id.clone(), ticket);
    }

    /// Last redaction written back for `ticket_id`
    pub async fn redacted(&self, ticket_id: &str) -> Option<RedactedTicket> {
        self.redacted.read().await.get(ticket_id).cloned()
    }
}

#[async_trait]
impl ConnectorBackend for MemoryConnector {
    fn source(&self) -> SourceId {
        self.source
    }

    async fn fetch(&self, ticket_id: &str) -> Result<Ticket> {
        self.tickets
            .read()
            .await
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| {
                CoreError::ConnectorFailure(format!(
                    "ticket {} not found in {}",
                    ticket_id, self.source
                ))
            })
    }

    async fn update(&self, ticket: &RedactedTicket) -> Result<()> {
        if !self.tickets.read().await.contains_key(&ticket.ticket_id) {
            return Err(CoreError::ConnectorFailure(format!(
                "cannot update unknown ticket {} in {}",
                ticket.ticket_id, self.source
            )));
        }

        tracing::info!(
            "Stored redacted ticket {} ({} interactions) in {}",
            ticket.ticket_id,
            ticket.interactions.len(),
            self.source
        );
        self.redacted
            .write()
            .await
            .insert(ticket.ticket_id.clone(), ticket.clone());
        Ok(())
    }
}

fn fixtures() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            "101",
            vec![
                "Hello, my name is Alice Smith. You can reach me at alice.smith@example.com.",
                "Sure, my phone is +1-202-555-0183 and my SSN is 123-45-6789.",
            ],
        ),
        (
            "102",
            vec![
                "Customer John Doe called from (415) 555-2671 about order 8812.",
                "He paid with card 4111 1111 1111 1111.",
                "Follow-up sent to john.doe@example.org.",
            ],
        ),
        (
            "103",
            vec!["Name: Emily Johnson\nEmail: emily.j@example.co.uk\nDOB: 1988-11-02"],
        ),
        (
            "104",
            vec![
                "User IP 192.168.0.1 accessed the portal at 10:45.",
                "Associated user: Ahmed Karim, email ahmed.k@domain.org.",
            ],
        ),
        (
            "105",
            vec![
                "Delivery scheduled to 742 Evergreen Terrace, Springfield.",
                "Contact homer.simpson@sprmail.com or (333) 444-5566.",
                "Thanks, the package arrived.",
            ],
        ),
    ]
}
