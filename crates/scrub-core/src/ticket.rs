use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, PiiSpan};

/// CRM backends known at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Demo,
    Zendesk,
    Salesforce,
    Intercom,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::Demo,
        SourceId::Zendesk,
        SourceId::Salesforce,
        SourceId::Intercom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Demo => "demo",
            SourceId::Zendesk => "zendesk",
            SourceId::Salesforce => "salesforce",
            SourceId::Intercom => "intercom",
        }
    }
}

impl FromStr for SourceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownSource(s.to_string()))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message or comment in a ticket's conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub interaction_id: String,
    pub body: String,
}

impl Interaction {
    pub fn new(interaction_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            body: body.into(),
        }
    }
}

/// A support ticket as fetched from a CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub source: SourceId,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

impl Ticket {
    pub fn new(ticket_id: impl Into<String>, source: SourceId) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            source,
            interactions: Vec::new(),
        }
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interactions.push(interaction);
        self
    }
}

/// Redacted body of one interaction plus the spans applied to it.
///
/// `entities` refer to offsets in the original body, ascending by start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedInteraction {
    pub interaction_id: String,
    pub body: String,
    pub entities: Vec<PiiSpan>,
}

/// Redacted ticket, holding only the interactions that were redacted successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedTicket {
    pub ticket_id: String,
    pub source: SourceId,
    pub interactions: Vec<RedactedInteraction>,
}

impl RedactedTicket {
    pub fn new(ticket_id: impl Into<String>, source: SourceId) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            source,
            interactions: Vec::new(),
        }
    }

    /// Total number of spans applied across all interactions
    pub fn entity_count(&self) -> usize {
        self.interactions.iter().map(|i| i.entities.len()).sum()
    }
}
