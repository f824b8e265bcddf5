//! Ticket redaction workflow
//!
//! `TicketRedactor` turns one ticket into a redacted ticket, interaction by
//! interaction. `RedactionPipeline` wraps it with the CRM round trip.

pub mod aggregator;
pub mod pipeline;

pub use aggregator::{DroppedInteraction, InteractionState, ProcessReport, TicketRedactor};
pub use pipeline::RedactionPipeline;
