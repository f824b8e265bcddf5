//! Core domain models for scrub
//!
//! This crate contains:
//! - Span and ticket models (PiiSpan, Ticket, RedactedTicket)
//! - Redaction strategies and CRM source identifiers
//! - The detector seam shared by the engine and detector implementations

pub mod detector;
pub mod error;
pub mod span;
pub mod strategy;
pub mod ticket;

pub use detector::{Detection, PiiDetector};
pub use error::{CoreError, Result};
pub use span::{Candidate, PiiSpan};
pub use strategy::Strategy;
pub use ticket::{Interaction, RedactedInteraction, RedactedTicket, SourceId, Ticket};
