use scrub_core::{
    CoreError, Detection, Interaction, PiiDetector, RedactedInteraction, RedactedTicket, Result,
    Strategy, Ticket,
};
use scrub_security::{Redaction, RedactionEngine, locate};
use futures_util::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of a single interaction inside [`TicketRedactor::process`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    Pending,
    Detecting,
    Redacting,
    Done,
    Failed,
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionState::Pending => "pending",
            InteractionState::Detecting => "detecting",
            InteractionState::Redacting => "redacting",
            InteractionState::Done => "done",
            InteractionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// An interaction left out of the redacted ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedInteraction {
    pub interaction_id: String,
    /// Stage that was running when the interaction failed
    pub stage: InteractionState,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub processed: usize,
    pub dropped: Vec<DroppedInteraction>,
}

/// Redacts tickets interaction by interaction.
///
/// Interactions run sequentially in ticket order. A failure in one
/// interaction drops it from the output and never stops the others.
pub struct TicketRedactor {
    detector: Arc<dyn PiiDetector>,
    engine: RedactionEngine,
    detect_timeout: Option<Duration>,
}

impl TicketRedactor {
    pub fn new(detector: Arc<dyn PiiDetector>, engine: RedactionEngine) -> Self {
        Self {
            detector,
            engine,
            detect_timeout: None,
        }
    }

    /// Bound every detector call; a call that runs over counts as a detection failure
    pub fn with_detect_timeout(mut self, limit: Duration) -> Self {
        self.detect_timeout = Some(limit);
        self
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// Redact every interaction of `ticket`, dropping those that fail
    pub async fn process(&self, ticket: &Ticket, strategy: Strategy) -> RedactedTicket {
        self.process_with_report(ticket, strategy).await.0
    }

    pub async fn process_with_report(
        &self,
        ticket: &Ticket,
        strategy: Strategy,
    ) -> (RedactedTicket, ProcessReport) {
        let mut redacted = RedactedTicket::new(ticket.ticket_id.clone(), ticket.source);
        let mut report = ProcessReport::default();

        info!(
            "Redacting {} interactions of ticket {} with {} strategy",
            ticket.interactions.len(),
            ticket.ticket_id,
            strategy
        );

        for interaction in &ticket.interactions {
            match self.redact_interaction(interaction, strategy).await {
                Ok(done) => {
                    report.processed += 1;
                    redacted.interactions.push(done);
                }
                Err((stage, e)) => {
                    warn!(
                        "Skipping interaction {} of ticket {}: failed while {}: {}",
                        interaction.interaction_id, ticket.ticket_id, stage, e
                    );
                    report.dropped.push(DroppedInteraction {
                        interaction_id: interaction.interaction_id.clone(),
                        stage,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Ticket {}: {} interactions redacted, {} dropped",
            ticket.ticket_id,
            report.processed,
            report.dropped.len()
        );

        (redacted, report)
    }

    /// Detect and redact a single body, propagating every failure
    pub async fn redact_text(&self, text: &str, strategy: Strategy) -> Result<Redaction> {
        let detection = self.detect(text).await?;
        self.apply(text, detection, strategy)
    }

    async fn redact_interaction(
        &self,
        interaction: &Interaction,
        strategy: Strategy,
    ) -> std::result::Result<RedactedInteraction, (InteractionState, CoreError)> {
        let id = interaction.interaction_id.as_str();
        let mut state = InteractionState::Pending;

        advance(id, &mut state, InteractionState::Detecting);
        let detection = self
            .detect(&interaction.body)
            .await
            .map_err(|e| (state, e))?;
        debug!("Interaction {}: {} detections", id, detection.len());

        advance(id, &mut state, InteractionState::Redacting);
        let redaction = self
            .apply(&interaction.body, detection, strategy)
            .map_err(|e| (state, e))?;

        advance(id, &mut state, InteractionState::Done);
        Ok(RedactedInteraction {
            interaction_id: interaction.interaction_id.clone(),
            body: redaction.text,
            entities: redaction.applied,
        })
    }

    async fn detect(&self, text: &str) -> Result<Detection> {
        // A panicking detector fails this call only
        let call = AssertUnwindSafe(self.detector.detect(text)).catch_unwind();
        let outcome = match self.detect_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                CoreError::DetectionFailure(format!(
                    "{} detector timed out after {}s",
                    self.detector.name(),
                    limit.as_secs_f32()
                ))
            })?,
            None => call.await,
        };

        outcome.unwrap_or_else(|payload| {
            Err(CoreError::DetectionFailure(format!(
                "{} detector panicked: {}",
                self.detector.name(),
                panic_message(payload.as_ref())
            )))
        })
    }

    fn apply(&self, text: &str, detection: Detection, strategy: Strategy) -> Result<Redaction> {
        let spans = match detection {
            Detection::Spans(spans) => spans,
            Detection::Candidates(candidates) => locate(text, &candidates)?,
        };
        self.engine.redact(text, &spans, strategy)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

fn advance(interaction_id: &str, state: &mut InteractionState, next: InteractionState) {
    debug!("Interaction {}: {} -> {}", interaction_id, state, next);
    *state = next;
}
