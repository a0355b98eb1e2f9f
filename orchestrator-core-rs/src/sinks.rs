//! Decision sinks
//!
//! The core only produces decisions. Whoever acts on them (a dispatcher
//! console, a ticket queue, a customer-messaging worker) plugs in here.

use std::sync::Arc;

use async_trait::async_trait;
use orchestration_types::{AggregateDecision, Disposition};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::SinkError;

#[async_trait]
pub trait DecisionSink: Send + Sync {
    async fn deliver(&self, decision: &AggregateDecision) -> Result<(), SinkError>;
}

/// Output sink for Resolved decisions, escalation sink for Escalated ones
#[derive(Clone)]
pub struct DecisionSinks {
    output: Arc<dyn DecisionSink>,
    escalation: Arc<dyn DecisionSink>,
}

impl DecisionSinks {
    pub fn new(output: Arc<dyn DecisionSink>, escalation: Arc<dyn DecisionSink>) -> Self {
        Self { output, escalation }
    }

    /// Hand the decision to the sink matching its disposition. A failing
    /// sink is logged and otherwise ignored.
    pub async fn route(&self, decision: &AggregateDecision) {
        let (sink, name) = match decision.disposition() {
            Disposition::Resolved => (&self.output, "output"),
            Disposition::Escalated => (&self.escalation, "escalation"),
        };

        if let Err(e) = sink.deliver(decision).await {
            warn!(event_id = %decision.event_id(), sink = name, "Decision not delivered: {}", e);
        }
    }
}

/// Logs every decision it receives
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl DecisionSink for TracingSink {
    async fn deliver(&self, decision: &AggregateDecision) -> Result<(), SinkError> {
        match decision.disposition() {
            Disposition::Resolved => info!(
                event_id = %decision.event_id(),
                action = decision.chosen_action().unwrap_or_default(),
                confidence = decision.composite_confidence(),
                contributors = decision.contributions().len(),
                "Disruption resolved"
            ),
            Disposition::Escalated => warn!(
                event_id = %decision.event_id(),
                confidence = decision.composite_confidence(),
                diagnostics = decision.diagnostics().len(),
                failure = decision.failure().unwrap_or_default(),
                "Disruption escalated to operator"
            ),
        }
        Ok(())
    }
}

/// Forwards decisions into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<AggregateDecision>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<AggregateDecision>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving end, with room for `capacity` decisions
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AggregateDecision>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl DecisionSink for ChannelSink {
    async fn deliver(&self, decision: &AggregateDecision) -> Result<(), SinkError> {
        self.tx
            .send(decision.clone())
            .await
            .map_err(|_| SinkError::Closed(format!("receiver dropped before {}", decision.event_id())))
    }
}
