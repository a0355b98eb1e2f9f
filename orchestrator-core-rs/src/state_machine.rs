//! Orchestration State Machine
//!
//! `Received -> Classified -> Dispatched -> Aggregated -> Resolved | Escalated`.
//! A fatal error at any step jumps straight to Escalated. A machine handles
//! exactly one event and is consumed by [`OrchestrationStateMachine::run`],
//! so an event can neither be left half way nor be run twice.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use orchestration_types::{AggregateDecision, DisruptionEvent, OrchestrationError, PolicyConfig, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::aggregator::ResponseAggregator;
use crate::dispatch::DispatchEngine;
use crate::escalation::{escalate_fatal, EscalationGate};
use crate::router::CapabilityRouter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrchestrationState {
    Received,
    Classified,
    Dispatched,
    Aggregated,
    Resolved,
    Escalated,
}

impl OrchestrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrchestrationState::Resolved | OrchestrationState::Escalated)
    }

    /// Whether `next` is a legal single step from here
    pub fn can_advance_to(&self, next: OrchestrationState) -> bool {
        use OrchestrationState::*;

        match (*self, next) {
            (Received, Classified)
            | (Classified, Dispatched)
            | (Dispatched, Aggregated)
            | (Aggregated, Resolved) => true,
            (from, Escalated) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestrationState::Received => write!(f, "RECEIVED"),
            OrchestrationState::Classified => write!(f, "CLASSIFIED"),
            OrchestrationState::Dispatched => write!(f, "DISPATCHED"),
            OrchestrationState::Aggregated => write!(f, "AGGREGATED"),
            OrchestrationState::Resolved => write!(f, "RESOLVED"),
            OrchestrationState::Escalated => write!(f, "ESCALATED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: OrchestrationState,
    pub to: OrchestrationState,
    pub at: DateTime<Utc>,
}

/// The decision plus the path taken to reach it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationOutcome {
    pub decision: AggregateDecision,
    pub trail: Vec<StateTransition>,
}

impl OrchestrationOutcome {
    pub fn final_state(&self) -> OrchestrationState {
        self.trail
            .last()
            .map(|t| t.to)
            .unwrap_or(OrchestrationState::Received)
    }

    /// States visited, starting with Received
    pub fn path(&self) -> Vec<OrchestrationState> {
        let mut path = vec![OrchestrationState::Received];
        path.extend(self.trail.iter().map(|t| t.to));
        path
    }
}

pub struct OrchestrationStateMachine<'a> {
    event: DisruptionEvent,
    router: &'a CapabilityRouter,
    engine: &'a DispatchEngine,
    aggregator: &'a ResponseAggregator,
    gate: EscalationGate,
    per_request_timeout: Duration,
    state: OrchestrationState,
    trail: Vec<StateTransition>,
}

impl<'a> OrchestrationStateMachine<'a> {
    pub fn new(
        event: DisruptionEvent,
        router: &'a CapabilityRouter,
        engine: &'a DispatchEngine,
        aggregator: &'a ResponseAggregator,
        policy: &PolicyConfig,
    ) -> Self {
        Self {
            event,
            router,
            engine,
            aggregator,
            gate: EscalationGate::new(policy.policy_threshold),
            per_request_timeout: policy.per_request_timeout(),
            state: OrchestrationState::Received,
            trail: Vec::new(),
        }
    }

    pub fn state(&self) -> OrchestrationState {
        self.state
    }

    pub fn event(&self) -> &DisruptionEvent {
        &self.event
    }

    /// Drive the event to a terminal state
    pub async fn run(mut self) -> OrchestrationOutcome {
        let decision = match self.drive().await {
            Ok(decision) => decision,
            Err(err) => self.fail(err),
        };

        if decision.is_resolved() {
            counter!("orchestrator.events.resolved", 1);
        } else {
            counter!("orchestrator.events.escalated", 1);
        }

        info!(
            event_id = %self.event.id(),
            disposition = %decision.disposition(),
            action = decision.chosen_action().unwrap_or("none"),
            confidence = decision.composite_confidence(),
            "Event finished"
        );

        OrchestrationOutcome {
            decision,
            trail: self.trail,
        }
    }

    async fn drive(&mut self) -> Result<AggregateDecision> {
        let routed = self.router.route(&self.event, self.engine.registry()).await?;
        self.advance(OrchestrationState::Classified);

        let deadline = DispatchEngine::deadline_from(&self.event);
        let responses = self
            .engine
            .dispatch(&self.event, &routed, self.per_request_timeout, deadline)
            .await?;
        self.advance(OrchestrationState::Dispatched);

        let aggregation = self.aggregator.aggregate(&self.event, &responses);
        self.advance(OrchestrationState::Aggregated);

        let decision = self.gate.decide(aggregation);
        self.advance(if decision.is_resolved() {
            OrchestrationState::Resolved
        } else {
            OrchestrationState::Escalated
        });

        Ok(decision)
    }

    fn fail(&mut self, err: OrchestrationError) -> AggregateDecision {
        warn!(
            event_id = %self.event.id(),
            state = %self.state,
            code = err.code(),
            "Orchestration pass failed: {}",
            err
        );
        self.advance(OrchestrationState::Escalated);
        escalate_fatal(self.event.id(), &err, Vec::new())
    }

    fn advance(&mut self, to: OrchestrationState) {
        if !self.state.can_advance_to(to) {
            error!(event_id = %self.event.id(), from = %self.state, to = %to, "Illegal state transition ignored");
            return;
        }

        debug!(event_id = %self.event.id(), from = %self.state, to = %to, "State transition");
        self.trail.push(StateTransition {
            from: self.state,
            to,
            at: Utc::now(),
        });
        self.state = to;
    }
}
