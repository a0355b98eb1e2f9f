//! Orchestrator core
//!
//! Takes one disruption event through routing, parallel dispatch to
//! specialist endpoints, aggregation of their proposals and the escalation
//! gate, and always ends with exactly one [`AggregateDecision`].
//!
//! [`AggregateDecision`]: orchestration_types::AggregateDecision

pub mod aggregator;
pub mod classify;
pub mod dispatch;
pub mod error;
pub mod escalation;
pub mod logging;
pub mod orchestrator;
pub mod router;
pub mod sinks;
pub mod state_machine;

pub use aggregator::{ActionNormalizer, ResponseAggregator, WhitespaceCaseNormalizer};
pub use classify::{event_from_text, infer_category};
pub use dispatch::DispatchEngine;
pub use error::{SetupError, SinkError};
pub use escalation::{decide, escalate_fatal, EscalationGate};
pub use logging::init_logging;
pub use orchestrator::Orchestrator;
pub use router::{CapabilityRouter, RoutedEndpoint, RoutingTable};
pub use sinks::{ChannelSink, DecisionSink, DecisionSinks, TracingSink};
pub use state_machine::{
    OrchestrationOutcome, OrchestrationState, OrchestrationStateMachine, StateTransition,
};
