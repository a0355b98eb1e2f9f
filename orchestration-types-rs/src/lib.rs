//! Shared types for the disruption orchestrator.
//!
//! Every other crate in the workspace speaks in terms of the types defined
//! here: the immutable [`DisruptionEvent`] intake record, the
//! [`EndpointDescriptor`] bookkeeping entry, the per-endpoint
//! [`SpecialistResponse`] and the terminal [`AggregateDecision`].

pub mod config;
pub mod error;
pub mod model;

pub use config::{
    ConfigError, EndpointConfig, LoggingConfig, OrchestratorConfig, PolicyConfig,
};
pub use error::{OrchestrationError, Result};
pub use model::{
    AggregateDecision, Aggregation, CandidateAction, CapabilityTag, DisruptionCategory,
    DisruptionEvent, DisruptionEventBuilder, Disposition, EndpointDescriptor, FailureKind,
    HealthState, ResponseOutcome, SpecialistProposal, SpecialistRequest, SpecialistResponse,
    Urgency,
};
