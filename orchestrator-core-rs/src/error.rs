//! Errors raised while wiring the orchestrator together or delivering its
//! decisions. Pipeline errors live in `orchestration_types::OrchestrationError`.

use endpoint_registry::RegistryError;
use model_transport::TransportError;
use orchestration_types::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to build model transport: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// A decision sink could not take a decision
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("sink closed: {0}")]
    Closed(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}
