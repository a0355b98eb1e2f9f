//! # Model Transport
//!
//! The boundary between the orchestrator and specialist model endpoints.
//!
//! - [`ModelTransport`]: the one trait the dispatch engine calls
//! - [`HttpModelTransport`]: chat-completions client for local model servers
//! - [`TransportError`]: timeout vs. everything else, plus detail for logs
//! - [`RetryExecutor`]: deadline-bounded exponential backoff

pub mod core;
pub use crate::core::ModelTransport;

pub mod error;
pub use error::{Result, TransportError};

pub mod extract;
pub use extract::{extract_structured, strip_reasoning};

pub mod http;
pub use http::{completions_url, CapabilityTuning, HttpModelTransport, HttpModelTransportBuilder, HttpTransportConfig};

pub mod resilience;
pub use resilience::{RetryConfig, RetryExecutor};
