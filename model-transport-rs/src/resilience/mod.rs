//! Resilience patterns for transport calls
//!
//! Only retry lives here. Endpoint health is tracked by the registry from
//! the outcomes the dispatch engine reports, so there is no circuit breaker
//! at this layer.

mod retry;

pub use retry::{RetryConfig, RetryExecutor};
