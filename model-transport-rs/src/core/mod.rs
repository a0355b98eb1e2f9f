//! The transport seam
//!
//! The orchestrator core talks to specialists only through
//! [`ModelTransport`]. Swapping HTTP for an in-process fake in tests, or for
//! another wire protocol, touches nothing above this trait.

use std::time::Duration;

use async_trait::async_trait;
use orchestration_types::{CapabilityTag, SpecialistRequest};

use crate::error::Result;

#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Send `request` to the endpoint at `address` and return its raw
    /// structured reply.
    ///
    /// Implementations must give up within `timeout` and report that as
    /// [`TransportError::Timeout`](crate::TransportError::Timeout). A reply
    /// that arrived but is not the expected shape is returned as-is; judging
    /// it is the caller's job.
    async fn invoke(
        &self,
        address: &str,
        capability: CapabilityTag,
        request: &SpecialistRequest,
        timeout: Duration,
    ) -> Result<serde_json::Value>;

    /// Transport name used in logs
    fn name(&self) -> &str {
        "transport"
    }
}
