//! Dispatch Engine
//!
//! One future per selected endpoint, all polled together and joined in the
//! order they were passed. Each call is cut off at the earlier of its
//! per-request timeout and the event deadline; the future that owns a call
//! is the only writer of that endpoint's health.

use std::sync::Arc;
use std::time::Duration;

use endpoint_registry::{EndpointRegistry, OutcomeKind};
use futures::future::join_all;
use metrics::{counter, histogram};
use model_transport::{ModelTransport, TransportError};
use orchestration_types::{
    DisruptionEvent, FailureKind, OrchestrationError, Result, SpecialistProposal, SpecialistRequest,
    SpecialistResponse,
};
use tokio::time::Instant;
use tracing::{debug, info_span, warn, Instrument};

use crate::router::RoutedEndpoint;

pub struct DispatchEngine {
    transport: Arc<dyn ModelTransport>,
    registry: Arc<EndpointRegistry>,
}

impl DispatchEngine {
    pub fn new(transport: Arc<dyn ModelTransport>, registry: Arc<EndpointRegistry>) -> Self {
        Self { transport, registry }
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    /// Monotonic instant matching the event's wall-clock deadline
    pub fn deadline_from(event: &DisruptionEvent) -> Instant {
        Instant::now() + event.remaining()
    }

    /// Call every endpoint concurrently and return one response per
    /// endpoint, in input order. Endpoint failures become failure responses;
    /// only an empty endpoint list is an error.
    pub async fn dispatch(
        &self,
        event: &DisruptionEvent,
        endpoints: &[RoutedEndpoint],
        per_request_timeout: Duration,
        overall_deadline: Instant,
    ) -> Result<Vec<SpecialistResponse>> {
        if endpoints.is_empty() {
            return Err(OrchestrationError::invalid_dispatch(format!(
                "no endpoints selected for event {}",
                event.id()
            )));
        }

        debug!(
            event_id = %event.id(),
            endpoints = endpoints.len(),
            per_request_timeout_ms = per_request_timeout.as_millis() as u64,
            "Dispatching to specialists"
        );

        let calls = endpoints.iter().map(|routed| {
            let span = info_span!(
                "specialist_call",
                event_id = %event.id(),
                endpoint = %routed.descriptor.id(),
                capability = %routed.capability
            );
            self.call(event, routed, per_request_timeout, overall_deadline)
                .instrument(span)
        });

        Ok(join_all(calls).await)
    }

    async fn call(
        &self,
        event: &DisruptionEvent,
        routed: &RoutedEndpoint,
        per_request_timeout: Duration,
        overall_deadline: Instant,
    ) -> SpecialistResponse {
        let endpoint = &routed.descriptor;
        let started = Instant::now();
        let budget = per_request_timeout.min(overall_deadline.saturating_duration_since(started));

        // Nothing was sent, so there is no outcome to hold against the endpoint
        if budget.is_zero() {
            debug!(endpoint = %endpoint.id(), "Event deadline already passed, call skipped");
            return SpecialistResponse::failure(
                endpoint,
                routed.capability,
                Duration::ZERO,
                FailureKind::Timeout,
                "event deadline already passed",
            );
        }

        let request = SpecialistRequest::new(event, routed.capability, endpoint.model());
        let invoke = self
            .transport
            .invoke(endpoint.address(), routed.capability, &request, budget);
        let result = match tokio::time::timeout(budget, invoke).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(format!("no reply within {:?}", budget))),
        };
        let latency = started.elapsed();

        let response = match result {
            Ok(value) => match SpecialistProposal::from_value(&value) {
                Ok(proposal) => SpecialistResponse::success(endpoint, routed.capability, latency, proposal),
                Err(reason) => SpecialistResponse::failure(
                    endpoint,
                    routed.capability,
                    latency,
                    FailureKind::MalformedOutput,
                    reason,
                ),
            },
            Err(err) => {
                let kind = if err.is_timeout() {
                    FailureKind::Timeout
                } else {
                    FailureKind::Unreachable
                };
                SpecialistResponse::failure(endpoint, routed.capability, latency, kind, err.to_string())
            }
        };

        self.record(&response).await;
        response
    }

    async fn record(&self, response: &SpecialistResponse) {
        histogram!(
            "dispatch.latency_ms",
            response.latency.as_secs_f64() * 1000.0,
            "capability" => response.capability.as_str()
        );

        let outcome = match response.failure_kind() {
            None => OutcomeKind::Success,
            Some(kind) => {
                counter!("dispatch.failures", 1, "kind" => kind.as_str());
                warn!(
                    latency_ms = response.latency.as_millis() as u64,
                    kind = %kind,
                    "Specialist call failed"
                );
                OutcomeKind::from_failure(kind)
            }
        };

        if let Err(e) = self.registry.report_outcome(&response.endpoint_id, outcome).await {
            warn!("Could not record outcome for {}: {}", response.endpoint_id, e);
        }
    }
}
