//! Orchestrator facade
//!
//! Holds the long-lived pieces (registry, transport, aggregator, sinks) and
//! a policy snapshot. Each call to [`Orchestrator::handle`] takes the
//! current snapshot once and runs a fresh state machine with it, so a
//! policy reload never changes an event that is already in flight.

use std::sync::Arc;

use endpoint_registry::EndpointRegistry;
use model_transport::{HttpModelTransport, HttpTransportConfig, ModelTransport};
use orchestration_types::{DisruptionEvent, OrchestratorConfig, PolicyConfig, Urgency};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::aggregator::{ActionNormalizer, ResponseAggregator};
use crate::classify::event_from_text;
use crate::dispatch::DispatchEngine;
use crate::error::SetupError;
use crate::router::{CapabilityRouter, RoutingTable};
use crate::sinks::DecisionSinks;
use crate::state_machine::{OrchestrationOutcome, OrchestrationStateMachine};

/// Validated policy plus the router derived from it
#[derive(Debug)]
struct PolicySnapshot {
    policy: Arc<PolicyConfig>,
    router: CapabilityRouter,
}

impl PolicySnapshot {
    fn build(policy: PolicyConfig) -> Result<Self, SetupError> {
        policy.validate()?;
        let router = CapabilityRouter::new(RoutingTable::from_policy(&policy)?);
        Ok(Self {
            policy: Arc::new(policy),
            router,
        })
    }
}

pub struct Orchestrator {
    engine: DispatchEngine,
    aggregator: ResponseAggregator,
    snapshot: RwLock<Arc<PolicySnapshot>>,
    sinks: Option<DecisionSinks>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        transport: Arc<dyn ModelTransport>,
        policy: PolicyConfig,
    ) -> Result<Self, SetupError> {
        let snapshot = PolicySnapshot::build(policy)?;

        Ok(Self {
            engine: DispatchEngine::new(transport, registry),
            aggregator: ResponseAggregator::default(),
            snapshot: RwLock::new(Arc::new(snapshot)),
            sinks: None,
        })
    }

    /// Registry from the configured endpoints, policy from the config file
    pub fn from_config(config: &OrchestratorConfig, transport: Arc<dyn ModelTransport>) -> Result<Self, SetupError> {
        config.validate()?;
        let registry = EndpointRegistry::from_config(&config.endpoints, config.policy.failure_threshold)?;
        Self::new(Arc::new(registry), transport, config.policy.clone())
    }

    /// [`Self::from_config`] with the default HTTP transport
    pub fn from_config_with_http(config: &OrchestratorConfig) -> Result<Self, SetupError> {
        let transport = HttpModelTransport::new(HttpTransportConfig::default())?;
        Self::from_config(config, Arc::new(transport))
    }

    pub fn with_normalizer(mut self, normalizer: impl ActionNormalizer + 'static) -> Self {
        self.aggregator = ResponseAggregator::new(normalizer);
        self
    }

    pub fn with_sinks(mut self, sinks: DecisionSinks) -> Self {
        self.sinks = Some(sinks);
        self
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        self.engine.registry()
    }

    pub async fn policy(&self) -> Arc<PolicyConfig> {
        Arc::clone(&self.snapshot.read().await.policy)
    }

    /// Swap in a new policy for events handled from now on.
    ///
    /// `failure_threshold` is owned by the registry and does not change on
    /// reload.
    pub async fn reload_policy(&self, policy: PolicyConfig) -> Result<(), SetupError> {
        let fresh = PolicySnapshot::build(policy)?;

        let registry_threshold = self.registry().failure_threshold();
        if fresh.policy.failure_threshold != registry_threshold {
            warn!(
                requested = fresh.policy.failure_threshold,
                active = registry_threshold,
                "failure_threshold changes need a restart; keeping the active value"
            );
        }

        *self.snapshot.write().await = Arc::new(fresh);
        info!("Policy reloaded");
        Ok(())
    }

    /// Event for a free-text report, deadline from the policy's event budget
    pub async fn intake_text(&self, description: &str, urgency: Urgency) -> DisruptionEvent {
        let budget = self.policy().await.event_budget();
        event_from_text(description, urgency, budget)
    }

    /// Run one event to its terminal decision and hand it to the sinks
    pub async fn handle(&self, event: DisruptionEvent) -> OrchestrationOutcome {
        let snapshot = Arc::clone(&*self.snapshot.read().await);

        let machine = OrchestrationStateMachine::new(
            event,
            &snapshot.router,
            &self.engine,
            &self.aggregator,
            &snapshot.policy,
        );
        let outcome = machine.run().await;

        if let Some(sinks) = &self.sinks {
            sinks.route(&outcome.decision).await;
        }

        outcome
    }
}
