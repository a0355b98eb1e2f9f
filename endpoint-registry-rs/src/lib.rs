//! Endpoint Registry
//!
//! Pure bookkeeping for specialist endpoints: who is registered, which
//! capabilities they declare, and what health the dispatch engine last
//! observed. No network I/O happens here.

mod health;

pub use health::{HealthTracker, HealthTransition, OutcomeKind};

use std::path::Path;

use orchestration_types::{CapabilityTag, ConfigError, EndpointConfig, EndpointDescriptor, HealthState};
use serde::Deserialize;
use tokio::sync::RwLock;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("invalid endpoint descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("failed to read endpoint file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Endpoint file structure (`[[endpoint]]` tables)
#[derive(Debug, Deserialize)]
struct EndpointFile {
    #[serde(default)]
    endpoint: Vec<EndpointConfig>,
}

/// Internal entry with runtime health
#[derive(Debug, Clone)]
struct EndpointEntry {
    descriptor: EndpointDescriptor,
    health: HealthTracker,
}

#[derive(Debug)]
pub struct EndpointRegistry {
    /// Registration order is the vector order
    entries: RwLock<Vec<EndpointEntry>>,
    failure_threshold: u32,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new(3)
    }
}

impl EndpointRegistry {
    /// `failure_threshold` is the consecutive-failure count that turns a
    /// Degraded endpoint Unreachable
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Build a registry from validated endpoint configuration
    pub fn from_config(endpoints: &[EndpointConfig], failure_threshold: u32) -> Result<Self> {
        let mut entries: Vec<EndpointEntry> = Vec::with_capacity(endpoints.len());
        for config in endpoints {
            config.validate()?;
            let descriptor = config.to_descriptor();
            match entries.iter_mut().find(|e| e.descriptor.id() == descriptor.id()) {
                Some(existing) => existing.descriptor = descriptor,
                None => entries.push(EndpointEntry {
                    descriptor,
                    health: HealthTracker::default(),
                }),
            }
        }

        tracing::info!("Loaded {} endpoints from config", entries.len());

        Ok(Self {
            entries: RwLock::new(entries),
            failure_threshold: failure_threshold.max(1),
        })
    }

    /// Load `[[endpoint]]` tables from a TOML file
    pub async fn load_from_file(path: impl AsRef<Path>, failure_threshold: u32) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let file: EndpointFile =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::from_config(&file.endpoint, failure_threshold)
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Add or replace an endpoint by id.
    ///
    /// A replaced endpoint keeps its registration slot and its observed
    /// health; only the static description changes.
    pub async fn register(&self, descriptor: EndpointDescriptor) -> Result<()> {
        validate_descriptor(&descriptor)?;

        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.descriptor.id() == descriptor.id()) {
            Some(existing) => {
                tracing::info!(endpoint = %descriptor.id(), "Endpoint descriptor replaced");
                existing.descriptor = descriptor;
            }
            None => {
                tracing::info!(
                    endpoint = %descriptor.id(),
                    address = %descriptor.address(),
                    capabilities = ?descriptor.capabilities(),
                    weight = descriptor.weight(),
                    "Endpoint registered"
                );
                entries.push(EndpointEntry {
                    descriptor,
                    health: HealthTracker::default(),
                });
            }
        }
        Ok(())
    }

    /// All endpoints carrying `tag`, in registration order
    pub async fn list_by_capability(&self, tag: CapabilityTag) -> Vec<EndpointDescriptor> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.descriptor.has_capability(tag))
            .map(|(ordinal, e)| publish(ordinal, e))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<EndpointDescriptor> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.descriptor.id() == id)
            .map(|(ordinal, e)| publish(ordinal, e))
    }

    /// Read-only copy of every endpoint, registration order
    pub async fn snapshot(&self) -> Vec<EndpointDescriptor> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .enumerate()
            .map(|(ordinal, e)| publish(ordinal, e))
            .collect()
    }

    pub async fn health(&self, id: &str) -> Option<HealthState> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|e| e.descriptor.id() == id)
            .map(|e| e.health.state())
    }

    /// Capability tags covered by at least one endpoint, in tag order
    pub async fn capabilities(&self) -> Vec<CapabilityTag> {
        let entries = self.entries.read().await;
        CapabilityTag::ALL
            .into_iter()
            .filter(|tag| entries.iter().any(|e| e.descriptor.has_capability(*tag)))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Apply one observed outcome to an endpoint's health
    pub async fn report_outcome(&self, id: &str, outcome: OutcomeKind) -> Result<HealthTransition> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.descriptor.id() == id)
            .ok_or_else(|| RegistryError::UnknownEndpoint(id.to_string()))?;

        let transition = entry.health.observe(outcome, self.failure_threshold);
        if transition.changed() {
            tracing::warn!(
                endpoint = %id,
                from = %transition.from,
                to = %transition.to,
                consecutive_failures = entry.health.consecutive_failures(),
                "Endpoint health changed"
            );
        } else {
            tracing::debug!(endpoint = %id, outcome = ?outcome, state = %transition.to, "Outcome recorded");
        }

        Ok(transition)
    }
}

fn publish(ordinal: usize, entry: &EndpointEntry) -> EndpointDescriptor {
    entry.descriptor.clone().stamped(ordinal, entry.health.state())
}

fn validate_descriptor(descriptor: &EndpointDescriptor) -> Result<()> {
    if descriptor.id().trim().is_empty() {
        return Err(RegistryError::InvalidDescriptor("empty id".to_string()));
    }
    if descriptor.capabilities().is_empty() {
        return Err(RegistryError::InvalidDescriptor(format!(
            "endpoint {} declares no capabilities",
            descriptor.id()
        )));
    }
    let weight = descriptor.weight();
    if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
        return Err(RegistryError::InvalidDescriptor(format!(
            "endpoint {} weight {} outside [0, 1]",
            descriptor.id(),
            weight
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, tags: &[CapabilityTag], weight: f64) -> EndpointDescriptor {
        EndpointDescriptor::new(id, format!("http://{}.local", id), tags.iter().copied(), weight)
    }

    #[tokio::test]
    async fn test_list_by_capability_keeps_registration_order() {
        let registry = EndpointRegistry::new(3);
        registry
            .register(descriptor("b", &[CapabilityTag::EmergencyResponse], 0.5))
            .await
            .unwrap();
        registry
            .register(descriptor("a", &[CapabilityTag::RouteOptimization, CapabilityTag::EmergencyResponse], 0.5))
            .await
            .unwrap();

        let ids: Vec<_> = registry
            .list_by_capability(CapabilityTag::EmergencyResponse)
            .await
            .iter()
            .map(|d| d.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);

        let listed = registry.list_by_capability(CapabilityTag::RouteOptimization).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].ordinal(), 1);
        assert!(registry.list_by_capability(CapabilityTag::StrategicPlanning).await.is_empty());
    }

    #[tokio::test]
    async fn test_register_is_idempotent_and_keeps_slot_and_health() {
        let registry = EndpointRegistry::new(3);
        registry.register(descriptor("a", &[CapabilityTag::RouteOptimization], 0.5)).await.unwrap();
        registry.register(descriptor("b", &[CapabilityTag::RouteOptimization], 0.5)).await.unwrap();
        registry.report_outcome("a", OutcomeKind::Timeout).await.unwrap();

        registry.register(descriptor("a", &[CapabilityTag::RouteOptimization], 0.9)).await.unwrap();
        registry.register(descriptor("a", &[CapabilityTag::RouteOptimization], 0.9)).await.unwrap();

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id(), "a");
        assert_eq!(snapshot[0].weight(), 0.9);
        assert_eq!(snapshot[0].health(), HealthState::Degraded);
    }

    #[tokio::test]
    async fn test_rejects_invalid_descriptors() {
        let registry = EndpointRegistry::new(3);
        let err = registry
            .register(descriptor("a", &[CapabilityTag::RouteOptimization], 1.2))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDescriptor(_)));

        let err = registry.register(descriptor("a", &[], 0.5)).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDescriptor(_)));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_report_outcome_unknown_endpoint() {
        let registry = EndpointRegistry::new(3);
        let err = registry.report_outcome("ghost", OutcomeKind::Success).await.unwrap_err();
        assert!(matches!(err, RegistryError::UnknownEndpoint(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_capabilities_cover_registered_tags() {
        let registry = EndpointRegistry::new(3);
        registry
            .register(descriptor("a", &[CapabilityTag::StrategicPlanning, CapabilityTag::RouteOptimization], 0.5))
            .await
            .unwrap();
        assert_eq!(
            registry.capabilities().await,
            vec![CapabilityTag::RouteOptimization, CapabilityTag::StrategicPlanning]
        );
    }
}
