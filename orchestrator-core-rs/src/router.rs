//! Capability Router
//!
//! Maps a disruption category to the capability tags it needs, then to the
//! registered endpoints that carry any of them.

use std::collections::BTreeMap;

use endpoint_registry::EndpointRegistry;
use orchestration_types::{
    CapabilityTag, ConfigError, DisruptionCategory, DisruptionEvent, EndpointDescriptor,
    OrchestrationError, PolicyConfig, Result,
};
use tracing::debug;

/// Category to required-tag mapping
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingTable {
    entries: BTreeMap<DisruptionCategory, Vec<CapabilityTag>>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        use CapabilityTag::*;

        let mut entries = BTreeMap::new();
        entries.insert(DisruptionCategory::Traffic, vec![RouteOptimization, EmergencyResponse]);
        entries.insert(
            DisruptionCategory::MerchantFailure,
            vec![StrategicPlanning, CustomerCommunication],
        );
        entries.insert(
            DisruptionCategory::DeliveryMishap,
            vec![EmergencyResponse, CustomerCommunication, StrategicPlanning],
        );
        entries.insert(DisruptionCategory::CustomerComplaint, vec![CustomerCommunication]);

        Self { entries }
    }
}

impl RoutingTable {
    /// A table with no mappings: every category routes to every tag
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Default table with the policy's per-category overrides applied
    pub fn from_policy(policy: &PolicyConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::default().with_overrides(policy.routing_overrides()?))
    }

    /// Replace the entries for the given categories; duplicate tags collapse
    pub fn with_overrides(
        mut self,
        overrides: impl IntoIterator<Item = (DisruptionCategory, Vec<CapabilityTag>)>,
    ) -> Self {
        for (category, tags) in overrides {
            let mut ordered = Vec::with_capacity(tags.len());
            for tag in tags {
                if !ordered.contains(&tag) {
                    ordered.push(tag);
                }
            }
            if ordered.is_empty() {
                self.entries.remove(&category);
            } else {
                self.entries.insert(category, ordered);
            }
        }
        self
    }

    /// Ordered tags for `category`. `Other` and unmapped categories get the
    /// full capability set.
    pub fn required_tags(&self, category: DisruptionCategory) -> Vec<CapabilityTag> {
        match category {
            DisruptionCategory::Other => CapabilityTag::ALL.to_vec(),
            _ => self
                .entries
                .get(&category)
                .cloned()
                .unwrap_or_else(|| CapabilityTag::ALL.to_vec()),
        }
    }
}

/// A selected endpoint and the capability it is asked to exercise
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEndpoint {
    pub descriptor: EndpointDescriptor,
    pub capability: CapabilityTag,
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityRouter {
    table: RoutingTable,
}

impl CapabilityRouter {
    pub fn new(table: RoutingTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Select endpoints for `event`.
    ///
    /// Result is in registration order with no duplicates. An endpoint
    /// carrying several required tags is asked for the first one in the
    /// category's tag order. Fails only when no endpoint carries any
    /// required tag.
    pub async fn route(&self, event: &DisruptionEvent, registry: &EndpointRegistry) -> Result<Vec<RoutedEndpoint>> {
        let required = self.table.required_tags(event.category());

        let selected: Vec<RoutedEndpoint> = registry
            .snapshot()
            .await
            .into_iter()
            .filter_map(|descriptor| {
                required
                    .iter()
                    .copied()
                    .find(|tag| descriptor.has_capability(*tag))
                    .map(|capability| RoutedEndpoint { descriptor, capability })
            })
            .collect();

        if selected.is_empty() {
            return Err(OrchestrationError::unroutable(event.category()));
        }

        debug!(
            event_id = %event.id(),
            category = %event.category(),
            required = ?required,
            selected = selected.len(),
            "Event routed"
        );

        Ok(selected)
    }
}
