// orchestration-types-rs/src/model.rs
// Data model shared by the registry, the transport boundary and the core

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OrchestrationError;

/// Default time budget between arrival and deadline when intake sets none
pub const DEFAULT_EVENT_BUDGET: Duration = Duration::from_secs(30);

/// Operational class of a disruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisruptionCategory {
    Traffic,
    MerchantFailure,
    DeliveryMishap,
    CustomerComplaint,
    /// Anything intake could not place; routed to every capability
    #[serde(other)]
    Other,
}

impl DisruptionCategory {
    pub const ALL: [DisruptionCategory; 5] = [
        DisruptionCategory::Traffic,
        DisruptionCategory::MerchantFailure,
        DisruptionCategory::DeliveryMishap,
        DisruptionCategory::CustomerComplaint,
        DisruptionCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisruptionCategory::Traffic => "traffic",
            DisruptionCategory::MerchantFailure => "merchant-failure",
            DisruptionCategory::DeliveryMishap => "delivery-mishap",
            DisruptionCategory::CustomerComplaint => "customer-complaint",
            DisruptionCategory::Other => "other",
        }
    }
}

impl fmt::Display for DisruptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised names parse as [`DisruptionCategory::Other`]
impl FromStr for DisruptionCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Ok(DisruptionCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .unwrap_or(DisruptionCategory::Other))
    }
}

/// Priority reported by intake, forwarded to specialists as metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Low => write!(f, "low"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::High => write!(f, "high"),
            Urgency::Critical => write!(f, "critical"),
        }
    }
}

/// Specialisation declared by a model endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityTag {
    RouteOptimization,
    CustomerCommunication,
    StrategicPlanning,
    EmergencyResponse,
}

impl CapabilityTag {
    pub const ALL: [CapabilityTag; 4] = [
        CapabilityTag::RouteOptimization,
        CapabilityTag::CustomerCommunication,
        CapabilityTag::StrategicPlanning,
        CapabilityTag::EmergencyResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityTag::RouteOptimization => "route-optimization",
            CapabilityTag::CustomerCommunication => "customer-communication",
            CapabilityTag::StrategicPlanning => "strategic-planning",
            CapabilityTag::EmergencyResponse => "emergency-response",
        }
    }
}

impl fmt::Display for CapabilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        CapabilityTag::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown capability tag: {}", s))
    }
}

/// Immutable intake record for one disruption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisruptionEvent {
    id: String,
    category: DisruptionCategory,
    #[serde(default)]
    urgency: Urgency,
    #[serde(default)]
    description: String,
    #[serde(default)]
    context: serde_json::Value,
    arrived_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
}

impl DisruptionEvent {
    pub fn builder() -> DisruptionEventBuilder {
        DisruptionEventBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> DisruptionCategory {
        self.category
    }

    pub fn urgency(&self) -> Urgency {
        self.urgency
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn context(&self) -> &serde_json::Value {
        &self.context
    }

    pub fn arrived_at(&self) -> DateTime<Utc> {
        self.arrived_at
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Time left until the deadline as seen from `now`, zero once it has passed
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.deadline - now).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn remaining(&self) -> Duration {
        self.remaining_at(Utc::now())
    }
}

/// Builder for [`DisruptionEvent`]
#[derive(Debug, Default, Clone)]
pub struct DisruptionEventBuilder {
    id: Option<String>,
    category: Option<DisruptionCategory>,
    urgency: Urgency,
    description: String,
    context: serde_json::Value,
    arrived_at: Option<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
    budget: Option<Duration>,
}

impl DisruptionEventBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn category(mut self, category: DisruptionCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn arrived_at(mut self, arrived_at: DateTime<Utc>) -> Self {
        self.arrived_at = Some(arrived_at);
        self
    }

    /// Absolute deadline; takes precedence over [`Self::budget`]
    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to arrival
    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn build(self) -> DisruptionEvent {
        let arrived_at = self.arrived_at.unwrap_or_else(Utc::now);
        let deadline = self.deadline.unwrap_or_else(|| {
            let budget = self.budget.unwrap_or(DEFAULT_EVENT_BUDGET);
            let budget = chrono::Duration::from_std(budget)
                .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_EVENT_BUDGET.as_secs() as i64));
            arrived_at + budget
        });

        DisruptionEvent {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            category: self.category.unwrap_or(DisruptionCategory::Other),
            urgency: self.urgency,
            description: self.description,
            context: self.context,
            arrived_at,
            deadline,
        }
    }
}

/// Availability of an endpoint as observed by the dispatch engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    #[default]
    Healthy,
    Degraded,
    Unreachable,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "HEALTHY"),
            HealthState::Degraded => write!(f, "DEGRADED"),
            HealthState::Unreachable => write!(f, "UNREACHABLE"),
        }
    }
}

/// A specialist model endpoint as known to the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    id: String,
    address: String,
    #[serde(default)]
    model: Option<String>,
    capabilities: Vec<CapabilityTag>,
    weight: f64,
    #[serde(default)]
    health: HealthState,
    #[serde(default)]
    ordinal: usize,
}

impl EndpointDescriptor {
    /// Capabilities are de-duplicated, keeping first-declared order
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
        capabilities: impl IntoIterator<Item = CapabilityTag>,
        weight: f64,
    ) -> Self {
        let mut tags = Vec::new();
        for tag in capabilities {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Self {
            id: id.into(),
            address: address.into(),
            model: None,
            capabilities: tags,
            weight,
            health: HealthState::Healthy,
            ordinal: 0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Stamp registry-owned state onto a published copy
    pub fn stamped(mut self, ordinal: usize, health: HealthState) -> Self {
        self.ordinal = ordinal;
        self.health = health;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn capabilities(&self) -> &[CapabilityTag] {
        &self.capabilities
    }

    pub fn has_capability(&self, tag: CapabilityTag) -> bool {
        self.capabilities.contains(&tag)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn health(&self) -> HealthState {
        self.health
    }

    /// Registration position; lower registered earlier
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Unit of dispatch: one event viewed through one capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistRequest {
    pub event_id: String,
    pub capability: CapabilityTag,
    pub category: DisruptionCategory,
    pub urgency: Urgency,
    pub description: String,
    pub context: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub deadline: DateTime<Utc>,
}

impl SpecialistRequest {
    pub fn new(event: &DisruptionEvent, capability: CapabilityTag, model: Option<&str>) -> Self {
        Self {
            event_id: event.id().to_string(),
            capability,
            category: event.category(),
            urgency: event.urgency(),
            description: event.description().to_string(),
            context: event.context().clone(),
            model: model.map(str::to_string),
            deadline: event.deadline(),
        }
    }
}

/// Successful payload returned by a specialist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistProposal {
    pub action: String,
    #[serde(default)]
    pub rationale: String,
    pub confidence: f64,
}

impl SpecialistProposal {
    /// Parse a structured reply into a proposal.
    ///
    /// Accepts `action` (or `proposed_action`), optional `rationale`, and a
    /// `confidence` given as a number or a numeric string. The action must be
    /// non-blank and the confidence finite and within `[0, 1]`.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, got {}", json_kind(value)))?;

        let action = obj
            .get("action")
            .or_else(|| obj.get("proposed_action"))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| "missing or blank 'action'".to_string())?;

        let rationale = obj
            .get("rationale")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let confidence = match obj.get("confidence") {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| "missing or non-numeric 'confidence'".to_string())?;

        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(format!("confidence {} outside [0, 1]", confidence));
        }

        Ok(Self {
            action: action.to_string(),
            rationale: rationale.to_string(),
            confidence,
        })
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Why a specialist produced no usable payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Timeout,
    Unreachable,
    MalformedOutput,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Unreachable => "unreachable",
            FailureKind::MalformedOutput => "malformed-output",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either a payload or a failure tag, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResponseOutcome {
    Success(SpecialistProposal),
    Failure { kind: FailureKind, detail: String },
}

/// What one selected endpoint contributed to a dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistResponse {
    pub endpoint_id: String,
    pub capability: CapabilityTag,
    /// Static weight of the endpoint at dispatch time
    pub weight: f64,
    /// Registration position of the endpoint at dispatch time
    pub ordinal: usize,
    pub latency: Duration,
    pub outcome: ResponseOutcome,
}

impl SpecialistResponse {
    pub fn success(endpoint: &EndpointDescriptor, capability: CapabilityTag, latency: Duration, proposal: SpecialistProposal) -> Self {
        Self {
            endpoint_id: endpoint.id().to_string(),
            capability,
            weight: endpoint.weight(),
            ordinal: endpoint.ordinal(),
            latency,
            outcome: ResponseOutcome::Success(proposal),
        }
    }

    pub fn failure(
        endpoint: &EndpointDescriptor,
        capability: CapabilityTag,
        latency: Duration,
        kind: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_id: endpoint.id().to_string(),
            capability,
            weight: endpoint.weight(),
            ordinal: endpoint.ordinal(),
            latency,
            outcome: ResponseOutcome::Failure {
                kind,
                detail: detail.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ResponseOutcome::Success(_))
    }

    pub fn proposal(&self) -> Option<&SpecialistProposal> {
        match &self.outcome {
            ResponseOutcome::Success(p) => Some(p),
            ResponseOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            ResponseOutcome::Success(_) => None,
            ResponseOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// One distinct proposed action and its composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAction {
    /// Display text, taken from the earliest-registered supporter
    pub action: String,
    /// Normalised comparison key
    pub key: String,
    pub score: f64,
    /// Supporting endpoint ids in registration order
    pub supporters: Vec<String>,
    pub best_latency: Duration,
    pub first_ordinal: usize,
}

/// Ranked merge of one dispatch, before the escalation gate has run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    event_id: String,
    candidates: Vec<CandidateAction>,
    composite_confidence: f64,
    contributions: Vec<SpecialistResponse>,
    responses: Vec<SpecialistResponse>,
}

impl Aggregation {
    /// `candidates` must already be ranked best-first
    pub fn new(
        event_id: impl Into<String>,
        candidates: Vec<CandidateAction>,
        contributions: Vec<SpecialistResponse>,
        responses: Vec<SpecialistResponse>,
    ) -> Self {
        let composite_confidence = candidates.first().map(|c| c.score).unwrap_or(0.0);
        Self {
            event_id: event_id.into(),
            candidates,
            composite_confidence,
            contributions,
            responses,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn candidates(&self) -> &[CandidateAction] {
        &self.candidates
    }

    pub fn chosen_action(&self) -> Option<&str> {
        self.candidates.first().map(|c| c.action.as_str())
    }

    pub fn composite_confidence(&self) -> f64 {
        self.composite_confidence
    }

    /// Successful responses, registration order
    pub fn contributions(&self) -> &[SpecialistResponse] {
        &self.contributions
    }

    /// Every response including failures, registration order
    pub fn responses(&self) -> &[SpecialistResponse] {
        &self.responses
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.contributions.len()
    }
}

/// Terminal disposition of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Resolved,
    Escalated,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Resolved => write!(f, "RESOLVED"),
            Disposition::Escalated => write!(f, "ESCALATED"),
        }
    }
}

/// The single terminal outcome of one disruption event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateDecision {
    event_id: String,
    chosen_action: Option<String>,
    composite_confidence: f64,
    candidates: Vec<CandidateAction>,
    contributions: Vec<SpecialistResponse>,
    diagnostics: Vec<SpecialistResponse>,
    disposition: Disposition,
    failure: Option<String>,
}

impl AggregateDecision {
    pub fn resolved(aggregation: Aggregation) -> Self {
        Self {
            event_id: aggregation.event_id,
            chosen_action: aggregation.candidates.first().map(|c| c.action.clone()),
            composite_confidence: aggregation.composite_confidence,
            candidates: aggregation.candidates,
            contributions: aggregation.contributions,
            diagnostics: Vec::new(),
            disposition: Disposition::Resolved,
            failure: None,
        }
    }

    /// Escalation keeps the full response list for human review
    pub fn escalated(aggregation: Aggregation) -> Self {
        Self {
            event_id: aggregation.event_id,
            chosen_action: aggregation.candidates.first().map(|c| c.action.clone()),
            composite_confidence: aggregation.composite_confidence,
            candidates: aggregation.candidates,
            contributions: aggregation.contributions,
            diagnostics: aggregation.responses,
            disposition: Disposition::Escalated,
            failure: None,
        }
    }

    /// Escalation caused by a fatal pipeline error
    pub fn fatal(
        event_id: impl Into<String>,
        error: &OrchestrationError,
        responses: Vec<SpecialistResponse>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            chosen_action: None,
            composite_confidence: 0.0,
            candidates: Vec::new(),
            contributions: Vec::new(),
            diagnostics: responses,
            disposition: Disposition::Escalated,
            failure: Some(format!("{}: {}", error.code(), error)),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn chosen_action(&self) -> Option<&str> {
        self.chosen_action.as_deref()
    }

    pub fn composite_confidence(&self) -> f64 {
        self.composite_confidence
    }

    pub fn candidates(&self) -> &[CandidateAction] {
        &self.candidates
    }

    pub fn contributions(&self) -> &[SpecialistResponse] {
        &self.contributions
    }

    pub fn diagnostics(&self) -> &[SpecialistResponse] {
        &self.diagnostics
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.disposition == Disposition::Resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_parsing_falls_back_to_other() {
        assert_eq!("traffic".parse::<DisruptionCategory>().unwrap(), DisruptionCategory::Traffic);
        assert_eq!(
            "merchant_failure".parse::<DisruptionCategory>().unwrap(),
            DisruptionCategory::MerchantFailure
        );
        assert_eq!("volcano".parse::<DisruptionCategory>().unwrap(), DisruptionCategory::Other);

        let parsed: DisruptionCategory = serde_json::from_value(json!("weather")).unwrap();
        assert_eq!(parsed, DisruptionCategory::Other);
        let parsed: DisruptionCategory = serde_json::from_value(json!("customer-complaint")).unwrap();
        assert_eq!(parsed, DisruptionCategory::CustomerComplaint);
    }

    #[test]
    fn test_capability_tag_round_trip_names() {
        for tag in CapabilityTag::ALL {
            assert_eq!(tag.as_str().parse::<CapabilityTag>().unwrap(), tag);
        }
        assert!("teleportation".parse::<CapabilityTag>().is_err());
    }

    #[test]
    fn test_builder_defaults_deadline_from_budget() {
        let arrived = Utc::now();
        let event = DisruptionEvent::builder()
            .category(DisruptionCategory::Traffic)
            .arrived_at(arrived)
            .budget(Duration::from_secs(5))
            .build();

        assert_eq!(event.deadline() - arrived, chrono::Duration::seconds(5));
        assert!(!event.id().is_empty());
        assert_eq!(event.urgency(), Urgency::Medium);
        assert_eq!(event.remaining_at(arrived + chrono::Duration::seconds(10)), Duration::ZERO);
    }

    #[test]
    fn test_descriptor_deduplicates_capabilities() {
        let d = EndpointDescriptor::new(
            "ep",
            "http://localhost:1234",
            [
                CapabilityTag::RouteOptimization,
                CapabilityTag::EmergencyResponse,
                CapabilityTag::RouteOptimization,
            ],
            0.5,
        );
        assert_eq!(
            d.capabilities(),
            &[CapabilityTag::RouteOptimization, CapabilityTag::EmergencyResponse]
        );
        assert_eq!(d.health(), HealthState::Healthy);
    }

    #[test]
    fn test_proposal_parsing() {
        let p = SpecialistProposal::from_value(&json!({
            "action": "  reroute via Highway 17 ",
            "rationale": "congestion on 101",
            "confidence": 0.9
        }))
        .unwrap();
        assert_eq!(p.action, "reroute via Highway 17");
        assert_eq!(p.confidence, 0.9);

        let p = SpecialistProposal::from_value(&json!({
            "proposed_action": "notify customer",
            "confidence": "0.75"
        }))
        .unwrap();
        assert_eq!(p.rationale, "");
        assert_eq!(p.confidence, 0.75);

        assert!(SpecialistProposal::from_value(&json!("free text")).is_err());
        assert!(SpecialistProposal::from_value(&json!({"action": " ", "confidence": 0.5})).is_err());
        assert!(SpecialistProposal::from_value(&json!({"action": "x", "confidence": 1.5})).is_err());
        assert!(SpecialistProposal::from_value(&json!({"action": "x"})).is_err());
    }

    #[test]
    fn test_fatal_decision_is_escalated_without_action() {
        let err = OrchestrationError::unroutable(DisruptionCategory::CustomerComplaint);
        let decision = AggregateDecision::fatal("evt-1", &err, Vec::new());
        assert_eq!(decision.disposition(), Disposition::Escalated);
        assert_eq!(decision.chosen_action(), None);
        assert_eq!(decision.composite_confidence(), 0.0);
        assert!(decision.failure().unwrap().starts_with("UNROUTABLE_EVENT"));
    }
}
