//! Escalation Gate
//!
//! Turns an [`Aggregation`] into the terminal [`AggregateDecision`]. No I/O.

use orchestration_types::{AggregateDecision, Aggregation, OrchestrationError, SpecialistResponse};

/// Resolved when at least one specialist succeeded and the composite
/// confidence reaches `policy_threshold`; Escalated otherwise, with every
/// response attached for review.
pub fn decide(aggregation: Aggregation, policy_threshold: f64) -> AggregateDecision {
    let resolvable = !aggregation.contributions().is_empty()
        && aggregation.chosen_action().is_some()
        && aggregation.composite_confidence() >= policy_threshold;

    if resolvable {
        AggregateDecision::resolved(aggregation)
    } else {
        AggregateDecision::escalated(aggregation)
    }
}

/// Escalated decision for a pass that could not reach aggregation
pub fn escalate_fatal(
    event_id: &str,
    error: &OrchestrationError,
    responses: Vec<SpecialistResponse>,
) -> AggregateDecision {
    AggregateDecision::fatal(event_id, error, responses)
}

/// Gate bound to one policy threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationGate {
    threshold: f64,
}

impl EscalationGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn decide(&self, aggregation: Aggregation) -> AggregateDecision {
        decide(aggregation, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use orchestration_types::{
        CandidateAction, CapabilityTag, DisruptionCategory, Disposition, EndpointDescriptor,
        FailureKind, SpecialistProposal,
    };

    fn aggregation(score: f64, with_failure: bool) -> Aggregation {
        let endpoint = EndpointDescriptor::new("a", "http://a", [CapabilityTag::EmergencyResponse], 1.0);
        let success = SpecialistResponse::success(
            &endpoint,
            CapabilityTag::EmergencyResponse,
            Duration::from_millis(50),
            SpecialistProposal {
                action: "dispatch backup courier".to_string(),
                rationale: String::new(),
                confidence: score,
            },
        );
        let mut responses = vec![success.clone()];
        if with_failure {
            responses.push(SpecialistResponse::failure(
                &endpoint,
                CapabilityTag::EmergencyResponse,
                Duration::from_millis(50),
                FailureKind::Timeout,
                "slow",
            ));
        }
        let candidate = CandidateAction {
            action: "dispatch backup courier".to_string(),
            key: "dispatch backup courier".to_string(),
            score,
            supporters: vec!["a".to_string()],
            best_latency: Duration::from_millis(50),
            first_ordinal: 0,
        };
        Aggregation::new("evt", vec![candidate], vec![success], responses)
    }

    #[test]
    fn test_resolves_at_threshold() {
        let decision = EscalationGate::new(0.7).decide(aggregation(0.7, false));
        assert_eq!(decision.disposition(), Disposition::Resolved);
        assert_eq!(decision.chosen_action(), Some("dispatch backup courier"));
        assert!(decision.diagnostics().is_empty());
    }

    #[test]
    fn test_escalates_below_threshold_with_full_diagnostics() {
        let decision = decide(aggregation(0.69, true), 0.7);
        assert_eq!(decision.disposition(), Disposition::Escalated);
        assert_eq!(decision.diagnostics().len(), 2);
        assert_eq!(decision.contributions().len(), 1);
    }

    #[test]
    fn test_no_contributions_never_resolve() {
        let empty = Aggregation::new("evt", Vec::new(), Vec::new(), Vec::new());
        let decision = decide(empty, 0.0);
        assert_eq!(decision.disposition(), Disposition::Escalated);
        assert_eq!(decision.chosen_action(), None);
    }

    #[test]
    fn test_fatal_escalation_records_error() {
        let err = OrchestrationError::unroutable(DisruptionCategory::Traffic);
        let decision = escalate_fatal("evt", &err, Vec::new());
        assert_eq!(decision.disposition(), Disposition::Escalated);
        assert!(decision.failure().unwrap().contains("UNROUTABLE_EVENT"));
    }
}
