use std::time::Duration;

use orchestration_types::{
    CapabilityTag, Disposition, EndpointDescriptor, FailureKind, HealthState, SpecialistProposal,
    SpecialistResponse,
};
use orchestrator_core::{decide, ResponseAggregator};

fn descriptor(id: &str, ordinal: usize, weight: f64) -> EndpointDescriptor {
    EndpointDescriptor::new(id, id, [CapabilityTag::StrategicPlanning], weight).stamped(ordinal, HealthState::Healthy)
}

fn success(id: &str, ordinal: usize, weight: f64, action: &str, confidence: f64, latency_ms: u64) -> SpecialistResponse {
    SpecialistResponse::success(
        &descriptor(id, ordinal, weight),
        CapabilityTag::StrategicPlanning,
        Duration::from_millis(latency_ms),
        SpecialistProposal {
            action: action.to_string(),
            rationale: "r".to_string(),
            confidence,
        },
    )
}

fn failure(id: &str, ordinal: usize, kind: FailureKind) -> SpecialistResponse {
    SpecialistResponse::failure(
        &descriptor(id, ordinal, 0.7),
        CapabilityTag::StrategicPlanning,
        Duration::from_millis(900),
        kind,
        "detail",
    )
}

fn responses() -> Vec<SpecialistResponse> {
    vec![
        success("a", 0, 0.6, "Pause intake at Kitchen 4", 0.62, 410),
        failure("b", 1, FailureKind::Timeout),
        success("c", 2, 0.3, "pause intake at kitchen 4", 0.91, 260),
        success("d", 3, 0.9, "Offer customers a voucher", 0.58, 180),
        failure("e", 4, FailureKind::MalformedOutput),
        success("f", 5, 0.45, "offer customers a  voucher", 0.37, 720),
    ]
}

/// Every ordering of a small response set, by Heap's algorithm
fn permutations(items: Vec<SpecialistResponse>) -> Vec<Vec<SpecialistResponse>> {
    fn heap(k: usize, items: &mut Vec<SpecialistResponse>, out: &mut Vec<Vec<SpecialistResponse>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        heap(k - 1, items, out);
        for i in 0..k - 1 {
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
            heap(k - 1, items, out);
        }
    }

    let mut items = items;
    let mut out = Vec::new();
    let n = items.len();
    heap(n, &mut items, &mut out);
    assert_eq!(out.len(), (1..=n).product::<usize>());
    out
}

#[test]
fn test_decision_is_independent_of_response_order() {
    let aggregator = ResponseAggregator::default();
    let expected = decide(aggregator.aggregate_for("evt", &responses()), 0.5);

    for permuted in permutations(responses()) {
        let decision = decide(aggregator.aggregate_for("evt", &permuted), 0.5);
        assert_eq!(decision, expected);
        assert_eq!(
            decision.composite_confidence().to_bits(),
            expected.composite_confidence().to_bits()
        );
    }
}

#[test]
fn test_aggregating_twice_is_bit_identical() {
    let aggregator = ResponseAggregator::default();
    let first = decide(aggregator.aggregate_for("evt", &responses()), 0.5);
    let second = decide(aggregator.aggregate_for("evt", &responses()), 0.5);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_expected_winner_and_disposition() {
    let aggregator = ResponseAggregator::default();
    let aggregation = aggregator.aggregate_for("evt", &responses());

    // total successful weight 2.25; voucher 0.6885, kitchen 0.645
    assert_eq!(aggregation.chosen_action(), Some("Offer customers a voucher"));
    assert!((aggregation.composite_confidence() - 0.6885 / 2.25).abs() < 1e-12);

    let decision = decide(aggregation, 0.5);
    assert_eq!(decision.disposition(), Disposition::Escalated);
    assert_eq!(decision.diagnostics().len(), 6);
}

#[test]
fn test_all_failures_give_zero_and_escalate() {
    let all_failed = vec![
        failure("a", 0, FailureKind::Unreachable),
        failure("b", 1, FailureKind::Timeout),
    ];
    let decision = decide(ResponseAggregator::default().aggregate_for("evt", &all_failed), 0.0);

    assert_eq!(decision.composite_confidence(), 0.0);
    assert_eq!(decision.chosen_action(), None);
    assert_eq!(decision.disposition(), Disposition::Escalated);
}
