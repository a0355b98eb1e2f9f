//! Response Aggregator
//!
//! Failures are kept for diagnostics but never scored. Successful responses
//! are grouped by normalised action; each group scores
//! `sum(weight * confidence) / sum(weight of every successful responder)`.
//!
//! Every sum runs over successes sorted by registration ordinal, so the
//! result does not depend on the order responses arrived in, down to the
//! last bit of the floating point score.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use orchestration_types::{Aggregation, CandidateAction, DisruptionEvent, SpecialistResponse};
use tracing::debug;

/// Decides when two proposed actions are "the same action"
pub trait ActionNormalizer: Send + Sync {
    /// Comparison key; equal keys mean equal actions
    fn normalize(&self, action: &str) -> String;
}

/// Trim, collapse internal whitespace, lowercase
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceCaseNormalizer;

impl ActionNormalizer for WhitespaceCaseNormalizer {
    fn normalize(&self, action: &str) -> String {
        action
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl<F> ActionNormalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, action: &str) -> String {
        self(action)
    }
}

#[derive(Clone)]
pub struct ResponseAggregator {
    normalizer: Arc<dyn ActionNormalizer>,
}

impl Default for ResponseAggregator {
    fn default() -> Self {
        Self::new(WhitespaceCaseNormalizer)
    }
}

impl std::fmt::Debug for ResponseAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseAggregator").finish_non_exhaustive()
    }
}

struct Group {
    key: String,
    action: String,
    weighted: f64,
    supporters: Vec<String>,
    best_latency: Duration,
    first_ordinal: usize,
}

impl ResponseAggregator {
    pub fn new(normalizer: impl ActionNormalizer + 'static) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
        }
    }

    pub fn aggregate(&self, event: &DisruptionEvent, responses: &[SpecialistResponse]) -> Aggregation {
        self.aggregate_for(event.id(), responses)
    }

    /// Same as [`Self::aggregate`] for callers holding only the event id
    pub fn aggregate_for(&self, event_id: &str, responses: &[SpecialistResponse]) -> Aggregation {
        let mut ordered = responses.to_vec();
        ordered.sort_by(|a, b| {
            a.ordinal
                .cmp(&b.ordinal)
                .then_with(|| a.endpoint_id.cmp(&b.endpoint_id))
        });

        let contributions: Vec<SpecialistResponse> =
            ordered.iter().filter(|r| r.is_success()).cloned().collect();

        let total_weight: f64 = contributions.iter().map(|r| r.weight).sum();

        let mut groups: Vec<Group> = Vec::new();
        for response in &contributions {
            let Some(proposal) = response.proposal() else {
                continue;
            };
            let key = self.normalizer.normalize(&proposal.action);
            let weighted = response.weight * proposal.confidence;

            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => {
                    group.weighted += weighted;
                    group.supporters.push(response.endpoint_id.clone());
                    group.best_latency = group.best_latency.min(response.latency);
                }
                None => groups.push(Group {
                    key,
                    action: proposal.action.clone(),
                    weighted,
                    supporters: vec![response.endpoint_id.clone()],
                    best_latency: response.latency,
                    first_ordinal: response.ordinal,
                }),
            }
        }

        let mut candidates: Vec<CandidateAction> = groups
            .into_iter()
            .map(|g| CandidateAction {
                score: if total_weight > 0.0 {
                    (g.weighted / total_weight).clamp(0.0, 1.0)
                } else {
                    0.0
                },
                action: g.action,
                key: g.key,
                supporters: g.supporters,
                best_latency: g.best_latency,
                first_ordinal: g.first_ordinal,
            })
            .collect();

        candidates.sort_by(rank);

        debug!(
            event_id = %event_id,
            responses = ordered.len(),
            successes = contributions.len(),
            candidates = candidates.len(),
            top_score = candidates.first().map(|c| c.score).unwrap_or(0.0),
            "Responses aggregated"
        );

        Aggregation::new(event_id, candidates, contributions, ordered)
    }
}

/// Best first: higher score, then lower latency, then earlier registration
fn rank(a: &CandidateAction, b: &CandidateAction) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.best_latency.cmp(&b.best_latency))
        .then_with(|| a.first_ordinal.cmp(&b.first_ordinal))
}
